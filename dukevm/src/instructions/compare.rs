use std::cmp::Ordering;
use raw_class_file::insn;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::Fault;
use crate::frame::Frame;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::lcmp, |_, frame| {
		let b = frame.stack.pop_long()?;
		let a = frame.stack.pop_long()?;
		push_ordering(frame, Some(a.cmp(&b)), 0)
	});
	// the `l` variants push -1 when either operand is NaN, the `g` variants push 1
	table.set(insn::fcmpl, |_, frame| compare_float(frame, -1));
	table.set(insn::fcmpg, |_, frame| compare_float(frame, 1));
	table.set(insn::dcmpl, |_, frame| compare_double(frame, -1));
	table.set(insn::dcmpg, |_, frame| compare_double(frame, 1));
}

fn compare_float(frame: &mut Frame, unordered: i32) -> Result<Flow, Fault> {
	let b = frame.stack.pop_float()?;
	let a = frame.stack.pop_float()?;
	push_ordering(frame, a.partial_cmp(&b), unordered)
}

fn compare_double(frame: &mut Frame, unordered: i32) -> Result<Flow, Fault> {
	let b = frame.stack.pop_double()?;
	let a = frame.stack.pop_double()?;
	push_ordering(frame, a.partial_cmp(&b), unordered)
}

fn push_ordering(frame: &mut Frame, ordering: Option<Ordering>, unordered: i32) -> Result<Flow, Fault> {
	let result = match ordering {
		Some(Ordering::Less) => -1,
		Some(Ordering::Equal) => 0,
		Some(Ordering::Greater) => 1,
		None => unordered,
	};
	frame.stack.push_int(result)?;
	Ok(frame.advance(1))
}
