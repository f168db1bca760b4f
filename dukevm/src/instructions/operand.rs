//! `pop`, `dup` and `swap`, which move values without looking at their type.
//!
//! The `2` variants work on two words: either two category 1 values or a single category 2 value. Popping half of a
//! category 2 value fails with [`VmError::CategoryMismatch`](crate::VmError::CategoryMismatch).

use raw_class_file::insn;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, VmError};
use crate::frame::Frame;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::pop, |_, frame| {
		frame.stack.pop_words(1)?;
		Ok(frame.advance(1))
	});
	table.set(insn::pop2, |_, frame| {
		frame.stack.pop_words(2)?;
		Ok(frame.advance(1))
	});

	table.set(insn::dup, |_, frame| duplicate(frame, 1, 0));
	table.set(insn::dup_x1, |_, frame| duplicate(frame, 1, 1));
	table.set(insn::dup_x2, |_, frame| duplicate(frame, 1, 2));
	table.set(insn::dup2, |_, frame| duplicate(frame, 2, 0));
	table.set(insn::dup2_x1, |_, frame| duplicate(frame, 2, 1));
	table.set(insn::dup2_x2, |_, frame| duplicate(frame, 2, 2));

	table.set(insn::swap, |_, frame| {
		let a = frame.stack.pop1()?;
		let b = frame.stack.pop1()?;
		frame.stack.push1(a)?;
		frame.stack.push1(b)?;
		Ok(frame.advance(1))
	});
}

/// Copies the top `words` words and inserts the copy `below` words further down.
fn duplicate(frame: &mut Frame, words: usize, below: usize) -> Result<Flow, Fault> {
	let top = frame.stack.pop_words(words)?;
	let under = match frame.stack.pop_words(below) {
		Ok(under) => under,
		Err(e) => {
			restore(frame, &top)?;
			return Err(e.into());
		},
	};
	restore(frame, &top)?;
	restore(frame, &under)?;
	restore(frame, &top)?;
	Ok(frame.advance(1))
}

fn restore(frame: &mut Frame, slots: &[crate::stack::Slot]) -> Result<(), VmError> {
	for &slot in slots {
		frame.stack.push_slot(slot)?;
	}
	Ok(())
}
