//! Branches, switches and returns.
//!
//! Branch offsets are relative to the address of the branch instruction itself.

use raw_class_file::disassemble::switch_padding;
use raw_class_file::insn;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::Fault;
use crate::frame::Frame;
use crate::interpreter::Interpreter;
use crate::value::Value;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::ifeq, |_, frame| if_zero(frame, |value| value == 0));
	table.set(insn::ifne, |_, frame| if_zero(frame, |value| value != 0));
	table.set(insn::iflt, |_, frame| if_zero(frame, |value| value < 0));
	table.set(insn::ifge, |_, frame| if_zero(frame, |value| value >= 0));
	table.set(insn::ifgt, |_, frame| if_zero(frame, |value| value > 0));
	table.set(insn::ifle, |_, frame| if_zero(frame, |value| value <= 0));

	table.set(insn::if_icmpeq, |_, frame| if_icmp(frame, |a, b| a == b));
	table.set(insn::if_icmpne, |_, frame| if_icmp(frame, |a, b| a != b));
	table.set(insn::if_icmplt, |_, frame| if_icmp(frame, |a, b| a < b));
	table.set(insn::if_icmpge, |_, frame| if_icmp(frame, |a, b| a >= b));
	table.set(insn::if_icmpgt, |_, frame| if_icmp(frame, |a, b| a > b));
	table.set(insn::if_icmple, |_, frame| if_icmp(frame, |a, b| a <= b));

	table.set(insn::if_acmpeq, |_, frame| {
		let b = frame.stack.pop_reference()?;
		let a = frame.stack.pop_reference()?;
		branch(frame, a == b)
	});
	table.set(insn::if_acmpne, |_, frame| {
		let b = frame.stack.pop_reference()?;
		let a = frame.stack.pop_reference()?;
		branch(frame, a != b)
	});
	table.set(insn::ifnull, |_, frame| {
		let reference = frame.stack.pop_reference()?;
		branch(frame, reference.is_none())
	});
	table.set(insn::ifnonnull, |_, frame| {
		let reference = frame.stack.pop_reference()?;
		branch(frame, reference.is_some())
	});

	table.set(insn::goto, |_, frame| branch(frame, true));
	table.set(insn::goto_w, |_, frame| {
		let offset = frame.i32_operand(1)?;
		Ok(frame.jump(offset)?)
	});
	table.set(insn::tableswitch, tableswitch);
	table.set(insn::lookupswitch, lookupswitch);

	table.set(insn::ireturn, |_, frame| {
		let value = frame.stack.pop_int()?;
		Ok(Flow::Return(Some(Value::Int(value))))
	});
	table.set(insn::lreturn, |_, frame| {
		let value = frame.stack.pop_long()?;
		Ok(Flow::Return(Some(Value::Long(value))))
	});
	table.set(insn::freturn, |_, frame| {
		let value = frame.stack.pop_float()?;
		Ok(Flow::Return(Some(Value::Float(value))))
	});
	table.set(insn::dreturn, |_, frame| {
		let value = frame.stack.pop_double()?;
		Ok(Flow::Return(Some(Value::Double(value))))
	});
	table.set(insn::areturn, |_, frame| {
		let reference = frame.stack.pop_reference()?;
		Ok(Flow::Return(Some(Value::Reference(reference))))
	});
	table.set(insn::r#return, |_, _| Ok(Flow::Return(None)));
}

/// Takes the 16 bit branch of a three byte branch instruction if `taken`, otherwise falls through.
fn branch(frame: &mut Frame, taken: bool) -> Result<Flow, Fault> {
	if taken {
		let offset = frame.i16_operand(1)?;
		Ok(frame.jump(offset as i32)?)
	} else {
		Ok(frame.advance(3))
	}
}

fn if_zero(frame: &mut Frame, condition: fn(i32) -> bool) -> Result<Flow, Fault> {
	let value = frame.stack.pop_int()?;
	branch(frame, condition(value))
}

fn if_icmp(frame: &mut Frame, condition: fn(i32, i32) -> bool) -> Result<Flow, Fault> {
	let b = frame.stack.pop_int()?;
	let a = frame.stack.pop_int()?;
	branch(frame, condition(a, b))
}

/// The operands of both switches start at the next multiple of four after the opcode.
fn switch_base(frame: &Frame) -> usize {
	1 + switch_padding(frame.pc)
}

fn tableswitch(_: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let base = switch_base(frame);
	let default = frame.i32_operand(base)?;
	let low = frame.i32_operand(base + 4)?;
	let high = frame.i32_operand(base + 8)?;
	let index = frame.stack.pop_int()?;

	let offset = if index < low || index > high {
		default
	} else {
		let position = (index as i64 - low as i64) as usize;
		frame.i32_operand(base + 12 + 4 * position)?
	};
	Ok(frame.jump(offset)?)
}

fn lookupswitch(_: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let base = switch_base(frame);
	let default = frame.i32_operand(base)?;
	let pairs = frame.i32_operand(base + 4)?.max(0) as usize;
	let key = frame.stack.pop_int()?;

	for i in 0..pairs {
		let pair = base + 8 + 8 * i;
		if frame.i32_operand(pair)? == key {
			let offset = frame.i32_operand(pair + 4)?;
			return Ok(frame.jump(offset)?);
		}
	}
	Ok(frame.jump(default)?)
}

