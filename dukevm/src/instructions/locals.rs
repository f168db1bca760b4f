//! Loads, stores, `iinc` and the `wide` prefix.
//!
//! `int`, `float` and reference loads and stores only differ in what the verifier allows, here they all move one
//! category 1 slot.

use raw_class_file::insn;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, VmError};
use crate::frame::Frame;
use crate::interpreter::Interpreter;

macro_rules! local_instructions {
	($table:ident, $operation:ident: $with_index:expr, [$op_0:expr, $op_1:expr, $op_2:expr, $op_3:expr]) => {
		$table.set($with_index, |_, frame| {
			let index = frame.u8_operand(1)? as usize;
			$operation(frame, index)?;
			Ok(frame.advance(2))
		});
		$table.set($op_0, |_, frame| { $operation(frame, 0)?; Ok(frame.advance(1)) });
		$table.set($op_1, |_, frame| { $operation(frame, 1)?; Ok(frame.advance(1)) });
		$table.set($op_2, |_, frame| { $operation(frame, 2)?; Ok(frame.advance(1)) });
		$table.set($op_3, |_, frame| { $operation(frame, 3)?; Ok(frame.advance(1)) });
	};
}

pub(super) fn register(table: &mut DispatchTable) {
	local_instructions!(table, load1: insn::iload, [insn::iload_0, insn::iload_1, insn::iload_2, insn::iload_3]);
	local_instructions!(table, load2: insn::lload, [insn::lload_0, insn::lload_1, insn::lload_2, insn::lload_3]);
	local_instructions!(table, load1: insn::fload, [insn::fload_0, insn::fload_1, insn::fload_2, insn::fload_3]);
	local_instructions!(table, load2: insn::dload, [insn::dload_0, insn::dload_1, insn::dload_2, insn::dload_3]);
	local_instructions!(table, load1: insn::aload, [insn::aload_0, insn::aload_1, insn::aload_2, insn::aload_3]);

	local_instructions!(table, store1: insn::istore, [insn::istore_0, insn::istore_1, insn::istore_2, insn::istore_3]);
	local_instructions!(table, store2: insn::lstore, [insn::lstore_0, insn::lstore_1, insn::lstore_2, insn::lstore_3]);
	local_instructions!(table, store1: insn::fstore, [insn::fstore_0, insn::fstore_1, insn::fstore_2, insn::fstore_3]);
	local_instructions!(table, store2: insn::dstore, [insn::dstore_0, insn::dstore_1, insn::dstore_2, insn::dstore_3]);
	local_instructions!(table, store1: insn::astore, [insn::astore_0, insn::astore_1, insn::astore_2, insn::astore_3]);

	table.set(insn::iinc, |_, frame| {
		let index = frame.u8_operand(1)? as usize;
		let delta = frame.i8_operand(2)? as i32;
		increment(frame, index, delta)?;
		Ok(frame.advance(3))
	});
	table.set(insn::wide, wide);
}

fn load1(frame: &mut Frame, index: usize) -> Result<(), VmError> {
	let value = frame.locals.load1(index)?;
	frame.stack.push1(value)
}

fn load2(frame: &mut Frame, index: usize) -> Result<(), VmError> {
	let value = frame.locals.load2(index)?;
	frame.stack.push2(value)
}

fn store1(frame: &mut Frame, index: usize) -> Result<(), VmError> {
	let value = frame.stack.pop1()?;
	frame.locals.store1(index, value)
}

fn store2(frame: &mut Frame, index: usize) -> Result<(), VmError> {
	let value = frame.stack.pop2()?;
	frame.locals.store2(index, value)
}

fn increment(frame: &mut Frame, index: usize, delta: i32) -> Result<(), VmError> {
	let value = frame.locals.load1(index)? as i32;
	frame.locals.store1(index, value.wrapping_add(delta) as u32)
}

/// Runs the following load, store, `ret` or `iinc` with a 16 bit local variable index.
fn wide(_: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let opcode = frame.u8_operand(1)?;
	let index = frame.u16_operand(2)? as usize;
	match opcode {
		insn::iload | insn::fload | insn::aload => load1(frame, index)?,
		insn::lload | insn::dload => load2(frame, index)?,
		insn::istore | insn::fstore | insn::astore => store1(frame, index)?,
		insn::lstore | insn::dstore => store2(frame, index)?,
		insn::iinc => {
			let delta = frame.i16_operand(4)? as i32;
			increment(frame, index, delta)?;
			return Ok(frame.advance(6));
		},
		// `ret` isn't supported, neither is anything else
		opcode => return Err(VmError::UnknownOpcode { opcode }.into()),
	}
	Ok(frame.advance(4))
}
