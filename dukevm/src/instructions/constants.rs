use raw_class_file::insn;
use raw_class_file::{PoolEntry, PoolError};
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, VmError};
use crate::frame::Frame;
use crate::interpreter::Interpreter;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::nop, |_, frame| Ok(frame.advance(1)));
	table.set(insn::aconst_null, |_, frame| {
		frame.stack.push_reference(None)?;
		Ok(frame.advance(1))
	});

	table.set(insn::iconst_m1, |_, frame| push_int(frame, -1));
	table.set(insn::iconst_0, |_, frame| push_int(frame, 0));
	table.set(insn::iconst_1, |_, frame| push_int(frame, 1));
	table.set(insn::iconst_2, |_, frame| push_int(frame, 2));
	table.set(insn::iconst_3, |_, frame| push_int(frame, 3));
	table.set(insn::iconst_4, |_, frame| push_int(frame, 4));
	table.set(insn::iconst_5, |_, frame| push_int(frame, 5));

	table.set(insn::lconst_0, |_, frame| {
		frame.stack.push_long(0)?;
		Ok(frame.advance(1))
	});
	table.set(insn::lconst_1, |_, frame| {
		frame.stack.push_long(1)?;
		Ok(frame.advance(1))
	});
	table.set(insn::fconst_0, |_, frame| push_float(frame, 0.0));
	table.set(insn::fconst_1, |_, frame| push_float(frame, 1.0));
	table.set(insn::fconst_2, |_, frame| push_float(frame, 2.0));
	table.set(insn::dconst_0, |_, frame| {
		frame.stack.push_double(0.0)?;
		Ok(frame.advance(1))
	});
	table.set(insn::dconst_1, |_, frame| {
		frame.stack.push_double(1.0)?;
		Ok(frame.advance(1))
	});

	table.set(insn::bipush, |_, frame| {
		let value = frame.i8_operand(1)?;
		frame.stack.push_int(value as i32)?;
		Ok(frame.advance(2))
	});
	table.set(insn::sipush, |_, frame| {
		let value = frame.i16_operand(1)?;
		frame.stack.push_int(value as i32)?;
		Ok(frame.advance(3))
	});

	table.set(insn::ldc, |interpreter, frame| {
		let index = frame.u8_operand(1)? as u16;
		load_constant(interpreter, frame, index)?;
		Ok(frame.advance(2))
	});
	table.set(insn::ldc_w, |interpreter, frame| {
		let index = frame.u16_operand(1)?;
		load_constant(interpreter, frame, index)?;
		Ok(frame.advance(3))
	});
	table.set(insn::ldc2_w, ldc2_w);
}

fn push_int(frame: &mut Frame, value: i32) -> Result<Flow, Fault> {
	frame.stack.push_int(value)?;
	Ok(frame.advance(1))
}

fn push_float(frame: &mut Frame, value: f32) -> Result<Flow, Fault> {
	frame.stack.push_float(value)?;
	Ok(frame.advance(1))
}

/// Pushes a category 1 constant: an `int`, a `float` or a string object.
fn load_constant(interpreter: &mut Interpreter, frame: &mut Frame, index: u16) -> Result<(), VmError> {
	let pool = &interpreter.class.constant_pool;
	match pool.get(index)? {
		PoolEntry::Integer { bytes } => frame.stack.push_int(*bytes),
		// the bits are pushed as they are, NaN payloads included
		PoolEntry::Float { bytes } => frame.stack.push1(*bytes),
		PoolEntry::String { .. } => {
			let string = pool.get_string(index)?;
			let handle = interpreter.intern(string)?;
			frame.stack.push_reference(Some(handle))
		},
		entry => Err(VmError::UnsupportedConstant { index, kind: entry.kind() }),
	}
}

fn ldc2_w(interpreter: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let index = frame.u16_operand(1)?;
	match interpreter.class.constant_pool.get(index)? {
		PoolEntry::Long { bytes } => frame.stack.push_long(*bytes)?,
		PoolEntry::Double { bytes } => frame.stack.push2(*bytes)?,
		entry => return Err(PoolError::UnexpectedTag { index, expected: "Long or Double", found: entry.kind() }.into()),
	}
	Ok(frame.advance(3))
}
