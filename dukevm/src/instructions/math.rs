//! Arithmetic, shifts and bitwise operations.
//!
//! Integer arithmetic wraps on overflow, shift distances are masked to the width of the value. Integer division and
//! remainder by zero fail with [`VmError::DivisionByZero`], floating point operations follow IEEE 754.

use raw_class_file::insn;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, VmError};
use crate::frame::Frame;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::iadd, |_, frame| int(frame, |a, b| Ok(a.wrapping_add(b))));
	table.set(insn::isub, |_, frame| int(frame, |a, b| Ok(a.wrapping_sub(b))));
	table.set(insn::imul, |_, frame| int(frame, |a, b| Ok(a.wrapping_mul(b))));
	table.set(insn::idiv, |_, frame| int(frame, |a, b| if b == 0 { Err(VmError::DivisionByZero) } else { Ok(a.wrapping_div(b)) }));
	table.set(insn::irem, |_, frame| int(frame, |a, b| if b == 0 { Err(VmError::DivisionByZero) } else { Ok(a.wrapping_rem(b)) }));
	table.set(insn::iand, |_, frame| int(frame, |a, b| Ok(a & b)));
	table.set(insn::ior, |_, frame| int(frame, |a, b| Ok(a | b)));
	table.set(insn::ixor, |_, frame| int(frame, |a, b| Ok(a ^ b)));
	table.set(insn::ishl, |_, frame| int(frame, |a, b| Ok(a.wrapping_shl(b as u32))));
	table.set(insn::ishr, |_, frame| int(frame, |a, b| Ok(a.wrapping_shr(b as u32))));
	table.set(insn::iushr, |_, frame| int(frame, |a, b| Ok((a as u32).wrapping_shr(b as u32) as i32)));

	table.set(insn::ladd, |_, frame| long(frame, |a, b| Ok(a.wrapping_add(b))));
	table.set(insn::lsub, |_, frame| long(frame, |a, b| Ok(a.wrapping_sub(b))));
	table.set(insn::lmul, |_, frame| long(frame, |a, b| Ok(a.wrapping_mul(b))));
	table.set(insn::ldiv, |_, frame| long(frame, |a, b| if b == 0 { Err(VmError::DivisionByZero) } else { Ok(a.wrapping_div(b)) }));
	table.set(insn::lrem, |_, frame| long(frame, |a, b| if b == 0 { Err(VmError::DivisionByZero) } else { Ok(a.wrapping_rem(b)) }));
	table.set(insn::land, |_, frame| long(frame, |a, b| Ok(a & b)));
	table.set(insn::lor, |_, frame| long(frame, |a, b| Ok(a | b)));
	table.set(insn::lxor, |_, frame| long(frame, |a, b| Ok(a ^ b)));
	table.set(insn::lshl, |_, frame| long_shift(frame, |a, b| a.wrapping_shl(b)));
	table.set(insn::lshr, |_, frame| long_shift(frame, |a, b| a.wrapping_shr(b)));
	table.set(insn::lushr, |_, frame| long_shift(frame, |a, b| (a as u64).wrapping_shr(b) as i64));

	table.set(insn::fadd, |_, frame| float(frame, |a, b| a + b));
	table.set(insn::fsub, |_, frame| float(frame, |a, b| a - b));
	table.set(insn::fmul, |_, frame| float(frame, |a, b| a * b));
	table.set(insn::fdiv, |_, frame| float(frame, |a, b| a / b));
	// `%` truncates like fmod, which is what frem and drem specify
	table.set(insn::frem, |_, frame| float(frame, |a, b| a % b));

	table.set(insn::dadd, |_, frame| double(frame, |a, b| a + b));
	table.set(insn::dsub, |_, frame| double(frame, |a, b| a - b));
	table.set(insn::dmul, |_, frame| double(frame, |a, b| a * b));
	table.set(insn::ddiv, |_, frame| double(frame, |a, b| a / b));
	table.set(insn::drem, |_, frame| double(frame, |a, b| a % b));

	table.set(insn::ineg, |_, frame| {
		let value = frame.stack.pop_int()?;
		frame.stack.push_int(value.wrapping_neg())?;
		Ok(frame.advance(1))
	});
	table.set(insn::lneg, |_, frame| {
		let value = frame.stack.pop_long()?;
		frame.stack.push_long(value.wrapping_neg())?;
		Ok(frame.advance(1))
	});
	table.set(insn::fneg, |_, frame| {
		let value = frame.stack.pop_float()?;
		frame.stack.push_float(-value)?;
		Ok(frame.advance(1))
	});
	table.set(insn::dneg, |_, frame| {
		let value = frame.stack.pop_double()?;
		frame.stack.push_double(-value)?;
		Ok(frame.advance(1))
	});
}

fn int(frame: &mut Frame, operation: fn(i32, i32) -> Result<i32, VmError>) -> Result<Flow, Fault> {
	let b = frame.stack.pop_int()?;
	let a = frame.stack.pop_int()?;
	frame.stack.push_int(operation(a, b)?)?;
	Ok(frame.advance(1))
}

fn long(frame: &mut Frame, operation: fn(i64, i64) -> Result<i64, VmError>) -> Result<Flow, Fault> {
	let b = frame.stack.pop_long()?;
	let a = frame.stack.pop_long()?;
	frame.stack.push_long(operation(a, b)?)?;
	Ok(frame.advance(1))
}

/// The shift distance of the `long` shifts is an `int`.
fn long_shift(frame: &mut Frame, operation: fn(i64, u32) -> i64) -> Result<Flow, Fault> {
	let b = frame.stack.pop_int()?;
	let a = frame.stack.pop_long()?;
	frame.stack.push_long(operation(a, b as u32))?;
	Ok(frame.advance(1))
}

fn float(frame: &mut Frame, operation: fn(f32, f32) -> f32) -> Result<Flow, Fault> {
	let b = frame.stack.pop_float()?;
	let a = frame.stack.pop_float()?;
	frame.stack.push_float(operation(a, b))?;
	Ok(frame.advance(1))
}

fn double(frame: &mut Frame, operation: fn(f64, f64) -> f64) -> Result<Flow, Fault> {
	let b = frame.stack.pop_double()?;
	let a = frame.stack.pop_double()?;
	frame.stack.push_double(operation(a, b))?;
	Ok(frame.advance(1))
}
