//! Method invocation.
//!
//! Arguments are popped according to the descriptor of the resolved method, with the receiver below them for all
//! but `invokestatic` and `invokedynamic`. A fault in the callee unwinds through the invoking instruction, so the
//! exception table of the caller gets a chance to handle it.

use raw_class_file::insn;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, VmError};
use crate::frame::Frame;
use crate::interpreter::Interpreter;
use crate::resolve::ResolvedMethodHandle;
use crate::value::Value;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::invokevirtual, |interpreter, frame| {
		let handle = interpreter.resolve_method(frame.u16_operand(1)?)?;
		invoke(interpreter, frame, handle, true, 3)
	});
	table.set(insn::invokespecial, |interpreter, frame| {
		let handle = interpreter.resolve_method(frame.u16_operand(1)?)?;
		invoke(interpreter, frame, handle, true, 3)
	});
	table.set(insn::invokestatic, |interpreter, frame| {
		let handle = interpreter.resolve_method(frame.u16_operand(1)?)?;
		invoke(interpreter, frame, handle, false, 3)
	});
	// the count and zero byte after the index are redundant with the descriptor
	table.set(insn::invokeinterface, |interpreter, frame| {
		let handle = interpreter.resolve_method(frame.u16_operand(1)?)?;
		invoke(interpreter, frame, handle, true, 5)
	});
	table.set(insn::invokedynamic, |interpreter, frame| {
		let handle = interpreter.resolve_dynamic(frame.u16_operand(1)?)?;
		invoke(interpreter, frame, handle, false, 5)
	});
}

fn invoke(interpreter: &mut Interpreter, frame: &mut Frame, handle: ResolvedMethodHandle, has_receiver: bool, length: usize) -> Result<Flow, Fault> {
	let descriptor = handle.descriptor();

	let mut arguments = Vec::with_capacity(descriptor.parameters.len() + 1);
	for parameter in descriptor.parameters.iter().rev() {
		arguments.push(Value::pop(&mut frame.stack, parameter)?);
	}
	if has_receiver {
		let receiver = frame.stack.pop_reference()?;
		if receiver.is_none() {
			return Err(VmError::NullReference.into());
		}
		arguments.push(Value::Reference(receiver));
	}
	arguments.reverse();

	let result = match &handle {
		ResolvedMethodHandle::Interpreted(method) => interpreter.invoke(method.clone(), &arguments)?,
		ResolvedMethodHandle::Native { descriptor, bridge } => bridge.call(interpreter, descriptor, &arguments)?,
	};
	if let Some(value) = result {
		value.push(&mut frame.stack)?;
	}
	Ok(frame.advance(length))
}
