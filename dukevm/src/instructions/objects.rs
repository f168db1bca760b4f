//! Object creation, field access, type checks, `athrow` and monitors.
//!
//! Static fields exist for the loaded class, plus `java/lang/System.out`. Instance fields are created on first
//! write, reading a field that was never written gives the zero value of its type.

use log::trace;
use raw_class_file::descriptor::FieldType;
use raw_class_file::{insn, MemberRef};
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, VmError};
use crate::frame::Frame;
use crate::interpreter::Interpreter;
use crate::value::Value;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::new, |interpreter, frame| {
		let index = frame.u16_operand(1)?;
		let class_name = interpreter.class.constant_pool.get_class_name(index)?;
		let handle = interpreter.heap.allocate_instance(class_name)?;
		frame.stack.push_reference(Some(handle))?;
		Ok(frame.advance(3))
	});

	table.set(insn::getstatic, getstatic);
	table.set(insn::putstatic, putstatic);
	table.set(insn::getfield, getfield);
	table.set(insn::putfield, putfield);

	table.set(insn::athrow, |interpreter, frame| {
		let reference = frame.stack.pop_reference()?;
		let class = interpreter.heap.get(reference)?.class_name();
		trace!("throwing {class}");
		Err(Fault {
			error: VmError::Thrown { class },
			thrown: reference,
			trace: Vec::new(),
		})
	});

	table.set(insn::checkcast, |interpreter, frame| {
		let index = frame.u16_operand(1)?;
		let target = interpreter.class.constant_pool.get_class_name(index)?;
		let reference = frame.stack.pop_reference()?;
		if reference.is_some() {
			let class = interpreter.heap.get(reference)?.class_name();
			if !interpreter.is_assignable(&class, &target) {
				return Err(VmError::ClassCast { from: class, to: target }.into());
			}
		}
		frame.stack.push_reference(reference)?;
		Ok(frame.advance(3))
	});
	table.set(insn::instanceof, |interpreter, frame| {
		let index = frame.u16_operand(1)?;
		let target = interpreter.class.constant_pool.get_class_name(index)?;
		let reference = frame.stack.pop_reference()?;
		let result = match reference {
			Some(_) => interpreter.is_assignable(&interpreter.heap.get(reference)?.class_name(), &target),
			None => false,
		};
		frame.stack.push_int(result as i32)?;
		Ok(frame.advance(3))
	});

	// there is only one thread, so monitors only need the null check
	table.set(insn::monitorenter, monitor);
	table.set(insn::monitorexit, monitor);
}

fn field(interpreter: &Interpreter, frame: &Frame) -> Result<(MemberRef, FieldType), VmError> {
	let index = frame.u16_operand(1)?;
	let member = interpreter.class.constant_pool.get_member_ref(index)?;
	let field_type = FieldType::parse(&member.descriptor)?;
	Ok((member, field_type))
}

fn unresolved(member: MemberRef) -> VmError {
	VmError::UnresolvedField { class: member.class, name: member.name, descriptor: member.descriptor }
}

fn getstatic(interpreter: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let (member, _) = field(interpreter, frame)?;
	let value = if member.class == "java/lang/System" && member.name == "out" {
		Value::Reference(Some(interpreter.system_out()?))
	} else if member.class == interpreter.class_name {
		match interpreter.statics.get(&member.name) {
			Some(&value) => value,
			None => return Err(unresolved(member).into()),
		}
	} else {
		return Err(unresolved(member).into());
	};
	value.push(&mut frame.stack)?;
	Ok(frame.advance(3))
}

fn putstatic(interpreter: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let (member, field_type) = field(interpreter, frame)?;
	if member.class != interpreter.class_name || !interpreter.statics.contains_key(&member.name) {
		return Err(unresolved(member).into());
	}
	let value = Value::pop(&mut frame.stack, &field_type)?.narrow(&field_type);
	interpreter.statics.insert(member.name, value);
	Ok(frame.advance(3))
}

fn getfield(interpreter: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let (member, field_type) = field(interpreter, frame)?;
	let reference = frame.stack.pop_reference()?;
	let value = interpreter.heap.instance(reference)?.fields.get(&member.name).copied()
		.unwrap_or_else(|| Value::default_for(&field_type));
	value.push(&mut frame.stack)?;
	Ok(frame.advance(3))
}

fn putfield(interpreter: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let (member, field_type) = field(interpreter, frame)?;
	let value = Value::pop(&mut frame.stack, &field_type)?.narrow(&field_type);
	let reference = frame.stack.pop_reference()?;
	interpreter.heap.instance_mut(reference)?.fields.insert(member.name, value);
	Ok(frame.advance(3))
}

fn monitor(interpreter: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	let reference = frame.stack.pop_reference()?;
	interpreter.heap.get(reference)?;
	Ok(frame.advance(1))
}
