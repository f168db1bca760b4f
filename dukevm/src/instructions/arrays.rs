use raw_class_file::insn;
use crate::dispatch::{DispatchTable, Flow};
use crate::error::{Fault, VmError};
use crate::frame::Frame;
use crate::heap::{Array, ElementType};
use crate::interpreter::Interpreter;
use crate::stack::OperandStack;
use crate::value::Value;

pub(super) fn register(table: &mut DispatchTable) {
	table.set(insn::iaload, |interpreter, frame| load(interpreter, frame, &[ElementType::Int]));
	table.set(insn::laload, |interpreter, frame| load(interpreter, frame, &[ElementType::Long]));
	table.set(insn::faload, |interpreter, frame| load(interpreter, frame, &[ElementType::Float]));
	table.set(insn::daload, |interpreter, frame| load(interpreter, frame, &[ElementType::Double]));
	table.set(insn::aaload, |interpreter, frame| load(interpreter, frame, &[ElementType::Reference]));
	table.set(insn::baload, |interpreter, frame| load(interpreter, frame, &[ElementType::Byte, ElementType::Boolean]));
	table.set(insn::caload, |interpreter, frame| load(interpreter, frame, &[ElementType::Char]));
	table.set(insn::saload, |interpreter, frame| load(interpreter, frame, &[ElementType::Short]));

	table.set(insn::iastore, |interpreter, frame| store(interpreter, frame, &[ElementType::Int]));
	table.set(insn::lastore, |interpreter, frame| store(interpreter, frame, &[ElementType::Long]));
	table.set(insn::fastore, |interpreter, frame| store(interpreter, frame, &[ElementType::Float]));
	table.set(insn::dastore, |interpreter, frame| store(interpreter, frame, &[ElementType::Double]));
	table.set(insn::aastore, |interpreter, frame| store(interpreter, frame, &[ElementType::Reference]));
	table.set(insn::bastore, |interpreter, frame| store(interpreter, frame, &[ElementType::Byte, ElementType::Boolean]));
	table.set(insn::castore, |interpreter, frame| store(interpreter, frame, &[ElementType::Char]));
	table.set(insn::sastore, |interpreter, frame| store(interpreter, frame, &[ElementType::Short]));

	table.set(insn::newarray, |interpreter, frame| {
		let element_type = ElementType::from_atype(frame.u8_operand(1)?)?;
		let length = frame.stack.pop_int()?;
		let handle = interpreter.heap.allocate(length, element_type)?;
		frame.stack.push_reference(Some(handle))?;
		Ok(frame.advance(2))
	});
	table.set(insn::anewarray, |interpreter, frame| {
		let index = frame.u16_operand(1)?;
		let component = interpreter.class.constant_pool.get_class_name(index)?;
		let length = frame.stack.pop_int()?;
		let handle = interpreter.heap.allocate_references(length, component)?;
		frame.stack.push_reference(Some(handle))?;
		Ok(frame.advance(3))
	});
	table.set(insn::arraylength, |interpreter, frame| {
		let reference = frame.stack.pop_reference()?;
		let length = interpreter.heap.array(reference)?.length();
		frame.stack.push_int(length)?;
		Ok(frame.advance(1))
	});
}

/// Checks that the array is of one of the types an instruction accepts.
fn check_type(array: &Array, accepted: &[ElementType]) -> Result<(), VmError> {
	if accepted.contains(&array.element_type) {
		Ok(())
	} else {
		Err(VmError::WrongObjectType {
			expected: accepted[0].name(),
			found: format!("an array of type {}", array.element_type.name()),
		})
	}
}

fn load(interpreter: &mut Interpreter, frame: &mut Frame, accepted: &[ElementType]) -> Result<Flow, Fault> {
	let index = frame.stack.pop_int()?;
	let reference = frame.stack.pop_reference()?;

	let array = interpreter.heap.array(reference)?;
	check_type(array, accepted)?;
	let value = array.load(index)?;

	value.push(&mut frame.stack)?;
	Ok(frame.advance(1))
}

fn store(interpreter: &mut Interpreter, frame: &mut Frame, accepted: &[ElementType]) -> Result<Flow, Fault> {
	let value = pop_element(&mut frame.stack, accepted[0])?;
	let index = frame.stack.pop_int()?;
	let reference = frame.stack.pop_reference()?;

	let array = interpreter.heap.array_mut(reference)?;
	check_type(array, accepted)?;
	array.store(index, value)?;

	Ok(frame.advance(1))
}

fn pop_element(stack: &mut OperandStack, element_type: ElementType) -> Result<Value, VmError> {
	Ok(match element_type {
		ElementType::Boolean | ElementType::Byte | ElementType::Char | ElementType::Short | ElementType::Int => {
			Value::Int(stack.pop_int()?)
		},
		ElementType::Long => Value::Long(stack.pop_long()?),
		ElementType::Float => Value::Float(stack.pop_float()?),
		ElementType::Double => Value::Double(stack.pop_double()?),
		ElementType::Reference => Value::Reference(stack.pop_reference()?),
	})
}
