use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use raw_class_file::descriptor::FieldType;
use crate::error::VmError;
use crate::stack::OperandStack;

/// An opaque reference to an object in the [`Heap`](crate::heap::Heap).
///
/// On the operand stack and in local variables a reference is stored as the raw `u32` of [`Handle::to_raw`],
/// where `0` stands for `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(NonZeroU32);

impl Handle {
	pub(crate) fn from_index(index: u32) -> Handle {
		Handle(NonZeroU32::MIN.saturating_add(index))
	}

	pub(crate) fn index(self) -> usize {
		(self.0.get() - 1) as usize
	}

	pub fn to_raw(reference: Option<Handle>) -> u32 {
		reference.map_or(0, |handle| handle.0.get())
	}

	pub fn from_raw(raw: u32) -> Option<Handle> {
		NonZeroU32::new(raw).map(Handle)
	}
}

impl Display for Handle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:x}", self.0)
	}
}

/// A value passed into or returned from a method.
///
/// `boolean`, `byte`, `char` and `short` values are represented as [`Value::Int`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	Reference(Option<Handle>),
}

impl Value {
	/// The zero value of a field of this type.
	pub fn default_for(field_type: &FieldType) -> Value {
		match field_type {
			FieldType::B | FieldType::C | FieldType::I | FieldType::S | FieldType::Z => Value::Int(0),
			FieldType::J => Value::Long(0),
			FieldType::F => Value::Float(0.0),
			FieldType::D => Value::Double(0.0),
			FieldType::Object(_) | FieldType::Array(_) => Value::Reference(None),
		}
	}

	pub fn is_wide(&self) -> bool {
		matches!(self, Value::Long(_) | Value::Double(_))
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Value::Int(_) => "int",
			Value::Long(_) => "long",
			Value::Float(_) => "float",
			Value::Double(_) => "double",
			Value::Reference(_) => "reference",
		}
	}

	pub(crate) fn push(self, stack: &mut OperandStack) -> Result<(), VmError> {
		match self {
			Value::Int(value) => stack.push_int(value),
			Value::Long(value) => stack.push_long(value),
			Value::Float(value) => stack.push_float(value),
			Value::Double(value) => stack.push_double(value),
			Value::Reference(reference) => stack.push_reference(reference),
		}
	}

	/// Pops a value of the given type.
	pub(crate) fn pop(stack: &mut OperandStack, field_type: &FieldType) -> Result<Value, VmError> {
		Ok(match field_type {
			FieldType::B | FieldType::C | FieldType::I | FieldType::S | FieldType::Z => Value::Int(stack.pop_int()?),
			FieldType::J => Value::Long(stack.pop_long()?),
			FieldType::F => Value::Float(stack.pop_float()?),
			FieldType::D => Value::Double(stack.pop_double()?),
			FieldType::Object(_) | FieldType::Array(_) => Value::Reference(stack.pop_reference()?),
		})
	}

	/// Narrows an `int` to what a field of this type can hold, like the `bastore` family does.
	pub(crate) fn narrow(self, field_type: &FieldType) -> Value {
		match (self, field_type) {
			(Value::Int(value), FieldType::B) => Value::Int(value as i8 as i32),
			(Value::Int(value), FieldType::C) => Value::Int(value as u16 as i32),
			(Value::Int(value), FieldType::S) => Value::Int(value as i16 as i32),
			(Value::Int(value), FieldType::Z) => Value::Int(value & 1),
			(value, _) => value,
		}
	}
}
