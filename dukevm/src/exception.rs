//! Exception objects and the search for exception handlers.

use log::{debug, warn};
use crate::error::{Fault, VmError};
use crate::frame::Frame;
use crate::interpreter::Interpreter;
use crate::value::{Handle, Value};

pub const OBJECT: &str = "java/lang/Object";
pub const THROWABLE: &str = "java/lang/Throwable";
pub const EXCEPTION: &str = "java/lang/Exception";
pub const RUNTIME_EXCEPTION: &str = "java/lang/RuntimeException";
const INDEX_OUT_OF_BOUNDS: &str = "java/lang/IndexOutOfBoundsException";

/// The field of exception objects holding the message.
pub(crate) const MESSAGE_FIELD: &str = "detailMessage";

/// The superclasses of classes known without loading them, nearest first.
pub fn builtin_superclasses(class: &str) -> Option<&'static [&'static str]> {
	let supers: &'static [&'static str] = match class {
		OBJECT => &[],
		THROWABLE => &[OBJECT],
		EXCEPTION => &[THROWABLE, OBJECT],
		RUNTIME_EXCEPTION => &[EXCEPTION, THROWABLE, OBJECT],
		"java/lang/ArithmeticException"
		| "java/lang/NegativeArraySizeException"
		| "java/lang/NullPointerException"
		| "java/lang/ClassCastException"
		| "java/lang/IllegalArgumentException"
		| "java/lang/IllegalStateException"
		| INDEX_OUT_OF_BOUNDS => &[RUNTIME_EXCEPTION, EXCEPTION, THROWABLE, OBJECT],
		"java/lang/ArrayIndexOutOfBoundsException" => &[INDEX_OUT_OF_BOUNDS, RUNTIME_EXCEPTION, EXCEPTION, THROWABLE, OBJECT],
		_ => return None,
	};
	Some(supers)
}

/// Whether the class is one of the builtin `Throwable` subclasses.
pub fn is_builtin_throwable(class: &str) -> bool {
	builtin_superclasses(class).is_some_and(|supers| class == THROWABLE || supers.contains(&THROWABLE))
}

/// The message of the exception an error is thrown as.
fn message_of(error: &VmError) -> Option<String> {
	match error {
		VmError::DivisionByZero => Some("/ by zero".to_owned()),
		VmError::ArrayIndexOutOfBounds { index, length } => Some(format!("Index {index} out of bounds for length {length}")),
		VmError::NegativeArraySize { size } => Some(size.to_string()),
		VmError::ClassCast { from, to } => Some(format!("class {} cannot be cast to class {}",
			from.replace('/', "."), to.replace('/', "."))),
		_ => None,
	}
}

impl Interpreter {
	/// Whether an object of class `class` can be used where `target` is expected.
	///
	/// Only the loaded class and the builtin classes have a known superclass chain, every other class is only
	/// assignable to itself and `java/lang/Object`.
	pub(crate) fn is_assignable(&self, class: &str, target: &str) -> bool {
		if class == target || target == OBJECT {
			return true;
		}
		if let Some(supers) = builtin_superclasses(class) {
			return supers.iter().any(|&super_name| super_name == target);
		}
		if class == self.class_name {
			if let Some(super_name) = &self.super_name {
				return self.is_assignable(super_name, target);
			}
		}
		false
	}

	/// Allocates an exception object with an optional message.
	pub(crate) fn new_throwable(&mut self, class: &str, message: Option<String>) -> Result<Handle, VmError> {
		let handle = self.heap.allocate_instance(class.to_owned())?;
		let message = match message {
			Some(message) => Some(self.heap.allocate_string(message)?),
			None => None,
		};
		self.heap.instance_mut(Some(handle))?.fields.insert(MESSAGE_FIELD.to_owned(), Value::Reference(message));
		Ok(handle)
	}

	/// Looks for a handler in the exception table of the frame covering `pc` that catches the fault.
	///
	/// Errors that map to an exception class are turned into an exception object first, that object is then
	/// stored in [`Fault::thrown`].
	pub(crate) fn find_handler(&mut self, frame: &Frame, pc: usize, fault: &mut Fault) -> Option<u16> {
		let exception_table = &frame.method.code.exception_table;
		if !exception_table.iter().any(|handler| handler.covers(pc)) {
			return None;
		}

		let thrown = match fault.thrown {
			Some(thrown) => thrown,
			None => {
				let class = fault.error.exception_class()?;
				match self.new_throwable(class, message_of(&fault.error)) {
					Ok(thrown) => {
						fault.thrown = Some(thrown);
						thrown
					},
					Err(e) => {
						warn!("failed to create exception object for {}: {e}", fault.error);
						return None;
					},
				}
			},
		};
		let class = match self.heap.get(Some(thrown)) {
			Ok(object) => object.class_name(),
			Err(e) => {
				warn!("thrown reference {thrown} is invalid: {e}");
				return None;
			},
		};

		for handler in exception_table {
			if !handler.covers(pc) {
				continue;
			}
			if handler.is_catch_all() {
				return Some(handler.handler_pc);
			}
			match self.class.constant_pool.get_class_name(handler.catch_type) {
				Ok(catch_type) if self.is_assignable(&class, &catch_type) => {
					debug!("{class} is caught as {catch_type}");
					return Some(handler.handler_pc);
				},
				Ok(_) => {},
				Err(e) => warn!("exception handler at pc {} has an invalid catch type: {e}", handler.handler_pc),
			}
		}
		None
	}
}
