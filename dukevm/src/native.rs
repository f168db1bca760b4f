//! Library methods answered directly by the interpreter.

use std::fmt::{Display, LowerExp};
use std::io::Write;
use log::debug;
use raw_class_file::descriptor::{FieldType, MethodDescriptor};
use crate::error::VmError;
use crate::exception::{is_builtin_throwable, MESSAGE_FIELD};
use crate::heap::{Array, Elements, HeapObject};
use crate::interpreter::Interpreter;
use crate::value::{Handle, Value};

/// The recipe tag standing for the next argument in `makeConcatWithConstants`.
const TAG_ARGUMENT: char = '\u{1}';
/// The recipe tag standing for the next bootstrap method constant.
const TAG_CONSTANT: char = '\u{2}';

#[derive(Debug, Clone, PartialEq)]
pub enum NativeBridge {
	/// `java/lang/Object.<init>()V`, which does nothing.
	ObjectInit,
	/// The constructors of the builtin exception classes, storing the optional message.
	ThrowableInit,
	/// `getMessage()` of the builtin exception classes.
	ThrowableGetMessage,
	/// `java/io/PrintStream.print` and `println`.
	Print { newline: bool },
	/// A call site bootstrapped by `java/lang/invoke/StringConcatFactory`.
	Concat { recipe: String, constants: Vec<String> },
}

impl NativeBridge {
	/// Finds the bridge for a method of another class.
	pub fn lookup(class: &str, name: &str, descriptor: &str) -> Option<NativeBridge> {
		match (class, name, descriptor) {
			("java/lang/Object", "<init>", "()V") => Some(NativeBridge::ObjectInit),
			(class, "<init>", "()V" | "(Ljava/lang/String;)V") if is_builtin_throwable(class) => Some(NativeBridge::ThrowableInit),
			(class, "getMessage", "()Ljava/lang/String;") if is_builtin_throwable(class) => Some(NativeBridge::ThrowableGetMessage),
			("java/io/PrintStream", "println", "()V") => Some(NativeBridge::Print { newline: true }),
			("java/io/PrintStream", "print" | "println", descriptor) if PRINTABLE.contains(&descriptor) => {
				Some(NativeBridge::Print { newline: name == "println" })
			},
			_ => None,
		}
	}

	/// Calls the bridge. For bridges standing in for instance methods, the receiver is the first argument.
	pub(crate) fn call(&self, interpreter: &mut Interpreter, descriptor: &MethodDescriptor, arguments: &[Value]) -> Result<Option<Value>, VmError> {
		match self {
			NativeBridge::ObjectInit => Ok(None),
			NativeBridge::ThrowableInit => {
				let message = arguments.get(1).copied().unwrap_or(Value::Reference(None));
				let this = receiver(arguments)?;
				interpreter.heap.instance_mut(this)?.fields.insert(MESSAGE_FIELD.to_owned(), message);
				Ok(None)
			},
			NativeBridge::ThrowableGetMessage => {
				let this = receiver(arguments)?;
				let message = interpreter.heap.instance(this)?.fields.get(MESSAGE_FIELD).copied();
				Ok(Some(message.unwrap_or(Value::Reference(None))))
			},
			NativeBridge::Print { newline } => {
				let mut text = match (arguments.get(1), descriptor.parameters.first()) {
					(Some(&value), Some(field_type)) => to_java_string(interpreter, value, field_type)?,
					_ => String::new(),
				};
				if *newline {
					text.push('\n');
				}
				interpreter.out.write_all(text.as_bytes())?;
				interpreter.out.flush()?;
				Ok(None)
			},
			NativeBridge::Concat { recipe, constants } => {
				let mut arguments = arguments.iter().zip(&descriptor.parameters);
				let mut constants = constants.iter();
				let mut result = String::new();
				for c in recipe.chars() {
					match c {
						TAG_ARGUMENT => {
							let (&value, field_type) = arguments.next()
								.ok_or_else(|| bad_recipe(recipe, "more argument tags than arguments"))?;
							result.push_str(&to_java_string(interpreter, value, field_type)?);
						},
						TAG_CONSTANT => {
							let constant = constants.next()
								.ok_or_else(|| bad_recipe(recipe, "more constant tags than constants"))?;
							result.push_str(constant);
						},
						c => result.push(c),
					}
				}
				debug!("concatenated {result:?}");
				let handle = interpreter.heap.allocate_string(result)?;
				Ok(Some(Value::Reference(Some(handle))))
			},
		}
	}
}

/// The descriptors `print` and `println` are bridged for, next to `println()`.
const PRINTABLE: &[&str] = &[
	"(Ljava/lang/String;)V",
	"(Ljava/lang/Object;)V",
	"(I)V",
	"(J)V",
	"(F)V",
	"(D)V",
	"(C)V",
	"(Z)V",
	"([C)V",
];

fn receiver(arguments: &[Value]) -> Result<Option<Handle>, VmError> {
	match arguments.first() {
		Some(Value::Reference(reference)) => Ok(*reference),
		Some(value) => Err(VmError::WrongObjectType { expected: "a receiver reference", found: value.kind().to_owned() }),
		None => Err(VmError::StackUnderflow),
	}
}

fn bad_recipe(recipe: &str, reason: &str) -> VmError {
	raw_class_file::DecodeError::MalformedAttribute {
		attribute: "BootstrapMethods",
		reason: format!("string concatenation recipe {recipe:?} has {reason}"),
	}.into()
}

/// Formats a value the way `String.valueOf` does for a value of the given type.
pub(crate) fn to_java_string(interpreter: &Interpreter, value: Value, field_type: &FieldType) -> Result<String, VmError> {
	Ok(match (value, field_type) {
		(Value::Int(value), FieldType::Z) => (value != 0).to_string(),
		(Value::Int(value), FieldType::C) => char::from_u32(value as u16 as u32).unwrap_or(char::REPLACEMENT_CHARACTER).to_string(),
		(Value::Int(value), _) => value.to_string(),
		(Value::Long(value), _) => value.to_string(),
		(Value::Float(value), _) => format_floating(value),
		(Value::Double(value), _) => format_floating(value),
		(Value::Reference(None), _) => "null".to_owned(),
		(Value::Reference(reference @ Some(handle)), field_type) => match interpreter.heap.get(reference)? {
			HeapObject::String(string) => string.clone(),
			HeapObject::Array(Array { elements: Elements::Char(chars), .. }) if *field_type == FieldType::Array(Box::new(FieldType::C)) => {
				char::decode_utf16(chars.iter().copied())
					.map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
					.collect()
			},
			object => format!("{}@{handle}", object.class_name().replace('/', ".")),
		},
	})
}

/// Formats a `float` or `double` like `Float.toString` and `Double.toString` do.
///
/// Values with a magnitude in `[10^-3, 10^7)` are written as plain decimals with at least one digit after the point,
/// all others in computerized scientific notation, like `1.0E10`.
pub(crate) fn format_floating<T: Copy + Display + LowerExp + Into<f64>>(value: T) -> String {
	let v: f64 = value.into();
	if v.is_nan() {
		return "NaN".to_owned();
	}
	if v.is_infinite() {
		return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
	}

	let magnitude = v.abs();
	if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
		let decimal = value.to_string();
		if decimal.contains('.') {
			decimal
		} else {
			format!("{decimal}.0")
		}
	} else {
		let scientific = format!("{value:e}");
		let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
		if mantissa.contains('.') {
			format!("{mantissa}E{exponent}")
		} else {
			format!("{mantissa}.0E{exponent}")
		}
	}
}
