use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::Chars;
use crate::error::DecodeError;

/// The type of a field, parameter or return value.
///
/// ```
/// use raw_class_file::descriptor::{FieldType, MethodDescriptor};
///
/// let descriptor = MethodDescriptor::parse("([Ljava/lang/String;J)V").unwrap();
/// assert_eq!(descriptor.parameters, vec![
///     FieldType::Array(Box::new(FieldType::Object("java/lang/String".to_owned()))),
///     FieldType::J,
/// ]);
/// assert_eq!(descriptor.return_type, None);
/// assert_eq!(descriptor.parameter_slots(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
	/// A `byte`.
	B,
	/// A `char`.
	C,
	/// A `double`.
	D,
	/// A `float`.
	F,
	/// An `int`.
	I,
	/// A `long`.
	J,
	/// A `short`.
	S,
	/// A `boolean`.
	Z,
	/// An instance of the class with the given internal name.
	Object(String),
	Array(Box<FieldType>),
}

impl FieldType {
	pub fn parse(descriptor: &str) -> Result<FieldType, DecodeError> {
		let mut chars = descriptor.chars().peekable();
		let field_type = read_field_type(descriptor, &mut chars)?;
		if chars.next().is_some() {
			return Err(bad(descriptor, "trailing characters"));
		}
		Ok(field_type)
	}

	/// `long` and `double` values occupy two local variable slots.
	pub fn is_wide(&self) -> bool {
		matches!(self, FieldType::J | FieldType::D)
	}

	pub fn slots(&self) -> usize {
		if self.is_wide() { 2 } else { 1 }
	}

	pub fn is_reference(&self) -> bool {
		matches!(self, FieldType::Object(_) | FieldType::Array(_))
	}
}

impl Display for FieldType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			FieldType::B => write!(f, "B"),
			FieldType::C => write!(f, "C"),
			FieldType::D => write!(f, "D"),
			FieldType::F => write!(f, "F"),
			FieldType::I => write!(f, "I"),
			FieldType::J => write!(f, "J"),
			FieldType::S => write!(f, "S"),
			FieldType::Z => write!(f, "Z"),
			FieldType::Object(class_name) => write!(f, "L{class_name};"),
			FieldType::Array(inner) => write!(f, "[{inner}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
	pub parameters: Vec<FieldType>,
	/// `None` for `void`.
	pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
	pub fn parse(descriptor: &str) -> Result<MethodDescriptor, DecodeError> {
		let mut chars = descriptor.chars().peekable();

		if chars.next_if_eq(&'(').is_none() {
			return Err(bad(descriptor, "must start with `(`"));
		}
		let mut parameters = Vec::new();
		while chars.next_if_eq(&')').is_none() {
			parameters.push(read_field_type(descriptor, &mut chars)?);
		}

		let return_type = if chars.next_if_eq(&'V').is_some() {
			None
		} else {
			Some(read_field_type(descriptor, &mut chars)?)
		};

		if chars.next().is_some() {
			return Err(bad(descriptor, "trailing characters"));
		}

		Ok(MethodDescriptor { parameters, return_type })
	}

	/// The number of local variable slots the parameters take, not counting `this`.
	pub fn parameter_slots(&self) -> usize {
		self.parameters.iter().map(FieldType::slots).sum()
	}
}

impl Display for MethodDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "(")?;
		for parameter in &self.parameters {
			write!(f, "{parameter}")?;
		}
		write!(f, ")")?;
		match &self.return_type {
			Some(return_type) => write!(f, "{return_type}"),
			None => write!(f, "V"),
		}
	}
}

fn bad(descriptor: &str, reason: &'static str) -> DecodeError {
	DecodeError::BadDescriptor { descriptor: descriptor.to_owned(), reason }
}

// The grammar for descriptors is:
//   MethodDescriptor:
//     "(" FieldType* ")" ReturnDescriptor
//
//   ReturnDescriptor:
//     FieldType | "V"
//
//   FieldType:
//     "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" |
//     "L" ClassName ";" |
//     "[" FieldType
fn read_field_type(descriptor: &str, chars: &mut Peekable<Chars>) -> Result<FieldType, DecodeError> {
	let mut array_dimension = 0;
	while chars.next_if_eq(&'[').is_some() {
		array_dimension += 1;
	}
	if array_dimension > 255 {
		return Err(bad(descriptor, "more than 255 array dimensions"));
	}

	let char = chars.next().ok_or_else(|| bad(descriptor, "unexpected abrupt ending of descriptor"))?;
	let mut field_type = match char {
		'B' => FieldType::B,
		'C' => FieldType::C,
		'D' => FieldType::D,
		'F' => FieldType::F,
		'I' => FieldType::I,
		'J' => FieldType::J,
		'S' => FieldType::S,
		'Z' => FieldType::Z,
		'L' => {
			let mut class_name = String::new();
			loop {
				match chars.next() {
					Some(';') => break,
					Some(char) => class_name.push(char),
					None => return Err(bad(descriptor, "unexpected abrupt ending of descriptor")),
				}
			}
			if class_name.is_empty() {
				return Err(bad(descriptor, "empty class name"));
			}
			FieldType::Object(class_name)
		},
		_ => return Err(bad(descriptor, "unexpected char in descriptor")),
	};

	for _ in 0..array_dimension {
		field_type = FieldType::Array(Box::new(field_type));
	}

	Ok(field_type)
}
