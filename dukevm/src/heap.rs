//! The heap: an arena of objects addressed by [`Handle`].
//!
//! Objects are never freed, a session only lives as long as one program run.

use indexmap::IndexMap;
use log::trace;
use crate::error::VmError;
use crate::value::{Handle, Value};

/// The element type of an array, with the `atype` numbers `newarray` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
	Boolean,
	Char,
	Float,
	Double,
	Byte,
	Short,
	Int,
	Long,
	Reference,
}

impl ElementType {
	pub fn from_atype(atype: u8) -> Result<ElementType, VmError> {
		Ok(match atype {
			4 => ElementType::Boolean,
			5 => ElementType::Char,
			6 => ElementType::Float,
			7 => ElementType::Double,
			8 => ElementType::Byte,
			9 => ElementType::Short,
			10 => ElementType::Int,
			11 => ElementType::Long,
			atype => return Err(VmError::BadArrayType { atype }),
		})
	}

	pub fn name(self) -> &'static str {
		match self {
			ElementType::Boolean => "boolean[]",
			ElementType::Char => "char[]",
			ElementType::Float => "float[]",
			ElementType::Double => "double[]",
			ElementType::Byte => "byte[]",
			ElementType::Short => "short[]",
			ElementType::Int => "int[]",
			ElementType::Long => "long[]",
			ElementType::Reference => "reference[]",
		}
	}

	/// The class name of an array of this type, in descriptor form.
	pub fn descriptor(self) -> &'static str {
		match self {
			ElementType::Boolean => "[Z",
			ElementType::Char => "[C",
			ElementType::Float => "[F",
			ElementType::Double => "[D",
			ElementType::Byte => "[B",
			ElementType::Short => "[S",
			ElementType::Int => "[I",
			ElementType::Long => "[J",
			ElementType::Reference => "[Ljava/lang/Object;",
		}
	}
}

/// The typed backing buffer of an array. `boolean` arrays use [`Elements::Byte`].
#[derive(Debug, Clone, PartialEq)]
pub enum Elements {
	Byte(Vec<i8>),
	Char(Vec<u16>),
	Short(Vec<i16>),
	Int(Vec<i32>),
	Long(Vec<i64>),
	Float(Vec<f32>),
	Double(Vec<f64>),
	Reference(Vec<Option<Handle>>),
}

impl Elements {
	fn len(&self) -> usize {
		match self {
			Elements::Byte(vec) => vec.len(),
			Elements::Char(vec) => vec.len(),
			Elements::Short(vec) => vec.len(),
			Elements::Int(vec) => vec.len(),
			Elements::Long(vec) => vec.len(),
			Elements::Float(vec) => vec.len(),
			Elements::Double(vec) => vec.len(),
			Elements::Reference(vec) => vec.len(),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Array {
	pub element_type: ElementType,
	/// For reference arrays, the internal name of the component class.
	pub component: Option<String>,
	pub elements: Elements,
}

impl Array {
	pub fn length(&self) -> i32 {
		self.elements.len() as i32
	}

	fn check_index(&self, index: i32) -> Result<usize, VmError> {
		if index < 0 || index >= self.length() {
			Err(VmError::ArrayIndexOutOfBounds { index, length: self.length() })
		} else {
			Ok(index as usize)
		}
	}

	/// Reads an element, giving `boolean`, `byte`, `char` and `short` elements as [`Value::Int`].
	pub fn load(&self, index: i32) -> Result<Value, VmError> {
		let i = self.check_index(index)?;
		Ok(match &self.elements {
			Elements::Byte(vec) => Value::Int(vec[i] as i32),
			Elements::Char(vec) => Value::Int(vec[i] as i32),
			Elements::Short(vec) => Value::Int(vec[i] as i32),
			Elements::Int(vec) => Value::Int(vec[i]),
			Elements::Long(vec) => Value::Long(vec[i]),
			Elements::Float(vec) => Value::Float(vec[i]),
			Elements::Double(vec) => Value::Double(vec[i]),
			Elements::Reference(vec) => Value::Reference(vec[i]),
		})
	}

	/// Writes an element, truncating `int` values for the smaller integer types.
	pub fn store(&mut self, index: i32, value: Value) -> Result<(), VmError> {
		let i = self.check_index(index)?;
		let element_type = self.element_type;
		match (&mut self.elements, value) {
			(Elements::Byte(vec), Value::Int(value)) if element_type == ElementType::Boolean => vec[i] = (value & 1) as i8,
			(Elements::Byte(vec), Value::Int(value)) => vec[i] = value as i8,
			(Elements::Char(vec), Value::Int(value)) => vec[i] = value as u16,
			(Elements::Short(vec), Value::Int(value)) => vec[i] = value as i16,
			(Elements::Int(vec), Value::Int(value)) => vec[i] = value,
			(Elements::Long(vec), Value::Long(value)) => vec[i] = value,
			(Elements::Float(vec), Value::Float(value)) => vec[i] = value,
			(Elements::Double(vec), Value::Double(value)) => vec[i] = value,
			(Elements::Reference(vec), Value::Reference(value)) => vec[i] = value,
			(_, value) => return Err(VmError::WrongObjectType {
				expected: element_type.name(),
				found: format!("a value of type {}", value.kind()),
			}),
		}
		Ok(())
	}
}

/// An object of a class, with its fields by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
	pub class_name: String,
	pub fields: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeapObject {
	Array(Array),
	/// A `java/lang/String`.
	String(String),
	Instance(Instance),
}

impl HeapObject {
	pub fn class_name(&self) -> String {
		match self {
			HeapObject::Array(array) => match &array.component {
				Some(component) if component.starts_with('[') => format!("[{component}"),
				Some(component) => format!("[L{component};"),
				None => array.element_type.descriptor().to_owned(),
			},
			HeapObject::String(_) => "java/lang/String".to_owned(),
			HeapObject::Instance(instance) => instance.class_name.clone(),
		}
	}

	fn kind(&self) -> String {
		match self {
			HeapObject::Array(array) => format!("an array of type {}", array.element_type.name()),
			HeapObject::String(_) => "a string".to_owned(),
			HeapObject::Instance(instance) => format!("an instance of {}", instance.class_name),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct Heap {
	objects: Vec<HeapObject>,
}

impl Heap {
	pub fn with_capacity(capacity: usize) -> Heap {
		Heap { objects: Vec::with_capacity(capacity) }
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}

	/// Iterates over all objects in allocation order.
	pub fn iter(&self) -> impl Iterator<Item=(Handle, &HeapObject)> {
		self.objects.iter()
			.enumerate()
			.map(|(index, object)| (Handle::from_index(index as u32), object))
	}

	fn insert(&mut self, object: HeapObject) -> Result<Handle, VmError> {
		let index = u32::try_from(self.objects.len())
			.ok()
			.filter(|&index| index < u32::MAX)
			.ok_or(VmError::HeapExhausted)?;
		self.objects.push(object);
		Ok(Handle::from_index(index))
	}

	/// Allocates a zeroed array of a primitive or reference element type.
	///
	/// A negative `length` fails with [`VmError::NegativeArraySize`] without allocating anything.
	pub fn allocate(&mut self, length: i32, element_type: ElementType) -> Result<Handle, VmError> {
		if length < 0 {
			return Err(VmError::NegativeArraySize { size: length });
		}
		let n = length as usize;
		let elements = match element_type {
			ElementType::Boolean | ElementType::Byte => Elements::Byte(vec![0; n]),
			ElementType::Char => Elements::Char(vec![0; n]),
			ElementType::Short => Elements::Short(vec![0; n]),
			ElementType::Int => Elements::Int(vec![0; n]),
			ElementType::Long => Elements::Long(vec![0; n]),
			ElementType::Float => Elements::Float(vec![0.0; n]),
			ElementType::Double => Elements::Double(vec![0.0; n]),
			ElementType::Reference => Elements::Reference(vec![None; n]),
		};
		let handle = self.insert(HeapObject::Array(Array { element_type, component: None, elements }))?;
		trace!("allocated {} of length {length} as {handle}", element_type.name());
		Ok(handle)
	}

	/// Allocates an array of references to `component`, with every element `null`.
	pub fn allocate_references(&mut self, length: i32, component: String) -> Result<Handle, VmError> {
		let handle = self.allocate(length, ElementType::Reference)?;
		if let HeapObject::Array(array) = self.get_mut(Some(handle))? {
			array.component = Some(component);
		}
		Ok(handle)
	}

	pub fn allocate_string(&mut self, string: String) -> Result<Handle, VmError> {
		self.insert(HeapObject::String(string))
	}

	pub fn allocate_instance(&mut self, class_name: String) -> Result<Handle, VmError> {
		self.insert(HeapObject::Instance(Instance { class_name, fields: IndexMap::new() }))
	}

	/// Looks up an object, failing with [`VmError::NullReference`] for `null`.
	pub fn get(&self, reference: Option<Handle>) -> Result<&HeapObject, VmError> {
		let handle = reference.ok_or(VmError::NullReference)?;
		self.objects.get(handle.index())
			.ok_or(VmError::InvalidReference { handle: Handle::to_raw(reference) })
	}

	pub fn get_mut(&mut self, reference: Option<Handle>) -> Result<&mut HeapObject, VmError> {
		let handle = reference.ok_or(VmError::NullReference)?;
		self.objects.get_mut(handle.index())
			.ok_or(VmError::InvalidReference { handle: Handle::to_raw(reference) })
	}

	pub fn array(&self, reference: Option<Handle>) -> Result<&Array, VmError> {
		match self.get(reference)? {
			HeapObject::Array(array) => Ok(array),
			object => Err(VmError::WrongObjectType { expected: "an array", found: object.kind() }),
		}
	}

	pub fn array_mut(&mut self, reference: Option<Handle>) -> Result<&mut Array, VmError> {
		match self.get_mut(reference)? {
			HeapObject::Array(array) => Ok(array),
			object => Err(VmError::WrongObjectType { expected: "an array", found: object.kind() }),
		}
	}

	pub fn string(&self, reference: Option<Handle>) -> Result<&str, VmError> {
		match self.get(reference)? {
			HeapObject::String(string) => Ok(string),
			object => Err(VmError::WrongObjectType { expected: "a string", found: object.kind() }),
		}
	}

	pub fn instance(&self, reference: Option<Handle>) -> Result<&Instance, VmError> {
		match self.get(reference)? {
			HeapObject::Instance(instance) => Ok(instance),
			object => Err(VmError::WrongObjectType { expected: "an object instance", found: object.kind() }),
		}
	}

	pub fn instance_mut(&mut self, reference: Option<Handle>) -> Result<&mut Instance, VmError> {
		match self.get_mut(reference)? {
			HeapObject::Instance(instance) => Ok(instance),
			object => Err(VmError::WrongObjectType { expected: "an object instance", found: object.kind() }),
		}
	}
}
