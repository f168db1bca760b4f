//! This crate contains a direct binary representation of a java class file.
//!
//! Use the [Java Virtual Machine Specification, Chapter 4](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html)
//! to build a class file. Attribute bodies are kept as raw bytes, use the decoders in [`attribute`] to interpret them.
//!
//! This code creates a class with a single method `static int run()` returning `1 + 2`:
//! ```
//! # use pretty_assertions::assert_eq;
//! use raw_class_file::{AttributeInfo, ClassFile, ConstantPool, flags, insn, MethodInfo, PoolEntry};
//! use raw_class_file::attribute::CodeAttribute;
//!
//! let mut pool = ConstantPool::new();
//! let class_name = pool.push(PoolEntry::utf8("org/example/Main")).unwrap();
//! let this_class = pool.push(PoolEntry::Class { name_index: class_name }).unwrap();
//! let name = pool.push(PoolEntry::utf8("run")).unwrap();
//! let descriptor = pool.push(PoolEntry::utf8("()I")).unwrap();
//! let code_name = pool.push(PoolEntry::utf8("Code")).unwrap();
//!
//! let code = CodeAttribute {
//!     max_stack: 2,
//!     max_locals: 0,
//!     code: vec![insn::iconst_1, insn::iconst_2, insn::iadd, insn::ireturn],
//!     exception_table: vec![],
//!     attributes: vec![],
//! };
//!
//! let class = ClassFile {
//!     minor_version: 0,
//!     major_version: 52,
//!     constant_pool: pool,
//!     access_flags: flags::ACC_SUPER,
//!     this_class,
//!     super_class: 0,
//!     interfaces: vec![],
//!     fields: vec![],
//!     methods: vec![
//!         MethodInfo {
//!             access_flags: flags::ACC_STATIC,
//!             name_index: name,
//!             descriptor_index: descriptor,
//!             attributes: vec![AttributeInfo { name_index: code_name, info: code.encode() }],
//!         },
//!     ],
//!     attributes: vec![],
//! };
//!
//! let bytes = class.to_bytes().unwrap();
//! assert_eq!(bytes.len(), class.length());
//!
//! let class_2 = ClassFile::load(&bytes).unwrap();
//! assert_eq!(class_2.name().unwrap(), "org/example/Main");
//! assert_eq!(class_2.code_of("run", "()I").unwrap(), code);
//!
//! assert_eq!(bytes, class_2.to_bytes().unwrap());
//! ```
//!
//! The [ClassFile::length] function gives the computed length of a class file, useful for allocating sufficient memory
//! for [ClassFile::write].

pub mod access;
pub mod attribute;
pub mod descriptor;
pub mod disassemble;
mod error;
pub mod insn;
pub mod pool;
mod reader;
mod writer;

use std::io::Cursor;
use log::debug;
use crate::attribute::{BootstrapMethod, CodeAttribute, names};
use crate::reader::ClassRead;
use crate::writer::ClassWrite;

pub use error::{DecodeError, LoadError, PoolError};
pub use pool::{ConstantPool, MemberKind, MemberRef, PoolEntry};

pub mod flags {
	pub const ACC_PUBLIC: u16       = 0x0001; // class, field, method, inner class
	pub const ACC_PRIVATE: u16      = 0x0002; // field, method, inner class
	pub const ACC_PROTECTED: u16    = 0x0004; // field, method, inner class
	pub const ACC_STATIC: u16       = 0x0008; // field, method, inner class
	pub const ACC_FINAL: u16        = 0x0010; // class, field, method, inner class, parameter
	pub const ACC_SUPER: u16        = 0x0020; // class
	pub const ACC_SYNCHRONIZED: u16 = 0x0020; // method
	pub const ACC_VOLATILE: u16     = 0x0040; // field
	pub const ACC_BRIDGE: u16       = 0x0040; // method
	pub const ACC_TRANSIENT: u16    = 0x0080; // field
	pub const ACC_VARARGS: u16      = 0x0080; // method
	pub const ACC_NATIVE: u16       = 0x0100; // method
	pub const ACC_INTERFACE: u16    = 0x0200; // class, inner class
	pub const ACC_ABSTRACT: u16     = 0x0400; // class, method, inner class
	pub const ACC_STRICT: u16       = 0x0800; // method
	pub const ACC_SYNTHETIC: u16    = 0x1000; // class, field, method, inner class, parameter
	pub const ACC_ANNOTATION: u16   = 0x2000; // class, inner class
	pub const ACC_ENUM: u16         = 0x4000; // class, field, inner class
	pub const ACC_MODULE: u16       = 0x8000; // class
}

/// An attribute whose body wasn't interpreted yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeInfo {
	pub name_index: u16,
	pub info: Vec<u8>,
}

impl AttributeInfo {
	fn read(reader: &mut impl ClassRead) -> Result<AttributeInfo, LoadError> {
		let name_index = reader.read_u16()?;
		let length = reader.read_u32_as_usize()?;
		let info = reader.read_u8_vec(length)?;
		Ok(AttributeInfo { name_index, info })
	}

	fn write(&self, writer: &mut impl ClassWrite) -> std::io::Result<()> {
		writer.write_u16(self.name_index)?;
		writer.write_usize_as_u32(self.info.len())?;
		writer.write_u8_slice(&self.info)
	}

	fn len(&self) -> usize {
		2 + 4 + self.info.len()
	}

	pub fn name(&self, pool: &ConstantPool) -> Result<String, PoolError> {
		pool.get_utf8(self.name_index)
	}
}

fn read_attributes(reader: &mut impl ClassRead) -> Result<Vec<AttributeInfo>, LoadError> {
	reader.read_vec(|r| r.read_u16_as_usize(), AttributeInfo::read)
}

fn write_attributes(writer: &mut impl ClassWrite, attributes: &[AttributeInfo]) -> std::io::Result<()> {
	writer.write_slice(attributes, |w, size| w.write_usize_as_u16(size), |w, attribute| attribute.write(w))
}

fn attributes_len(attributes: &[AttributeInfo]) -> usize {
	2 + attributes.iter().map(AttributeInfo::len).sum::<usize>()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldInfo {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

impl FieldInfo {
	pub fn name(&self, pool: &ConstantPool) -> Result<String, PoolError> {
		pool.get_utf8(self.name_index)
	}

	pub fn descriptor(&self, pool: &ConstantPool) -> Result<String, PoolError> {
		pool.get_utf8(self.descriptor_index)
	}

	pub fn is_static(&self) -> bool {
		self.access_flags & flags::ACC_STATIC != 0
	}

	/// The pool index the `ConstantValue` attribute points to, if there is one.
	pub fn constant_value(&self, pool: &ConstantPool) -> Result<Option<u16>, DecodeError> {
		attribute::find(&self.attributes, pool, names::CONSTANT_VALUE)?
			.map(|attribute| attribute::decode_index(names::CONSTANT_VALUE, &attribute.info))
			.transpose()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodInfo {
	pub access_flags: u16,
	pub name_index: u16,
	pub descriptor_index: u16,
	pub attributes: Vec<AttributeInfo>,
}

impl MethodInfo {
	pub fn name(&self, pool: &ConstantPool) -> Result<String, PoolError> {
		pool.get_utf8(self.name_index)
	}

	pub fn descriptor(&self, pool: &ConstantPool) -> Result<String, PoolError> {
		pool.get_utf8(self.descriptor_index)
	}

	pub fn is_static(&self) -> bool {
		self.access_flags & flags::ACC_STATIC != 0
	}

	pub fn is_abstract(&self) -> bool {
		self.access_flags & flags::ACC_ABSTRACT != 0
	}

	pub fn is_native(&self) -> bool {
		self.access_flags & flags::ACC_NATIVE != 0
	}

	pub fn attribute(&self, pool: &ConstantPool, name: &str) -> Result<Option<&AttributeInfo>, PoolError> {
		attribute::find(&self.attributes, pool, name)
	}

	/// Decodes the `Code` attribute of this method.
	pub fn code(&self, pool: &ConstantPool) -> Result<CodeAttribute, DecodeError> {
		match self.attribute(pool, names::CODE)? {
			Some(attribute) => CodeAttribute::decode(&attribute.info),
			None => Err(DecodeError::MissingCode {
				method: format!("{}{}", self.name(pool)?, self.descriptor(pool)?),
			}),
		}
	}
}

/// A whole class file.
///
/// The magic isn't stored: [`ClassFile::load`] checks it, and [`ClassFile::write`] always writes [`ClassFile::MAGIC`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
	pub minor_version: u16,
	pub major_version: u16,
	pub constant_pool: ConstantPool,
	pub access_flags: u16,
	pub this_class: u16,
	/// `0` for `java/lang/Object`.
	pub super_class: u16,
	pub interfaces: Vec<u16>,
	pub fields: Vec<FieldInfo>,
	pub methods: Vec<MethodInfo>,
	pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
	pub const MAGIC: u32 = 0xCAFEBABE;

	/// Parses a class file from its binary representation.
	///
	/// Besides the format itself, this checks that every pool index the class structure and the pool entries
	/// contain points at an entry of the right kind. Attribute bodies are not looked at.
	pub fn load(bytes: &[u8]) -> Result<ClassFile, LoadError> {
		let mut reader = Cursor::new(bytes);

		let magic = reader.read_u32()?;
		if magic != ClassFile::MAGIC {
			return Err(LoadError::BadMagic(magic));
		}

		let minor_version = reader.read_u16()?;
		let major_version = reader.read_u16()?;
		let constant_pool = ConstantPool::read(&mut reader)?;
		let access_flags = reader.read_u16()?;
		let this_class = reader.read_u16()?;
		let super_class = reader.read_u16()?;
		let interfaces = reader.read_vec(|r| r.read_u16_as_usize(), |r| r.read_u16())?;
		let fields = reader.read_vec(|r| r.read_u16_as_usize(), |r| Ok(FieldInfo {
			access_flags: r.read_u16()?,
			name_index: r.read_u16()?,
			descriptor_index: r.read_u16()?,
			attributes: read_attributes(r)?,
		}))?;
		let methods = reader.read_vec(|r| r.read_u16_as_usize(), |r| Ok(MethodInfo {
			access_flags: r.read_u16()?,
			name_index: r.read_u16()?,
			descriptor_index: r.read_u16()?,
			attributes: read_attributes(r)?,
		}))?;
		let attributes = read_attributes(&mut reader)?;

		if reader.remaining() != 0 {
			return Err(LoadError::TrailingBytes { count: reader.remaining() });
		}

		let class = ClassFile {
			minor_version,
			major_version,
			constant_pool,
			access_flags,
			this_class,
			super_class,
			interfaces,
			fields,
			methods,
			attributes,
		};

		class.validate()?;

		debug!(
			"loaded class file version {major_version}.{minor_version}: {} pool entries, {} fields, {} methods",
			class.constant_pool.iter().count(), class.fields.len(), class.methods.len()
		);

		Ok(class)
	}

	fn validate(&self) -> Result<(), LoadError> {
		self.constant_pool.validate()?;

		let pool = &self.constant_pool;
		let check = |result: Result<(), PoolError>, location: &dyn Fn() -> String| {
			result.map_err(|source| LoadError::InvalidPoolIndex { location: location(), source })
		};
		let utf8 = |index: u16| pool.get_utf8_bytes(index).map(drop);
		let class = |index: u16| pool.get_class_name(index).map(drop);
		let attributes = |attributes: &[AttributeInfo], owner: &dyn Fn() -> String| {
			for (i, attribute) in attributes.iter().enumerate() {
				check(utf8(attribute.name_index), &|| format!("name of attribute {i} of {}", owner()))?;
			}
			Ok::<(), LoadError>(())
		};

		check(class(self.this_class), &|| "this_class".to_owned())?;
		if self.super_class != 0 {
			check(class(self.super_class), &|| "super_class".to_owned())?;
		}
		for (i, &interface) in self.interfaces.iter().enumerate() {
			check(class(interface), &|| format!("interface {i}"))?;
		}
		for (i, field) in self.fields.iter().enumerate() {
			check(utf8(field.name_index), &|| format!("name of field {i}"))?;
			check(utf8(field.descriptor_index), &|| format!("descriptor of field {i}"))?;
			attributes(&field.attributes, &|| format!("field {i}"))?;
		}
		for (i, method) in self.methods.iter().enumerate() {
			check(utf8(method.name_index), &|| format!("name of method {i}"))?;
			check(utf8(method.descriptor_index), &|| format!("descriptor of method {i}"))?;
			attributes(&method.attributes, &|| format!("method {i}"))?;
		}
		attributes(&self.attributes, &|| "the class".to_owned())?;

		Ok(())
	}

	/// Writes the class file in its binary representation.
	pub fn write(&self, writer: &mut impl std::io::Write) -> std::io::Result<()> {
		writer.write_u32(ClassFile::MAGIC)?;
		writer.write_u16(self.minor_version)?;
		writer.write_u16(self.major_version)?;
		self.constant_pool.write(writer)?;
		writer.write_u16(self.access_flags)?;
		writer.write_u16(self.this_class)?;
		writer.write_u16(self.super_class)?;
		writer.write_slice(&self.interfaces, |w, size| w.write_usize_as_u16(size), |w, &interface| w.write_u16(interface))?;
		writer.write_slice(&self.fields, |w, size| w.write_usize_as_u16(size), |w, field| {
			w.write_u16(field.access_flags)?;
			w.write_u16(field.name_index)?;
			w.write_u16(field.descriptor_index)?;
			write_attributes(w, &field.attributes)
		})?;
		writer.write_slice(&self.methods, |w, size| w.write_usize_as_u16(size), |w, method| {
			w.write_u16(method.access_flags)?;
			w.write_u16(method.name_index)?;
			w.write_u16(method.descriptor_index)?;
			write_attributes(w, &method.attributes)
		})?;
		write_attributes(writer, &self.attributes)
	}

	/// Converts the class file to binary representation.
	///
	/// Fails with [`std::io::ErrorKind::InvalidInput`] if a list or an attribute is too long for its length field.
	pub fn to_bytes(&self) -> std::io::Result<Vec<u8>> {
		let mut vec = Vec::with_capacity(self.length());
		self.write(&mut vec)?;
		Ok(vec)
	}

	/// The length of the class file produced by [`Self::to_bytes`], in bytes.
	pub fn length(&self) -> usize {
		4 + 2 + 2
			+ self.constant_pool.length()
			+ 2 + 2 + 2
			+ 2 + 2 * self.interfaces.len()
			+ 2 + self.fields.iter().map(|f| 6 + attributes_len(&f.attributes)).sum::<usize>()
			+ 2 + self.methods.iter().map(|m| 6 + attributes_len(&m.attributes)).sum::<usize>()
			+ attributes_len(&self.attributes)
	}

	pub fn name(&self) -> Result<String, PoolError> {
		self.constant_pool.get_class_name(self.this_class)
	}

	pub fn super_name(&self) -> Result<Option<String>, PoolError> {
		self.constant_pool.get_optional_class_name(self.super_class)
	}

	/// Finds a method by name and descriptor, giving its index in [`ClassFile::methods`] too.
	pub fn find_method(&self, name: &str, descriptor: &str) -> Result<Option<(usize, &MethodInfo)>, PoolError> {
		for (index, method) in self.methods.iter().enumerate() {
			if self.constant_pool.get_utf8_bytes(method.name_index)? == name.as_bytes() &&
				self.constant_pool.get_utf8_bytes(method.descriptor_index)? == descriptor.as_bytes() {
				return Ok(Some((index, method)));
			}
		}
		Ok(None)
	}

	/// Decodes the `Code` attribute of the method with the given name and descriptor.
	///
	/// Fails with [`DecodeError::MissingCode`] if there's no such method or if the method has no code.
	pub fn code_of(&self, name: &str, descriptor: &str) -> Result<CodeAttribute, DecodeError> {
		match self.find_method(name, descriptor)? {
			Some((_, method)) => method.code(&self.constant_pool),
			None => Err(DecodeError::MissingCode { method: format!("{name}{descriptor}") }),
		}
	}

	/// Decodes the `BootstrapMethods` attribute, giving an empty list if there's none.
	pub fn bootstrap_methods(&self) -> Result<Vec<BootstrapMethod>, DecodeError> {
		match attribute::find(&self.attributes, &self.constant_pool, names::BOOTSTRAP_METHODS)? {
			Some(attribute) => BootstrapMethod::decode_table(&attribute.info),
			None => Ok(Vec::new()),
		}
	}

	pub fn source_file(&self) -> Result<Option<String>, DecodeError> {
		match attribute::find(&self.attributes, &self.constant_pool, names::SOURCE_FILE)? {
			Some(attribute) => {
				let index = attribute::decode_index(names::SOURCE_FILE, &attribute.info)?;
				Ok(Some(self.constant_pool.get_utf8(index)?))
			},
			None => Ok(None),
		}
	}
}

/// Parses a class file, see [`ClassFile::load`].
pub fn load(bytes: &[u8]) -> Result<ClassFile, LoadError> {
	ClassFile::load(bytes)
}
