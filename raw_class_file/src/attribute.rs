//! Decoders for the attributes the loader keeps as opaque bytes.
//!
//! Each decoder reads the `info` of an [`AttributeInfo`], not including the `attribute_name_index` and
//! `attribute_length` items. Lengths that disagree with the actual content are reported as
//! [`DecodeError::MalformedAttribute`].

use bytes::{Buf, BufMut};
use crate::AttributeInfo;
use crate::error::{DecodeError, PoolError};
use crate::pool::ConstantPool;

pub mod names {
	pub const CODE: &str = "Code";
	pub const CONSTANT_VALUE: &str = "ConstantValue";
	pub const BOOTSTRAP_METHODS: &str = "BootstrapMethods";
	pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";
	pub const SOURCE_FILE: &str = "SourceFile";
}

/// Finds the first attribute whose name is `name`.
///
/// Fails if any attribute name index before the match doesn't point at a `Utf8` entry.
pub fn find<'a>(attributes: &'a [AttributeInfo], pool: &ConstantPool, name: &str) -> Result<Option<&'a AttributeInfo>, PoolError> {
	for attribute in attributes {
		if pool.get_utf8_bytes(attribute.name_index)? == name.as_bytes() {
			return Ok(Some(attribute));
		}
	}
	Ok(None)
}

struct Reader<'a> {
	attribute: &'static str,
	buf: &'a [u8],
}

impl<'a> Reader<'a> {
	fn new(attribute: &'static str, info: &'a [u8]) -> Reader<'a> {
		Reader { attribute, buf: info }
	}

	fn error(&self, reason: String) -> DecodeError {
		DecodeError::MalformedAttribute { attribute: self.attribute, reason }
	}

	fn need(&self, n: usize, what: &str) -> Result<(), DecodeError> {
		if self.buf.remaining() < n {
			Err(self.error(format!("expected {n} more bytes for {what}, got {}", self.buf.remaining())))
		} else {
			Ok(())
		}
	}

	fn u16(&mut self, what: &str) -> Result<u16, DecodeError> {
		self.need(2, what)?;
		Ok(self.buf.get_u16())
	}

	fn u32(&mut self, what: &str) -> Result<u32, DecodeError> {
		self.need(4, what)?;
		Ok(self.buf.get_u32())
	}

	fn bytes(&mut self, n: usize, what: &str) -> Result<Vec<u8>, DecodeError> {
		self.need(n, what)?;
		let vec = self.buf[..n].to_vec();
		self.buf.advance(n);
		Ok(vec)
	}

	fn finish(self) -> Result<(), DecodeError> {
		if self.buf.has_remaining() {
			Err(self.error(format!("{} trailing bytes", self.buf.remaining())))
		} else {
			Ok(())
		}
	}
}

/// One entry of the exception table of a [`CodeAttribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExceptionHandler {
	pub start_pc: u16,
	/// Exclusive.
	pub end_pc: u16,
	pub handler_pc: u16,
	/// A `Class` pool index, or `0` to catch everything.
	pub catch_type: u16,
}

impl ExceptionHandler {
	pub fn covers(&self, pc: usize) -> bool {
		self.start_pc as usize <= pc && pc < self.end_pc as usize
	}

	pub fn is_catch_all(&self) -> bool {
		self.catch_type == 0
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeAttribute {
	pub max_stack: u16,
	pub max_locals: u16,
	pub code: Vec<u8>,
	pub exception_table: Vec<ExceptionHandler>,
	pub attributes: Vec<AttributeInfo>,
}

impl CodeAttribute {
	pub fn decode(info: &[u8]) -> Result<CodeAttribute, DecodeError> {
		let mut reader = Reader::new(names::CODE, info);

		let max_stack = reader.u16("max_stack")?;
		let max_locals = reader.u16("max_locals")?;

		let code_length = reader.u32("code_length")? as usize;
		if code_length == 0 {
			return Err(reader.error("code_length must not be zero".to_owned()));
		}
		let code = reader.bytes(code_length, "code")?;

		let exception_table_length = reader.u16("exception_table_length")?;
		let mut exception_table = Vec::with_capacity(exception_table_length as usize);
		for _ in 0..exception_table_length {
			exception_table.push(ExceptionHandler {
				start_pc: reader.u16("start_pc")?,
				end_pc: reader.u16("end_pc")?,
				handler_pc: reader.u16("handler_pc")?,
				catch_type: reader.u16("catch_type")?,
			});
		}

		let attributes_count = reader.u16("attributes_count")?;
		let mut attributes = Vec::with_capacity(attributes_count as usize);
		for _ in 0..attributes_count {
			let name_index = reader.u16("attribute_name_index")?;
			let length = reader.u32("attribute_length")? as usize;
			let info = reader.bytes(length, "info")?;
			attributes.push(AttributeInfo { name_index, info });
		}

		reader.finish()?;

		Ok(CodeAttribute { max_stack, max_locals, code, exception_table, attributes })
	}

	/// Encodes this back into the `info` of a `Code` attribute.
	pub fn encode(&self) -> Vec<u8> {
		let mut vec = Vec::new();
		vec.put_u16(self.max_stack);
		vec.put_u16(self.max_locals);
		vec.put_u32(self.code.len() as u32);
		vec.put_slice(&self.code);
		vec.put_u16(self.exception_table.len() as u16);
		for handler in &self.exception_table {
			vec.put_u16(handler.start_pc);
			vec.put_u16(handler.end_pc);
			vec.put_u16(handler.handler_pc);
			vec.put_u16(handler.catch_type);
		}
		vec.put_u16(self.attributes.len() as u16);
		for attribute in &self.attributes {
			vec.put_u16(attribute.name_index);
			vec.put_u32(attribute.info.len() as u32);
			vec.put_slice(&attribute.info);
		}
		vec
	}

	pub fn line_numbers(&self, pool: &ConstantPool) -> Result<Vec<LineNumber>, DecodeError> {
		match find(&self.attributes, pool, names::LINE_NUMBER_TABLE)? {
			Some(attribute) => LineNumber::decode_table(&attribute.info),
			None => Ok(Vec::new()),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineNumber {
	pub start_pc: u16,
	pub line_number: u16,
}

impl LineNumber {
	pub fn decode_table(info: &[u8]) -> Result<Vec<LineNumber>, DecodeError> {
		let mut reader = Reader::new(names::LINE_NUMBER_TABLE, info);
		let length = reader.u16("line_number_table_length")?;
		let mut table = Vec::with_capacity(length as usize);
		for _ in 0..length {
			table.push(LineNumber {
				start_pc: reader.u16("start_pc")?,
				line_number: reader.u16("line_number")?,
			});
		}
		reader.finish()?;
		Ok(table)
	}
}

/// One entry of the `BootstrapMethods` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BootstrapMethod {
	/// A `MethodHandle` pool index.
	pub method_ref: u16,
	/// Loadable pool indices.
	pub arguments: Vec<u16>,
}

impl BootstrapMethod {
	pub fn decode_table(info: &[u8]) -> Result<Vec<BootstrapMethod>, DecodeError> {
		let mut reader = Reader::new(names::BOOTSTRAP_METHODS, info);
		let length = reader.u16("num_bootstrap_methods")?;
		let mut methods = Vec::with_capacity(length as usize);
		for _ in 0..length {
			let method_ref = reader.u16("bootstrap_method_ref")?;
			let count = reader.u16("num_bootstrap_arguments")?;
			let arguments = (0..count)
				.map(|_| reader.u16("bootstrap_arguments"))
				.collect::<Result<_, _>>()?;
			methods.push(BootstrapMethod { method_ref, arguments });
		}
		reader.finish()?;
		Ok(methods)
	}
}

/// Decodes attributes consisting of a single `u16` pool index, like `SourceFile` and `ConstantValue`.
pub fn decode_index(attribute: &'static str, info: &[u8]) -> Result<u16, DecodeError> {
	let mut reader = Reader::new(attribute, info);
	let index = reader.u16("index")?;
	reader.finish()?;
	Ok(index)
}
