use thiserror::Error;

/// A failed lookup in a [`ConstantPool`](crate::ConstantPool).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
	#[error("constant pool index {index} out of bounds for constant pool count {count}")]
	OutOfRange { index: u16, count: u16 },
	/// Index `0`, or the slot right after a `Long` or `Double` entry.
	#[error("constant pool index {index} is not usable")]
	Reserved { index: u16 },
	#[error("constant pool entry #{index} is `{found}`, expected `{expected}`")]
	UnexpectedTag { index: u16, expected: &'static str, found: &'static str },
	#[error("constant pool entry #{index} is not valid modified utf8")]
	InvalidUtf8 { index: u16 },
	#[error("the constant pool is full, it can't hold more than {max} entries")]
	Full { max: u16 },
	#[error("utf8 constant of {length} bytes is longer than the maximum of 65535 bytes")]
	Utf8TooLong { length: usize },
}

/// Errors of [`ClassFile::load`](crate::ClassFile::load). Any of these aborts the load, no partial class is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
	#[error("wrong magic: got {0:#x}, expected 0xCAFEBABE")]
	BadMagic(u32),
	#[error("unexpected end of data at offset {offset}: needed {needed} more bytes")]
	Truncated { offset: u64, needed: usize },
	#[error("unknown constant pool tag {tag} for entry #{index}")]
	BadConstantTag { index: u16, tag: u8 },
	#[error("constant pool count must be at least 1")]
	EmptyConstantPoolCount,
	#[error("a long or double constant at #{index} runs past the end of the constant pool")]
	WideEntryAtEnd { index: u16 },
	#[error("invalid constant pool reference in {location}")]
	InvalidPoolIndex {
		location: String,
		#[source]
		source: PoolError,
	},
	#[error("{count} unexpected trailing bytes after the class file")]
	TrailingBytes { count: usize },
}

/// Errors while interpreting an attribute body, or while looking up a method's code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	#[error("no `Code` attribute for method {method}")]
	MissingCode { method: String },
	#[error("malformed `{attribute}` attribute: {reason}")]
	MalformedAttribute { attribute: &'static str, reason: String },
	#[error("malformed descriptor {descriptor:?}: {reason}")]
	BadDescriptor { descriptor: String, reason: &'static str },
	#[error("malformed bytecode at pc {pc}: {reason}")]
	BadBytecode { pc: usize, reason: String },
	#[error(transparent)]
	Pool(#[from] PoolError),
}
