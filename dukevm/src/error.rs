use std::fmt::{Display, Formatter};
use raw_class_file::{DecodeError, PoolError};
use thiserror::Error;
use crate::value::Handle;

/// A condition that stops the current instruction.
///
/// Some of these are turned into thrown exception objects and can be caught by an exception handler of the method,
/// see [`VmError::exception_class`].
#[derive(Debug, Error)]
pub enum VmError {
	#[error("operand stack overflow, max stack is {max}")]
	StackOverflow { max: usize },
	#[error("operand stack underflow")]
	StackUnderflow,
	#[error("expected a category {expected} value on top of the operand stack")]
	CategoryMismatch { expected: u8 },
	#[error("invalid access to local variable {index}: {reason}")]
	InvalidLocal { index: usize, reason: &'static str },
	#[error("invalid constant pool access: {0}")]
	Pool(#[from] PoolError),
	#[error(transparent)]
	Decode(#[from] DecodeError),
	#[error("unknown opcode {opcode:#04x}")]
	UnknownOpcode { opcode: u8 },
	#[error("pc {pc} is outside of the code of length {length}")]
	PcOutOfRange { pc: i64, length: usize },
	#[error("/ by zero")]
	DivisionByZero,
	#[error("negative array size {size}")]
	NegativeArraySize { size: i32 },
	#[error("index {index} out of bounds for length {length}")]
	ArrayIndexOutOfBounds { index: i32, length: i32 },
	#[error("invalid heap reference {handle}")]
	InvalidReference { handle: u32 },
	#[error("expected {expected}, got {found}")]
	WrongObjectType { expected: &'static str, found: String },
	#[error("null reference")]
	NullReference,
	#[error("{from} cannot be cast to {to}")]
	ClassCast { from: String, to: String },
	#[error("invalid newarray element type {atype}")]
	BadArrayType { atype: u8 },
	#[error("can't load constant pool entry #{index} of kind `{kind}`")]
	UnsupportedConstant { index: u16, kind: &'static str },
	#[error("can't resolve method {class}.{name}{descriptor}")]
	UnresolvedMethod { class: String, name: String, descriptor: String },
	#[error("can't resolve field {class}.{name}:{descriptor}")]
	UnresolvedField { class: String, name: String, descriptor: String },
	#[error("maximum call depth of {max} exceeded")]
	CallDepthExceeded { max: usize },
	#[error("the heap can't hold any more objects")]
	HeapExhausted,
	#[error("exception {class} was thrown")]
	Thrown { class: String },
	#[error("failed to write output: {0}")]
	Io(#[from] std::io::Error),
}

impl VmError {
	/// The class of the exception object this error is thrown as, if it can be caught at all.
	pub fn exception_class(&self) -> Option<&'static str> {
		match self {
			VmError::DivisionByZero => Some("java/lang/ArithmeticException"),
			VmError::ArrayIndexOutOfBounds { .. } => Some("java/lang/ArrayIndexOutOfBoundsException"),
			VmError::NegativeArraySize { .. } => Some("java/lang/NegativeArraySizeException"),
			VmError::NullReference => Some("java/lang/NullPointerException"),
			VmError::ClassCast { .. } => Some("java/lang/ClassCastException"),
			_ => None,
		}
	}
}

/// The place in a frame an unhandled error passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultSite {
	/// Name and descriptor of the method.
	pub method: String,
	pub opcode: u8,
	pub pc: usize,
	pub stack_depth: usize,
}

impl Display for FaultSite {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let mnemonic = raw_class_file::insn::mnemonic(self.opcode).unwrap_or("<unknown>");
		write!(f, "at {} (pc {}, opcode {mnemonic} {:#04x}, stack depth {})", self.method, self.pc, self.opcode, self.stack_depth)
	}
}

/// An error together with the frames it unwound.
///
/// The trace starts at the frame the error happened in.
#[derive(Debug)]
pub struct Fault {
	pub error: VmError,
	/// The exception object, once the error was turned into one.
	pub thrown: Option<Handle>,
	pub trace: Vec<FaultSite>,
}

impl Display for Fault {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.error)?;
		for site in &self.trace {
			write!(f, "\n\t{site}")?;
		}
		Ok(())
	}
}

impl std::error::Error for Fault {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.error)
	}
}

impl From<VmError> for Fault {
	fn from(error: VmError) -> Fault {
		Fault { error, thrown: None, trace: Vec::new() }
	}
}

macro_rules! fault_from {
	($($t:ty),*) => {
		$(
			impl From<$t> for Fault {
				fn from(error: $t) -> Fault {
					Fault::from(VmError::from(error))
				}
			}
		)*
	};
}

fault_from!(PoolError, DecodeError, std::io::Error);
