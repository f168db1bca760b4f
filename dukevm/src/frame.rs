use std::rc::Rc;
use crate::dispatch::Flow;
use crate::error::VmError;
use crate::method::Method;
use crate::stack::{OperandStack, Slot};
use crate::value::{Handle, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Local {
	Unset,
	Single(u32),
	Wide(u64),
	/// The second slot of a `Wide` value in the slot before.
	Upper,
}

/// The local variable array of a frame.
///
/// A `long` or `double` in slot `i` takes up slot `i + 1` too, that slot can't be read on its own. Writing to either
/// slot of such a pair invalidates the whole pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locals {
	slots: Vec<Local>,
}

impl Locals {
	pub fn new(max_locals: usize) -> Locals {
		Locals { slots: vec![Local::Unset; max_locals] }
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	fn check(&self, index: usize, words: usize) -> Result<(), VmError> {
		if index + words > self.slots.len() {
			Err(VmError::InvalidLocal { index, reason: "index out of range for max_locals" })
		} else {
			Ok(())
		}
	}

	/// Breaks up a wide pair if `index` is part of one.
	fn invalidate(&mut self, index: usize) {
		match self.slots[index] {
			Local::Wide(_) => {
				if let Some(next) = self.slots.get_mut(index + 1) {
					*next = Local::Unset;
				}
			},
			Local::Upper => {
				if index > 0 {
					self.slots[index - 1] = Local::Unset;
				}
			},
			_ => {},
		}
	}

	pub fn load1(&self, index: usize) -> Result<u32, VmError> {
		self.check(index, 1)?;
		match self.slots[index] {
			Local::Single(value) => Ok(value),
			Local::Unset => Err(VmError::InvalidLocal { index, reason: "read before being written" }),
			Local::Wide(_) | Local::Upper => Err(VmError::InvalidLocal { index, reason: "holds a category 2 value" }),
		}
	}

	pub fn load2(&self, index: usize) -> Result<u64, VmError> {
		self.check(index, 2)?;
		match self.slots[index] {
			Local::Wide(value) => Ok(value),
			Local::Unset => Err(VmError::InvalidLocal { index, reason: "read before being written" }),
			Local::Single(_) | Local::Upper => Err(VmError::InvalidLocal { index, reason: "holds no category 2 value" }),
		}
	}

	pub fn store1(&mut self, index: usize, value: u32) -> Result<(), VmError> {
		self.check(index, 1)?;
		self.invalidate(index);
		self.slots[index] = Local::Single(value);
		Ok(())
	}

	pub fn store2(&mut self, index: usize, value: u64) -> Result<(), VmError> {
		self.check(index, 2)?;
		self.invalidate(index);
		self.invalidate(index + 1);
		self.slots[index] = Local::Wide(value);
		self.slots[index + 1] = Local::Upper;
		Ok(())
	}

	pub fn store_slot(&mut self, index: usize, slot: Slot) -> Result<(), VmError> {
		match slot {
			Slot::Single(value) => self.store1(index, value),
			Slot::Wide(value) => self.store2(index, value),
		}
	}

	/// Stores method arguments starting at slot `0`, each `long` and `double` taking two slots.
	pub fn store_arguments(&mut self, arguments: &[Value]) -> Result<(), VmError> {
		let mut index = 0;
		for argument in arguments {
			match *argument {
				Value::Int(value) => self.store1(index, value as u32)?,
				Value::Float(value) => self.store1(index, value.to_bits())?,
				Value::Reference(reference) => self.store1(index, Handle::to_raw(reference))?,
				Value::Long(value) => self.store2(index, value as u64)?,
				Value::Double(value) => self.store2(index, value.to_bits())?,
			}
			index += if argument.is_wide() { 2 } else { 1 };
		}
		Ok(())
	}
}

/// The execution state of one method invocation.
#[derive(Debug)]
pub struct Frame {
	pub method: Rc<Method>,
	/// The address of the instruction being executed.
	pub pc: usize,
	pub stack: OperandStack,
	pub locals: Locals,
}

impl Frame {
	pub fn new(method: Rc<Method>) -> Frame {
		let stack = OperandStack::new(method.code.max_stack as usize);
		let locals = Locals::new(method.code.max_locals as usize);
		Frame { method, pc: 0, stack, locals }
	}

	pub fn code(&self) -> &[u8] {
		&self.method.code.code
	}

	pub fn opcode(&self) -> Result<u8, VmError> {
		self.code().get(self.pc).copied()
			.ok_or(VmError::PcOutOfRange { pc: self.pc as i64, length: self.code().len() })
	}

	/// Reads the `N` bytes starting `offset` bytes after the opcode.
	fn operand<const N: usize>(&self, offset: usize) -> Result<[u8; N], VmError> {
		let start = self.pc + offset;
		let bytes = self.code().get(start..start + N)
			.ok_or(VmError::PcOutOfRange { pc: (start + N) as i64, length: self.code().len() })?;
		let mut buf = [0u8; N];
		buf.copy_from_slice(bytes);
		Ok(buf)
	}

	pub fn u8_operand(&self, offset: usize) -> Result<u8, VmError> {
		Ok(u8::from_be_bytes(self.operand(offset)?))
	}
	pub fn i8_operand(&self, offset: usize) -> Result<i8, VmError> {
		Ok(i8::from_be_bytes(self.operand(offset)?))
	}
	pub fn u16_operand(&self, offset: usize) -> Result<u16, VmError> {
		Ok(u16::from_be_bytes(self.operand(offset)?))
	}
	pub fn i16_operand(&self, offset: usize) -> Result<i16, VmError> {
		Ok(i16::from_be_bytes(self.operand(offset)?))
	}
	pub fn i32_operand(&self, offset: usize) -> Result<i32, VmError> {
		Ok(i32::from_be_bytes(self.operand(offset)?))
	}

	/// Moves past an instruction of `length` bytes.
	pub fn advance(&mut self, length: usize) -> Flow {
		self.pc += length;
		Flow::Continue
	}

	/// Branches to `offset` bytes relative to the address of the current opcode.
	pub fn jump(&mut self, offset: i32) -> Result<Flow, VmError> {
		let target = self.pc as i64 + offset as i64;
		if target < 0 || target >= self.code().len() as i64 {
			return Err(VmError::PcOutOfRange { pc: target, length: self.code().len() });
		}
		self.pc = target as usize;
		Ok(Flow::Continue)
	}
}
