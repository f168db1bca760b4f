//! The operand stack of a frame.
//!
//! Each entry is one 64-bit slot. A `long` or `double` is pushed and popped as a single [`Slot::Wide`], never as two
//! halves, and every pop checks the category of the value it takes.
//! `float` and `double` values are kept as their raw bit patterns.

use crate::error::VmError;
use crate::value::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
	/// A category 1 value: `int`, `float` or a reference.
	Single(u32),
	/// A category 2 value: `long` or `double`.
	Wide(u64),
}

impl Slot {
	/// How many words of the class file `max_stack` and `max_locals` items this takes.
	pub fn words(self) -> usize {
		match self {
			Slot::Single(_) => 1,
			Slot::Wide(_) => 2,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandStack {
	slots: Vec<Slot>,
	max: usize,
}

impl OperandStack {
	pub fn new(max: usize) -> OperandStack {
		OperandStack { slots: Vec::with_capacity(max), max }
	}

	pub fn depth(&self) -> usize {
		self.slots.len()
	}

	pub fn max(&self) -> usize {
		self.max
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	pub fn clear(&mut self) {
		self.slots.clear();
	}

	pub fn push_slot(&mut self, slot: Slot) -> Result<(), VmError> {
		if self.slots.len() >= self.max {
			return Err(VmError::StackOverflow { max: self.max });
		}
		self.slots.push(slot);
		Ok(())
	}

	pub fn pop_slot(&mut self) -> Result<Slot, VmError> {
		self.slots.pop().ok_or(VmError::StackUnderflow)
	}

	pub fn peek_slot(&self) -> Result<Slot, VmError> {
		self.slots.last().copied().ok_or(VmError::StackUnderflow)
	}

	pub fn push1(&mut self, value: u32) -> Result<(), VmError> {
		self.push_slot(Slot::Single(value))
	}

	pub fn pop1(&mut self) -> Result<u32, VmError> {
		match self.peek_slot()? {
			Slot::Single(value) => {
				self.slots.pop();
				Ok(value)
			},
			Slot::Wide(_) => Err(VmError::CategoryMismatch { expected: 1 }),
		}
	}

	pub fn push2(&mut self, value: u64) -> Result<(), VmError> {
		self.push_slot(Slot::Wide(value))
	}

	pub fn pop2(&mut self) -> Result<u64, VmError> {
		match self.peek_slot()? {
			Slot::Wide(value) => {
				self.slots.pop();
				Ok(value)
			},
			Slot::Single(_) => Err(VmError::CategoryMismatch { expected: 2 }),
		}
	}

	/// Pops entries making up exactly `words` words, returning them bottom first.
	///
	/// This is what the `pop2` and `dup*` instructions operate on. An entry that would only partially fit gives
	/// [`VmError::CategoryMismatch`].
	pub fn pop_words(&mut self, words: usize) -> Result<Vec<Slot>, VmError> {
		let mut taken = Vec::new();
		let mut count = 0;
		while count < words {
			let error = match self.slots.last() {
				None => Some(VmError::StackUnderflow),
				Some(slot) if count + slot.words() > words => Some(VmError::CategoryMismatch { expected: 1 }),
				Some(_) => None,
			};
			if let Some(error) = error {
				// put back what we took, so the stack stays untouched on failure
				self.slots.extend(taken.into_iter().rev());
				return Err(error);
			}
			let slot = self.peek_slot()?;
			self.slots.pop();
			count += slot.words();
			taken.push(slot);
		}
		taken.reverse();
		Ok(taken)
	}

	pub fn push_int(&mut self, value: i32) -> Result<(), VmError> {
		self.push1(value as u32)
	}
	pub fn pop_int(&mut self) -> Result<i32, VmError> {
		Ok(self.pop1()? as i32)
	}
	pub fn push_float(&mut self, value: f32) -> Result<(), VmError> {
		self.push1(value.to_bits())
	}
	pub fn pop_float(&mut self) -> Result<f32, VmError> {
		Ok(f32::from_bits(self.pop1()?))
	}
	pub fn push_long(&mut self, value: i64) -> Result<(), VmError> {
		self.push2(value as u64)
	}
	pub fn pop_long(&mut self) -> Result<i64, VmError> {
		Ok(self.pop2()? as i64)
	}
	pub fn push_double(&mut self, value: f64) -> Result<(), VmError> {
		self.push2(value.to_bits())
	}
	pub fn pop_double(&mut self) -> Result<f64, VmError> {
		Ok(f64::from_bits(self.pop2()?))
	}
	pub fn push_reference(&mut self, reference: Option<Handle>) -> Result<(), VmError> {
		self.push1(Handle::to_raw(reference))
	}
	pub fn pop_reference(&mut self) -> Result<Option<Handle>, VmError> {
		Ok(Handle::from_raw(self.pop1()?))
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use crate::error::VmError;
	use crate::stack::{OperandStack, Slot};

	#[test]
	fn depth_is_net_push_count() {
		let mut stack = OperandStack::new(4);
		stack.push1(1).unwrap();
		stack.push2(2).unwrap();
		stack.push1(3).unwrap();
		assert_eq!(stack.pop1().unwrap(), 3);
		stack.push2(4).unwrap();
		assert_eq!(stack.depth(), 3);
	}

	#[test]
	fn overflow_keeps_slots() {
		let mut stack = OperandStack::new(2);
		stack.push1(7).unwrap();
		stack.push2(u64::MAX).unwrap();
		assert!(matches!(stack.push1(9), Err(VmError::StackOverflow { max: 2 })));
		assert!(matches!(stack.push2(9), Err(VmError::StackOverflow { max: 2 })));
		assert_eq!(stack.pop2().unwrap(), u64::MAX);
		assert_eq!(stack.pop1().unwrap(), 7);
		assert!(matches!(stack.pop1(), Err(VmError::StackUnderflow)));
		assert!(matches!(stack.pop2(), Err(VmError::StackUnderflow)));
	}

	#[test]
	fn wide_values_are_not_split() {
		let mut stack = OperandStack::new(2);
		stack.push_double(f64::from_bits(0x7ff8_0000_0000_0001)).unwrap();
		assert!(matches!(stack.pop1(), Err(VmError::CategoryMismatch { expected: 1 })));
		assert_eq!(stack.pop_double().unwrap().to_bits(), 0x7ff8_0000_0000_0001);
	}

	#[test]
	fn float_bits_survive() {
		let mut stack = OperandStack::new(1);
		let nan = f32::from_bits(0x7fa0_0001);
		stack.push_float(nan).unwrap();
		assert_eq!(stack.pop1().unwrap(), 0x7fa0_0001);
	}

	#[test]
	fn pop_words() {
		let mut stack = OperandStack::new(4);
		stack.push1(1).unwrap();
		stack.push1(2).unwrap();
		stack.push2(3).unwrap();
		assert_eq!(stack.pop_words(2).unwrap(), vec![Slot::Wide(3)]);
		assert_eq!(stack.pop_words(2).unwrap(), vec![Slot::Single(1), Slot::Single(2)]);

		stack.push2(5).unwrap();
		stack.push1(6).unwrap();
		assert!(matches!(stack.pop_words(2), Err(VmError::CategoryMismatch { .. })));
		assert_eq!(stack.depth(), 2);
		assert_eq!(stack.pop1().unwrap(), 6);
	}
}
