use log::trace;
use crate::error::{Fault, VmError};
use crate::frame::Frame;
use crate::instructions;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// What the run loop does after an instruction completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
	/// Execute the instruction at the new `pc`.
	Continue,
	/// Leave the frame, handing the value to the caller.
	Return(Option<Value>),
}

/// Executes one instruction.
///
/// The handler is called with `frame.pc` pointing at its opcode. It reads its own operands and must leave `pc` at
/// the next instruction to execute. On failure, `pc` still points at the failing instruction.
pub type Handler = fn(&mut Interpreter, &mut Frame) -> Result<Flow, Fault>;

/// The handler for every opcode, built once per [`Interpreter`].
pub struct DispatchTable {
	handlers: [Handler; 256],
	implemented: [bool; 256],
}

impl DispatchTable {
	pub fn new() -> DispatchTable {
		let mut table = DispatchTable {
			handlers: [unknown_opcode as Handler; 256],
			implemented: [false; 256],
		};
		instructions::register(&mut table);
		trace!("dispatch table has {} implemented opcodes", table.implemented().count());
		table
	}

	pub fn set(&mut self, opcode: u8, handler: Handler) {
		self.handlers[opcode as usize] = handler;
		self.implemented[opcode as usize] = true;
	}

	pub fn get(&self, opcode: u8) -> Handler {
		self.handlers[opcode as usize]
	}

	/// Iterates over the opcodes that don't trap with [`VmError::UnknownOpcode`].
	pub fn implemented(&self) -> impl Iterator<Item=u8> + '_ {
		(0..=255u8).filter(|&opcode| self.implemented[opcode as usize])
	}
}

impl Default for DispatchTable {
	fn default() -> Self {
		DispatchTable::new()
	}
}

fn unknown_opcode(_: &mut Interpreter, frame: &mut Frame) -> Result<Flow, Fault> {
	Err(VmError::UnknownOpcode { opcode: frame.opcode()? }.into())
}
