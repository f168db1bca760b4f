use std::fmt::{Display, Formatter};
use crate::error::DecodeError;
use crate::insn;

/// The operands of one instruction, already decoded.
///
/// Branch targets are stored as absolute code offsets, computed from the offset relative to the opcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
	None,
	/// The value of `bipush` and `sipush`, or the `atype` of `newarray`.
	Immediate(i32),
	Local(u16),
	Pool(u16),
	Increment { index: u16, delta: i16 },
	Branch(i64),
	InvokeInterface { index: u16, count: u8 },
	MultiANewArray { index: u16, dimensions: u8 },
	TableSwitch { default: i64, low: i32, targets: Vec<i64> },
	LookupSwitch { default: i64, pairs: Vec<(i32, i64)> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
	pub pc: usize,
	pub opcode: u8,
	/// Set if a `wide` prefix was in front of the opcode, in that case `pc` points at the `wide`.
	pub wide: bool,
	pub operands: Operands,
	pub length: usize,
}

impl Display for Instruction {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:>5}: ", self.pc)?;
		if self.wide {
			write!(f, "wide ")?;
		}
		write!(f, "{}", insn::mnemonic(self.opcode).unwrap_or("<unknown>"))?;
		match &self.operands {
			Operands::None => Ok(()),
			Operands::Immediate(value) => write!(f, " {value}"),
			Operands::Local(index) => write!(f, " {index}"),
			Operands::Pool(index) => write!(f, " #{index}"),
			Operands::Increment { index, delta } => write!(f, " {index}, {delta}"),
			Operands::Branch(target) => write!(f, " {target}"),
			Operands::InvokeInterface { index, count } => write!(f, " #{index}, {count}"),
			Operands::MultiANewArray { index, dimensions } => write!(f, " #{index}, {dimensions}"),
			Operands::TableSwitch { default, low, targets } => {
				write!(f, " {{")?;
				for (i, target) in targets.iter().enumerate() {
					write!(f, " {}: {target},", *low as i64 + i as i64)?;
				}
				write!(f, " default: {default} }}")
			},
			Operands::LookupSwitch { default, pairs } => {
				write!(f, " {{")?;
				for (key, target) in pairs {
					write!(f, " {key}: {target},")?;
				}
				write!(f, " default: {default} }}")
			},
		}
	}
}

struct Code<'a> {
	code: &'a [u8],
	/// Where the instruction being decoded starts, for error messages and branch targets.
	start: usize,
	pos: usize,
}

impl Code<'_> {
	fn bytes<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
		let slice = self.code.get(self.pos..self.pos + N)
			.ok_or_else(|| DecodeError::BadBytecode {
				pc: self.start,
				reason: format!("operands run past the end of the code, at {}", self.pos),
			})?;
		let mut buf = [0u8; N];
		buf.copy_from_slice(slice);
		self.pos += N;
		Ok(buf)
	}
	fn u8(&mut self) -> Result<u8, DecodeError> {
		Ok(u8::from_be_bytes(self.bytes()?))
	}
	fn u16(&mut self) -> Result<u16, DecodeError> {
		Ok(u16::from_be_bytes(self.bytes()?))
	}
	fn i16(&mut self) -> Result<i16, DecodeError> {
		Ok(i16::from_be_bytes(self.bytes()?))
	}
	fn i32(&mut self) -> Result<i32, DecodeError> {
		Ok(i32::from_be_bytes(self.bytes()?))
	}
	fn remaining(&self) -> usize {
		self.code.len().saturating_sub(self.pos)
	}
	fn target(&self, offset: i32) -> i64 {
		self.start as i64 + offset as i64
	}
}

/// The number of padding bytes after a `tableswitch` or `lookupswitch` opcode at `pc`.
///
/// The operands start at the next multiple of four, counted from the start of the code.
pub fn switch_padding(pc: usize) -> usize {
	(4 - (pc + 1) % 4) % 4
}

/// Decodes the instruction starting at `pc`.
pub fn decode(code: &[u8], pc: usize) -> Result<Instruction, DecodeError> {
	let opcode = *code.get(pc)
		.ok_or_else(|| DecodeError::BadBytecode { pc, reason: "pc is outside of the code".to_owned() })?;
	let mut c = Code { code, start: pc, pos: pc + 1 };

	let operands = match opcode {
		insn::bipush => Operands::Immediate(c.u8()? as i8 as i32),
		insn::sipush => Operands::Immediate(c.i16()? as i32),
		insn::newarray => Operands::Immediate(c.u8()? as i32),
		insn::ldc => Operands::Pool(c.u8()? as u16),
		insn::ldc_w | insn::ldc2_w |
		insn::getstatic | insn::putstatic | insn::getfield | insn::putfield |
		insn::invokevirtual | insn::invokespecial | insn::invokestatic |
		insn::new | insn::anewarray | insn::checkcast | insn::instanceof => Operands::Pool(c.u16()?),
		insn::invokedynamic => {
			let index = c.u16()?;
			c.u16()?; // two zero bytes
			Operands::Pool(index)
		},
		insn::invokeinterface => {
			let index = c.u16()?;
			let count = c.u8()?;
			c.u8()?; // a zero byte
			Operands::InvokeInterface { index, count }
		},
		insn::multianewarray => Operands::MultiANewArray { index: c.u16()?, dimensions: c.u8()? },
		insn::iload | insn::lload | insn::fload | insn::dload | insn::aload |
		insn::istore | insn::lstore | insn::fstore | insn::dstore | insn::astore |
		insn::ret => Operands::Local(c.u8()? as u16),
		insn::iinc => Operands::Increment { index: c.u8()? as u16, delta: c.u8()? as i8 as i16 },
		insn::ifeq | insn::ifne | insn::iflt | insn::ifge | insn::ifgt | insn::ifle |
		insn::if_icmpeq | insn::if_icmpne | insn::if_icmplt | insn::if_icmpge | insn::if_icmpgt | insn::if_icmple |
		insn::if_acmpeq | insn::if_acmpne | insn::goto | insn::jsr |
		insn::ifnull | insn::ifnonnull => {
			let offset = c.i16()?;
			Operands::Branch(c.target(offset as i32))
		},
		insn::goto_w | insn::jsr_w => {
			let offset = c.i32()?;
			Operands::Branch(c.target(offset))
		},
		insn::tableswitch => {
			c.pos += switch_padding(pc);
			let default = c.i32()?;
			let low = c.i32()?;
			let high = c.i32()?;
			if low > high {
				return Err(DecodeError::BadBytecode { pc, reason: format!("tableswitch low {low} is greater than high {high}") });
			}
			let count = (high as i64 - low as i64 + 1) as usize;
			if count > c.remaining() / 4 {
				return Err(DecodeError::BadBytecode { pc, reason: format!("tableswitch with {count} targets runs past the end of the code") });
			}
			let mut targets = Vec::with_capacity(count);
			for _ in low..=high {
				let offset = c.i32()?;
				targets.push(c.target(offset));
			}
			Operands::TableSwitch { default: c.target(default), low, targets }
		},
		insn::lookupswitch => {
			c.pos += switch_padding(pc);
			let default = c.i32()?;
			let npairs = c.i32()?;
			if npairs < 0 {
				return Err(DecodeError::BadBytecode { pc, reason: format!("lookupswitch npairs {npairs} is negative") });
			}
			if npairs as usize > c.remaining() / 8 {
				return Err(DecodeError::BadBytecode { pc, reason: format!("lookupswitch with {npairs} pairs runs past the end of the code") });
			}
			let mut pairs = Vec::with_capacity(npairs as usize);
			for _ in 0..npairs {
				let key = c.i32()?;
				let offset = c.i32()?;
				pairs.push((key, c.target(offset)));
			}
			Operands::LookupSwitch { default: c.target(default), pairs }
		},
		insn::wide => {
			let opcode = c.u8()?;
			let index = c.u16()?;
			let operands = match opcode {
				insn::iinc => Operands::Increment { index, delta: c.i16()? },
				insn::iload | insn::lload | insn::fload | insn::dload | insn::aload |
				insn::istore | insn::lstore | insn::fstore | insn::dstore | insn::astore |
				insn::ret => Operands::Local(index),
				opcode => return Err(DecodeError::BadBytecode { pc, reason: format!("opcode {opcode:#04x} can't be widened") }),
			};
			return Ok(Instruction { pc, opcode, wide: true, operands, length: c.pos - pc });
		},
		_ => Operands::None,
	};

	Ok(Instruction { pc, opcode, wide: false, operands, length: c.pos - pc })
}

/// Decodes the whole code array into a list of instructions.
pub fn disassemble(code: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
	let mut instructions = Vec::new();
	let mut pc = 0;
	while pc < code.len() {
		let instruction = decode(code, pc)?;
		pc += instruction.length;
		instructions.push(instruction);
	}
	Ok(instructions)
}
