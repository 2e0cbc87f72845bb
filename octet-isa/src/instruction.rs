//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use byteorder::{BigEndian, ByteOrder};

use crate::{
	encode_immediate, AluOp, BitwiseOp, BitwiseSubtype, JumpCondition, Opcode, Register,
	HALT_MNEMONIC, IMMEDIATE_LEN, JUMP_LEN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
	Register(Register),
	Immediate(i64),
}

/// A fully decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
	Alu {
		op: AluOp,
		src: Operand,
		dst: Register,
	},
	Bitwise {
		op: BitwiseOp,
		src: Operand,
		dst: Register,
	},
	Increment(Register),
	Decrement(Register),
	Print(Operand),
	Jump {
		condition: JumpCondition,
		target: u32,
	},
	Halt,
}

impl Operand {
	const fn trailing_len(&self) -> usize {
		match self {
			Self::Register(_) => 0,
			Self::Immediate(_) => IMMEDIATE_LEN,
		}
	}
}

impl Instruction {
	pub const fn encoded_len(&self) -> usize {
		match self {
			Self::Alu { src, .. } | Self::Print(src) => 1 + src.trailing_len(),
			Self::Bitwise { src, .. } => 2 + src.trailing_len(),
			Self::Increment(_) | Self::Decrement(_) | Self::Halt => 1,
			Self::Jump { .. } => JUMP_LEN,
		}
	}

	/// Appends the encoded form of this instruction to `out`.
	pub fn encode(&self, out: &mut Vec<u8>) {
		let immediate = match *self {
			Self::Alu { op, src, dst } => match src {
				Operand::Register(src) => {
					out.push(Opcode::AluRegisters { op, src, dst }.into());
					None
				},
				Operand::Immediate(value) => {
					out.push(Opcode::AluImmediate { op, dst }.into());
					Some(value)
				},
			},
			Self::Bitwise { op, src, dst } => {
				out.push(Opcode::BitwisePrefix.into());
				match src {
					Operand::Register(src) => {
						out.push(BitwiseSubtype::Registers { op, src, dst }.into());
						None
					},
					Operand::Immediate(value) => {
						out.push(BitwiseSubtype::Immediate { op, dst }.into());
						Some(value)
					},
				}
			},
			Self::Increment(reg) => {
				out.push(Opcode::Increment(reg).into());
				None
			},
			Self::Decrement(reg) => {
				out.push(Opcode::Decrement(reg).into());
				None
			},
			Self::Print(Operand::Register(reg)) => {
				out.push(Opcode::PrintRegister(reg).into());
				None
			},
			Self::Print(Operand::Immediate(value)) => {
				out.push(Opcode::PrintImmediate.into());
				Some(value)
			},
			Self::Jump { condition, target } => {
				let mut bytes = [0u8; JUMP_LEN];
				bytes[0] = Opcode::JumpPrefix.into();
				bytes[1] = condition.into();
				BigEndian::write_u32(&mut bytes[2..], target);
				out.extend_from_slice(&bytes);
				None
			},
			Self::Halt => {
				out.push(Opcode::Halt.into());
				None
			},
		};

		if let Some(value) = immediate {
			out.extend_from_slice(&encode_immediate(value));
		}
	}
}

impl Display for Operand {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Register(reg) => write!(f, "{}", reg),
			Self::Immediate(value) => write!(f, "#{}", value),
		}
	}
}

impl Display for Instruction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Alu { op, src, dst } => write!(f, "{} {}, {}", op, src, dst),
			Self::Bitwise { op, src, dst } => write!(f, "{} {}, {}", op, src, dst),
			Self::Increment(reg) => write!(f, "incb {}", reg),
			Self::Decrement(reg) => write!(f, "decb {}", reg),
			Self::Print(operand) => write!(f, "prib {}", operand),
			Self::Jump { condition, target } => write!(f, "{} {:#010x}", condition, target),
			Self::Halt => write!(f, "{}", HALT_MNEMONIC),
		}
	}
}
