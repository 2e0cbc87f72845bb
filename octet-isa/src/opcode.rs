//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::Register;

pub const INCB_BASE: u8 = 0x90;
pub const DECB_BASE: u8 = 0x94;
pub const PRIB_REGISTER_BASE: u8 = 0xb0;
pub const PRIB_IMMEDIATE: u8 = 0xbf;
pub const JUMP_PREFIX: u8 = 0xc0;
pub const BITWISE_PREFIX: u8 = 0xc1;
pub const HALT: u8 = 0xf4;

/// Prefix, subtype and a 32-bit big-endian absolute target.
pub const JUMP_LEN: usize = 6;

const REGISTER_BLOCK_LEN: u8 = Register::COUNT as u8;
const PAIR_BLOCK_LEN: u8 = REGISTER_BLOCK_LEN * REGISTER_BLOCK_LEN;

macro_rules! mnemonic_enum {
	(
		$(#[$meta:meta])*
		$vis:vis enum $name:ident {
			$($variant:ident $(= $value:literal)? => $mnemonic:literal),+ $(,)?
		}
	) => {
		$(#[$meta])*
		$vis enum $name {
			$($variant $(= $value)?),+
		}

		impl $name {
			pub const ALL: &'static [$name] = &[$(Self::$variant),+];

			pub const fn mnemonic(self) -> &'static str {
				match self {
					$(Self::$variant => $mnemonic),+
				}
			}

			pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
				match mnemonic {
					$($mnemonic => Some(Self::$variant),)+
					_ => None,
				}
			}
		}

		impl Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.mnemonic())
			}
		}
	};
}

mnemonic_enum! {
	/// Two-operand arithmetic family: `op <src>, <dst>`.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub enum AluOp {
		Move => "movb",
		Add => "addb",
		Subtract => "subb",
		Multiply => "mulb",
		Divide => "divb",
		Compare => "cmpb",
	}
}

mnemonic_enum! {
	/// Two-operand bitwise family, encoded behind [`BITWISE_PREFIX`].
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub enum BitwiseOp {
		Or => "orb",
		Xor => "xorb",
	}
}

mnemonic_enum! {
	/// Jump subtype, encoded right after [`JUMP_PREFIX`].
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
	#[repr(u8)]
	pub enum JumpCondition {
		Always = 0x10 => "jmp",
		Equal = 0x11 => "je",
		NotEqual = 0x12 => "jne",
		Zero = 0x13 => "jz",
		NotZero = 0x14 => "jnz",
		Greater = 0x15 => "jg",
		GreaterOrEqual = 0x16 => "jge",
		Less = 0x17 => "jl",
		LessOrEqual = 0x18 => "jle",
	}
}

mnemonic_enum! {
	/// Single-operand family.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub enum UnaryOp {
		Print => "prib",
		Increment => "incb",
		Decrement => "decb",
	}
}

pub const HALT_MNEMONIC: &str = "halt";

/// A decoded primary opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
	AluRegisters {
		op: AluOp,
		src: Register,
		dst: Register,
	},
	AluImmediate {
		op: AluOp,
		dst: Register,
	},
	Increment(Register),
	Decrement(Register),
	PrintRegister(Register),
	PrintImmediate,
	JumpPrefix,
	BitwisePrefix,
	Halt,
}

/// A decoded subtype byte following [`BITWISE_PREFIX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseSubtype {
	Registers {
		op: BitwiseOp,
		src: Register,
		dst: Register,
	},
	Immediate {
		op: BitwiseOp,
		dst: Register,
	},
}

const fn register_pair(base: u8, src: Register, dst: Register) -> u8 {
	base + (dst as u8) * REGISTER_BLOCK_LEN + src as u8
}

fn block_offset(byte: u8, base: u8, len: u8) -> Option<u8> {
	byte.checked_sub(base).filter(|offset| *offset < len)
}

fn pair_from_offset(offset: u8) -> (Register, Register) {
	(
		Register::from_low_bits(offset),
		Register::from_low_bits(offset / REGISTER_BLOCK_LEN),
	)
}

impl AluOp {
	pub const fn register_base(self) -> u8 {
		match self {
			Self::Move => 0x10,
			Self::Add => 0x20,
			Self::Subtract => 0x30,
			Self::Multiply => 0x40,
			Self::Divide => 0x70,
			Self::Compare => 0x80,
		}
	}

	pub const fn immediate_base(self) -> u8 {
		match self {
			Self::Move => 0x50,
			Self::Add => 0x54,
			Self::Subtract => 0x58,
			Self::Multiply => 0x5c,
			Self::Divide => 0x60,
			Self::Compare => 0x64,
		}
	}

	fn decode(self, byte: u8) -> Option<Opcode> {
		if let Some(offset) = block_offset(byte, self.register_base(), PAIR_BLOCK_LEN) {
			let (src, dst) = pair_from_offset(offset);
			return Some(Opcode::AluRegisters { op: self, src, dst });
		}
		block_offset(byte, self.immediate_base(), REGISTER_BLOCK_LEN).map(|offset| {
			Opcode::AluImmediate {
				op: self,
				dst: Register::from_low_bits(offset),
			}
		})
	}
}

impl BitwiseOp {
	pub const fn register_base(self) -> u8 {
		match self {
			Self::Or => 0x14,
			Self::Xor => 0x28,
		}
	}

	pub const fn immediate_base(self) -> u8 {
		match self {
			Self::Or => 0x10,
			Self::Xor => 0x24,
		}
	}

	fn decode(self, byte: u8) -> Option<BitwiseSubtype> {
		if let Some(offset) = block_offset(byte, self.register_base(), PAIR_BLOCK_LEN) {
			let (src, dst) = pair_from_offset(offset);
			return Some(BitwiseSubtype::Registers { op: self, src, dst });
		}
		block_offset(byte, self.immediate_base(), REGISTER_BLOCK_LEN).map(|offset| {
			BitwiseSubtype::Immediate {
				op: self,
				dst: Register::from_low_bits(offset),
			}
		})
	}
}

impl JumpCondition {
	pub fn test(&self, zero: bool, greater: bool, less: bool) -> bool {
		match self {
			JumpCondition::Always => true,
			JumpCondition::Equal | JumpCondition::Zero => zero,
			JumpCondition::NotEqual | JumpCondition::NotZero => !zero,
			JumpCondition::Greater => greater,
			JumpCondition::GreaterOrEqual => greater || zero,
			JumpCondition::Less => less,
			JumpCondition::LessOrEqual => less || zero,
		}
	}
}

impl From<Opcode> for u8 {
	fn from(value: Opcode) -> Self {
		match value {
			Opcode::AluRegisters { op, src, dst } => register_pair(op.register_base(), src, dst),
			Opcode::AluImmediate { op, dst } => op.immediate_base() + dst as u8,
			Opcode::Increment(reg) => INCB_BASE + reg as u8,
			Opcode::Decrement(reg) => DECB_BASE + reg as u8,
			Opcode::PrintRegister(reg) => PRIB_REGISTER_BASE + reg as u8,
			Opcode::PrintImmediate => PRIB_IMMEDIATE,
			Opcode::JumpPrefix => JUMP_PREFIX,
			Opcode::BitwisePrefix => BITWISE_PREFIX,
			Opcode::Halt => HALT,
		}
	}
}

impl TryFrom<u8> for Opcode {
	type Error = u8;

	fn try_from(byte: u8) -> Result<Self, Self::Error> {
		if let Some(opcode) = AluOp::ALL.iter().find_map(|op| op.decode(byte)) {
			return Ok(opcode);
		}

		let opcode = match byte {
			PRIB_IMMEDIATE => Self::PrintImmediate,
			JUMP_PREFIX => Self::JumpPrefix,
			BITWISE_PREFIX => Self::BitwisePrefix,
			HALT => Self::Halt,
			_ => {
				if let Some(offset) = block_offset(byte, INCB_BASE, REGISTER_BLOCK_LEN) {
					Self::Increment(Register::from_low_bits(offset))
				} else if let Some(offset) = block_offset(byte, DECB_BASE, REGISTER_BLOCK_LEN) {
					Self::Decrement(Register::from_low_bits(offset))
				} else if let Some(offset) =
					block_offset(byte, PRIB_REGISTER_BASE, REGISTER_BLOCK_LEN)
				{
					Self::PrintRegister(Register::from_low_bits(offset))
				} else {
					return Err(byte);
				}
			},
		};

		Ok(opcode)
	}
}

impl From<BitwiseSubtype> for u8 {
	fn from(value: BitwiseSubtype) -> Self {
		match value {
			BitwiseSubtype::Registers { op, src, dst } => register_pair(op.register_base(), src, dst),
			BitwiseSubtype::Immediate { op, dst } => op.immediate_base() + dst as u8,
		}
	}
}

impl TryFrom<u8> for BitwiseSubtype {
	type Error = u8;

	fn try_from(byte: u8) -> Result<Self, Self::Error> {
		BitwiseOp::ALL
			.iter()
			.find_map(|op| op.decode(byte))
			.ok_or(byte)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn register_pairs_follow_dst_major_layout() {
		let movb_r1_to_r0 = Opcode::AluRegisters {
			op: AluOp::Move,
			src: Register::R1,
			dst: Register::R0,
		};
		assert_eq!(u8::from(movb_r1_to_r0), 0x11);

		let subb_r3_to_r3 = Opcode::AluRegisters {
			op: AluOp::Subtract,
			src: Register::R3,
			dst: Register::R3,
		};
		assert_eq!(u8::from(subb_r3_to_r3), 0x3f);

		let addb_r0_to_r2 = Opcode::AluRegisters {
			op: AluOp::Add,
			src: Register::R0,
			dst: Register::R2,
		};
		assert_eq!(u8::from(addb_r0_to_r2), 0x28);
	}

	#[test]
	fn immediate_and_unary_bases() {
		let divb_imm_r3 = Opcode::AluImmediate {
			op: AluOp::Divide,
			dst: Register::R3,
		};
		assert_eq!(u8::from(divb_imm_r3), 0x63);
		assert_eq!(u8::from(Opcode::PrintRegister(Register::R2)), 0xb2);
		assert_eq!(u8::from(Opcode::PrintImmediate), 0xbf);
		assert_eq!(u8::from(Opcode::Increment(Register::R1)), 0x91);
		assert_eq!(u8::from(Opcode::Decrement(Register::R3)), 0x97);
	}

	#[test]
	fn bitwise_subtypes() {
		let orb_imm_r2 = BitwiseSubtype::Immediate {
			op: BitwiseOp::Or,
			dst: Register::R2,
		};
		assert_eq!(u8::from(orb_imm_r2), 0x12);

		let orb_r0_to_r1 = BitwiseSubtype::Registers {
			op: BitwiseOp::Or,
			src: Register::R0,
			dst: Register::R1,
		};
		assert_eq!(u8::from(orb_r0_to_r1), 0x18);

		let xorb_r3_to_r3 = BitwiseSubtype::Registers {
			op: BitwiseOp::Xor,
			src: Register::R3,
			dst: Register::R3,
		};
		assert_eq!(u8::from(xorb_r3_to_r3), 0x37);
		assert_eq!(BitwiseSubtype::try_from(0x38), Err(0x38));
	}

	#[test]
	fn every_decodable_byte_encodes_back() {
		let mut decodable = 0;
		for byte in 0..=u8::MAX {
			if let Ok(opcode) = Opcode::try_from(byte) {
				assert_eq!(u8::from(opcode), byte, "{:?}", opcode);
				decodable += 1;
			}
		}
		// 6 pair blocks, 6 immediate blocks, incb, decb, prib, plus 4 single bytes
		assert_eq!(decodable, 6 * 16 + 6 * 4 + 3 * 4 + 4);

		for byte in 0..=u8::MAX {
			if let Ok(subtype) = BitwiseSubtype::try_from(byte) {
				assert_eq!(u8::from(subtype), byte);
			}
		}
	}

	#[test]
	fn jump_subtypes() {
		assert_eq!(u8::from(JumpCondition::Always), 0x10);
		assert_eq!(u8::from(JumpCondition::LessOrEqual), 0x18);
		assert_eq!(
			JumpCondition::try_from(0x16).ok(),
			Some(JumpCondition::GreaterOrEqual)
		);
		assert!(JumpCondition::try_from(0x19).is_err());
		assert_eq!(JumpCondition::from_mnemonic("jge"), Some(JumpCondition::GreaterOrEqual));
	}

	#[test]
	fn conditions_read_flags() {
		assert!(JumpCondition::Always.test(false, false, false));
		assert!(JumpCondition::Equal.test(true, false, false));
		assert!(!JumpCondition::NotZero.test(true, false, false));
		assert!(JumpCondition::GreaterOrEqual.test(true, false, false));
		assert!(JumpCondition::GreaterOrEqual.test(false, true, false));
		assert!(!JumpCondition::GreaterOrEqual.test(false, false, true));
		assert!(JumpCondition::LessOrEqual.test(false, false, true));
		assert!(!JumpCondition::Less.test(true, false, false));
	}
}
