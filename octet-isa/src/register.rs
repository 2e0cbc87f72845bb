//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Register {
	R0 = 0,
	R1 = 1,
	R2 = 2,
	R3 = 3,
}

impl Register {
	pub const COUNT: usize = 4;
	pub const ALL: [Register; Self::COUNT] = [Self::R0, Self::R1, Self::R2, Self::R3];

	pub const fn index(self) -> usize {
		self as usize
	}

	/// Selects a register from the low two bits of `bits`.
	pub const fn from_low_bits(bits: u8) -> Self {
		match bits & 3 {
			0 => Self::R0,
			1 => Self::R1,
			2 => Self::R2,
			_ => Self::R3,
		}
	}

	pub const fn name(self) -> &'static str {
		match self {
			Self::R0 => "r0",
			Self::R1 => "r1",
			Self::R2 => "r2",
			Self::R3 => "r3",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|reg| reg.name() == name)
	}
}

impl Display for Register {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}
