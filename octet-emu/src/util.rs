//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{
	cmp::Ordering,
	ops::{Index, IndexMut},
};

use auto_ops::*;
use bitflags::bitflags;
use octet_isa::{JumpCondition, Register};

bitflags! {
	/// Condition bits written by `cmpb`. At most one is ever set.
	#[derive(Debug, Clone, Copy, PartialEq, Eq)]
	pub struct Flags: u32 {
		const ZERO = 1 << 0;
		const GREATER = 1 << 1;
		const LESS = 1 << 2;
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterFile([i32; Register::COUNT]);

/// Position inside the bytecode image. Arithmetic wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct BytecodeOffset(usize);

impl Flags {
	/// Replaces the comparison bits with the one matching `ordering`.
	pub fn set_comparison(&mut self, ordering: Ordering) {
		self.remove(Self::all());
		self.insert(match ordering {
			Ordering::Less => Self::LESS,
			Ordering::Equal => Self::ZERO,
			Ordering::Greater => Self::GREATER,
		});
	}

	pub fn test_condition(&self, condition: JumpCondition) -> bool {
		condition.test(
			self.contains(Self::ZERO),
			self.contains(Self::GREATER),
			self.contains(Self::LESS),
		)
	}
}

impl RegisterFile {
	pub const fn new() -> Self {
		Self([0; Register::COUNT])
	}
}

impl Index<Register> for RegisterFile {
	type Output = i32;

	fn index(&self, index: Register) -> &Self::Output {
		&self.0[index.index()]
	}
}

impl IndexMut<Register> for RegisterFile {
	fn index_mut(&mut self, index: Register) -> &mut Self::Output {
		&mut self.0[index.index()]
	}
}

impl BytecodeOffset {
	pub const fn new(offset: usize) -> Self {
		Self(offset)
	}

	pub const fn get(&self) -> usize {
		self.0
	}
}

impl_op_ex!(+ |offset: &BytecodeOffset, amount: &usize| -> BytecodeOffset { BytecodeOffset::new(offset.0.wrapping_add(*amount)) });
impl_op_ex!(- |offset: &BytecodeOffset, amount: &usize| -> BytecodeOffset { BytecodeOffset::new(offset.0.wrapping_sub(*amount)) });
impl_op_ex!(+= |offset: &mut BytecodeOffset, amount: &usize| { *offset = *offset + amount; });
impl_op_ex!(-= |offset: &mut BytecodeOffset, amount: &usize| { *offset = *offset - amount; });

impl From<usize> for BytecodeOffset {
	fn from(value: usize) -> Self {
		Self::new(value)
	}
}

impl From<BytecodeOffset> for usize {
	fn from(value: BytecodeOffset) -> Self {
		value.0
	}
}
