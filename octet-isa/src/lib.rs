//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

//! Instruction set shared by the assembler and the emulator.
//!
//! Every instruction starts with a single opcode byte. Register operands are
//! folded into that byte, immediates follow it as a sign byte plus a 32-bit
//! big-endian magnitude, and the jump and bitwise families use a prefix byte
//! followed by a subtype byte.

mod immediate;
mod instruction;
mod opcode;
mod register;

pub use immediate::*;
pub use instruction::*;
pub use opcode::*;
pub use register::*;
