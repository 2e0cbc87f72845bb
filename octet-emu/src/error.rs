//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::io;

use thiserror::Error;

/// Faults that stop the interpreter. Register and flag state is left as of
/// the last completed instruction.
#[derive(Debug, Error)]
pub enum RuntimeError {
	/// `offset` is the last byte that could still be read.
	#[error("Invalid next bytecode at offset {offset}.")]
	InvalidNextBytecode { offset: usize },

	#[error("Invalid number sign bytecode at offset {offset}.")]
	InvalidNumberSign { offset: usize },

	#[error("Division by zero.")]
	DivisionByZero,

	#[error("Invalid opcode {opcode:#04x} at offset {offset}.")]
	InvalidOpcode { opcode: u8, offset: usize },

	#[error("Invalid subtype {subtype:#04x} for prefix {prefix:#04x} at offset {offset}.")]
	InvalidSubtype {
		prefix: u8,
		subtype: u8,
		offset: usize,
	},

	#[error("Failed to write program output: {0}")]
	Output(#[from] io::Error),
}
