//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

pub mod ast;
pub mod codegen;
mod error;
pub mod label;
pub mod lexer;
pub mod parser;

pub use error::*;

use tracing::debug;

/// Assembles `source` into a flat bytecode image that starts executing at
/// offset 0.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblyError> {
	let ast = parser::parse(source)?;
	let bytecode = codegen::generate(&ast)?;
	debug!(bytes = bytecode.len(), "assembled");
	Ok(bytecode)
}
