//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::io;

use thiserror::Error;

use crate::ast::NodeKind;

#[derive(Debug, Error)]
pub enum AssemblyError {
	#[error("lex error on line {line}: {kind}")]
	Lex { line: usize, kind: LexError },

	#[error("syntax error on line {line}: {kind}")]
	Syntax { line: usize, kind: SyntaxError },

	#[error("malformed syntax tree: {0}")]
	Ast(#[from] AstError),

	#[error("Jump target '{0}' is not a defined label.")]
	UndefinedLabel(String),

	#[error("failed to patch jump: {0}")]
	Patch(#[from] io::Error),
}

/// Character-level problems inside a label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
	#[error("Label name cannot contain whitespace characters.")]
	LabelWhitespace,

	#[error("Label name '{0}' must end with a colon.")]
	LabelMissingColon(String),

	#[error("Label name cannot be empty.")]
	EmptyLabel,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
	#[error("'#' must be followed by a number (either positive or negative).")]
	MissingNumber,

	#[error("'-' must be followed by a decimal digit.")]
	MissingDigit,

	#[error("Numeric constant '{0}' is out of range.")]
	NumberOutOfRange(String),

	#[error("Current lexeme '{0}' is not a valid register or instruction.")]
	InvalidLexeme(String),

	#[error("Instruction line must be prefixed by valid mnemonic.")]
	MissingMnemonic,

	#[error("Unknown instruction.")]
	UnknownInstruction,

	#[error("'{0}' operands must be separated by a comma.")]
	MissingComma(String),

	#[error("'{0}' instruction must be followed by register name or number.")]
	ExpectedRegisterOrNumber(String),

	#[error("'{0}' instruction must be followed by register name.")]
	ExpectedRegister(String),

	#[error("'{0}' instruction must be followed by label name.")]
	ExpectedLabel(String),

	#[error("Number cannot be placed in second operand when its mnemonic is '{0}'.")]
	NumberDestination(String),

	#[error(
		"First operand of '{0}' must be register or numeric constant, and second operand must be register."
	)]
	InvalidOperands(String),
}

/// Structural problems in a syntax tree handed to the code generator.
///
/// The parser never produces these; they only show up for hand-built trees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
	#[error("expected a root node, found {0}")]
	NotRoot(NodeKind),

	#[error("root node may only contain labels and instruction lines, found {0}")]
	UnexpectedRootChild(NodeKind),

	#[error("instruction line must start with a mnemonic")]
	MissingMnemonic,

	#[error("jump-related instruction '{0}' must be followed by label name")]
	ExpectedJumpLabel(String),

	#[error("operands do not match instruction '{0}'")]
	MalformedInstruction(String),
}
