//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{iter::Peekable, vec::IntoIter};

use octet_isa::{AluOp, BitwiseOp, JumpCondition, UnaryOp, HALT_MNEMONIC};
use tracing::trace;

use crate::{
	ast::Node,
	lexer::{lex, Token, TokenKind},
	AssemblyError, SyntaxError,
};

/// Lexes and parses `source` into a tree rooted at [`Node::Root`].
pub fn parse(source: &str) -> Result<Node, AssemblyError> {
	parse_tokens(lex(source)?)
}

pub fn parse_tokens(tokens: Vec<Token>) -> Result<Node, AssemblyError> {
	let mut tokens = tokens.into_iter().peekable();
	let mut children = Vec::new();

	while let Some(token) = tokens.next() {
		match token.kind {
			TokenKind::Newline => {},
			TokenKind::Label(name) => children.push(Node::Label(name)),
			TokenKind::Mnemonic(mnemonic) => {
				let operands = collect_line(&mut tokens);
				let line = instruction_line(mnemonic, operands).map_err(|kind| {
					AssemblyError::Syntax {
						line: token.line,
						kind,
					}
				})?;
				children.push(line);
			},
			_ => {
				return Err(AssemblyError::Syntax {
					line: token.line,
					kind: SyntaxError::MissingMnemonic,
				})
			},
		}
	}

	trace!(nodes = children.len(), "parsed source");
	Ok(Node::Root(children))
}

/// Everything up to, but not including, the next newline.
fn collect_line(tokens: &mut Peekable<IntoIter<Token>>) -> Vec<TokenKind> {
	let mut line = Vec::new();
	while let Some(token) = tokens.next_if(|token| token.kind != TokenKind::Newline) {
		line.push(token.kind);
	}
	line
}

fn instruction_line(mnemonic: String, operands: Vec<TokenKind>) -> Result<Node, SyntaxError> {
	// arity counts the mnemonic and any comma, as written
	let operands = match operands.len() + 1 {
		1 => validate_nullary(&mnemonic).map(|_| Vec::new())?,
		2 => validate_unary(&mnemonic, operands)?,
		4 => validate_binary(&mnemonic, operands)?,
		_ => return Err(SyntaxError::UnknownInstruction),
	};

	let mut children = Vec::with_capacity(operands.len() + 1);
	children.push(Node::Mnemonic(mnemonic));
	children.extend(operands);
	Ok(Node::InstructionLine(children))
}

fn operand_node(token: TokenKind) -> Option<Node> {
	match token {
		TokenKind::Register(reg) => Some(Node::Register(reg)),
		TokenKind::Number(value) => Some(Node::IntegerValue(value)),
		TokenKind::Label(name) => Some(Node::Label(name)),
		_ => None,
	}
}

fn validate_nullary(mnemonic: &str) -> Result<(), SyntaxError> {
	if mnemonic == HALT_MNEMONIC {
		Ok(())
	} else {
		Err(SyntaxError::UnknownInstruction)
	}
}

fn validate_unary(mnemonic: &str, mut operands: Vec<TokenKind>) -> Result<Vec<Node>, SyntaxError> {
	let operand = operands.pop().ok_or(SyntaxError::UnknownInstruction)?;

	let valid = if let Some(op) = UnaryOp::from_mnemonic(mnemonic) {
		match (op, &operand) {
			(UnaryOp::Print, TokenKind::Register(_) | TokenKind::Number(_)) => true,
			(UnaryOp::Print, _) => {
				return Err(SyntaxError::ExpectedRegisterOrNumber(mnemonic.to_owned()))
			},
			(_, TokenKind::Register(_)) => true,
			_ => return Err(SyntaxError::ExpectedRegister(mnemonic.to_owned())),
		}
	} else if JumpCondition::from_mnemonic(mnemonic).is_some() {
		match operand {
			TokenKind::Label(_) => true,
			_ => return Err(SyntaxError::ExpectedLabel(mnemonic.to_owned())),
		}
	} else {
		false
	};

	match operand_node(operand) {
		Some(node) if valid => Ok(vec![node]),
		_ => Err(SyntaxError::UnknownInstruction),
	}
}

fn validate_binary(mnemonic: &str, operands: Vec<TokenKind>) -> Result<Vec<Node>, SyntaxError> {
	if AluOp::from_mnemonic(mnemonic).is_none() && BitwiseOp::from_mnemonic(mnemonic).is_none() {
		return Err(SyntaxError::UnknownInstruction);
	}

	let [src, separator, dst]: [TokenKind; 3] = operands
		.try_into()
		.map_err(|_| SyntaxError::UnknownInstruction)?;

	if separator != TokenKind::Comma {
		return Err(SyntaxError::MissingComma(mnemonic.to_owned()));
	}

	match (&src, &dst) {
		(_, TokenKind::Number(_)) => Err(SyntaxError::NumberDestination(mnemonic.to_owned())),
		(TokenKind::Register(_) | TokenKind::Number(_), TokenKind::Register(_)) => {
			Ok(operand_node(src).into_iter().chain(operand_node(dst)).collect())
		},
		_ => Err(SyntaxError::InvalidOperands(mnemonic.to_owned())),
	}
}

#[cfg(test)]
mod tests {
	use octet_isa::Register;

	use super::*;

	fn syntax_error(source: &str) -> (usize, SyntaxError) {
		match parse(source) {
			Err(AssemblyError::Syntax { line, kind }) => (line, kind),
			other => panic!("expected a syntax error, got {:?}", other),
		}
	}

	#[test]
	fn builds_tree_in_source_order() {
		let ast = parse("@top:\nsubb #1, r0 ; count down\njne @top\nhalt\n").unwrap();
		assert_eq!(
			ast,
			Node::Root(vec![
				Node::Label("top".into()),
				Node::InstructionLine(vec![
					Node::Mnemonic("subb".into()),
					Node::IntegerValue(1),
					Node::Register(Register::R0),
				]),
				Node::InstructionLine(vec![
					Node::Mnemonic("jne".into()),
					Node::Label("top".into()),
				]),
				Node::InstructionLine(vec![Node::Mnemonic("halt".into())]),
			])
		);
	}

	#[test]
	fn rendered_tree_parses_back() {
		let source = "movb #-3, r1\n@a:\norb r1, r2\nprib #7\njle @a\nhalt\n";
		let ast = parse(source).unwrap();
		assert_eq!(parse(&ast.to_string()).unwrap(), ast);
	}

	#[test]
	fn lines_must_start_with_mnemonic() {
		assert_eq!(syntax_error("halt\nr0\n"), (2, SyntaxError::MissingMnemonic));
		assert_eq!(syntax_error("#4"), (1, SyntaxError::MissingMnemonic));
	}

	#[test]
	fn arity_is_checked_per_mnemonic() {
		assert_eq!(syntax_error("jmp\n").1, SyntaxError::UnknownInstruction);
		assert_eq!(syntax_error("halt r0\n").1, SyntaxError::UnknownInstruction);
		assert_eq!(syntax_error("movb r0\n").1, SyntaxError::UnknownInstruction);
		assert_eq!(syntax_error("movb r0, r1, r2\n").1, SyntaxError::UnknownInstruction);
		assert_eq!(syntax_error("prib r0, r1\n").1, SyntaxError::UnknownInstruction);
		assert_eq!(
			syntax_error("addb r0 r1 r2\n").1,
			SyntaxError::MissingComma("addb".into())
		);
	}

	#[test]
	fn unary_operand_kinds() {
		assert!(parse("prib #-9\nprib r2\nincb r1\ndecb r3\n").is_ok());
		assert_eq!(
			syntax_error("jne r0").1,
			SyntaxError::ExpectedLabel("jne".into())
		);
		assert_eq!(
			syntax_error("prib @x").1,
			SyntaxError::ExpectedRegisterOrNumber("prib".into())
		);
		assert_eq!(
			syntax_error("incb #1").1,
			SyntaxError::ExpectedRegister("incb".into())
		);
	}

	#[test]
	fn binary_operand_kinds() {
		assert!(parse("movb #1, r0\ncmpb r1, r0\nxorb #-1, r3\n").is_ok());
		assert_eq!(
			syntax_error("movb r0, #1").1,
			SyntaxError::NumberDestination("movb".into())
		);
		assert_eq!(
			syntax_error("\n\naddb ,, r0"),
			(3, SyntaxError::InvalidOperands("addb".into()))
		);
		assert_eq!(
			syntax_error("subb r0, @a:").1,
			SyntaxError::InvalidOperands("subb".into())
		);
	}
}
