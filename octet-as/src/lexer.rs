//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{
	collections::{HashMap, HashSet},
	iter::Peekable,
	str::Chars,
};

use lazy_static::lazy_static;
use octet_isa::{AluOp, BitwiseOp, JumpCondition, Register, UnaryOp, HALT_MNEMONIC};
use tracing::trace;

use crate::{AssemblyError, LexError, SyntaxError};

lazy_static! {
	static ref MNEMONICS: HashSet<&'static str> = {
		let mut set = HashSet::new();
		set.extend(AluOp::ALL.iter().map(|op| op.mnemonic()));
		set.extend(BitwiseOp::ALL.iter().map(|op| op.mnemonic()));
		set.extend(UnaryOp::ALL.iter().map(|op| op.mnemonic()));
		set.extend(JumpCondition::ALL.iter().map(|cond| cond.mnemonic()));
		set.insert(HALT_MNEMONIC);
		set
	};
	static ref REGISTERS: HashMap<&'static str, Register> =
		Register::ALL.into_iter().map(|reg| (reg.name(), reg)).collect();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
	Mnemonic(String),
	Register(Register),
	Number(i64),
	/// Label name without the `@` and the trailing `:`.
	Label(String),
	Comma,
	Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	/// 1-based source line.
	pub line: usize,
}

pub fn is_mnemonic(lexeme: &str) -> bool {
	MNEMONICS.contains(lexeme)
}

pub fn lex(source: &str) -> Result<Vec<Token>, AssemblyError> {
	let tokens = Lexer::new(source).run()?;
	trace!(count = tokens.len(), "lexed source");
	Ok(tokens)
}

struct Lexer<'a> {
	chars: Peekable<Chars<'a>>,
	line: usize,
	tokens: Vec<Token>,
}

fn is_delimiter(c: char) -> bool {
	matches!(c, ' ' | '\t' | '\r' | '\n' | ',' | ';' | '#' | '@')
}

impl<'a> Lexer<'a> {
	fn new(source: &'a str) -> Self {
		Self {
			chars: source.chars().peekable(),
			line: 1,
			tokens: Vec::new(),
		}
	}

	fn run(mut self) -> Result<Vec<Token>, AssemblyError> {
		while let Some(c) = self.chars.next() {
			match c {
				' ' | '\t' | '\r' => {},
				'\n' => {
					self.push(TokenKind::Newline);
					self.line += 1;
				},
				';' => self.skip_comment(),
				',' => self.push(TokenKind::Comma),
				'#' => {
					let value = self.number()?;
					self.push(TokenKind::Number(value));
				},
				'@' => {
					let name = self.label()?;
					self.push(TokenKind::Label(name));
				},
				c => {
					let kind = self.word(c)?;
					self.push(kind);
				},
			}
		}

		Ok(self.tokens)
	}

	fn push(&mut self, kind: TokenKind) {
		self.tokens.push(Token {
			kind,
			line: self.line,
		});
	}

	fn lex_error(&self, kind: LexError) -> AssemblyError {
		AssemblyError::Lex {
			line: self.line,
			kind,
		}
	}

	fn syntax_error(&self, kind: SyntaxError) -> AssemblyError {
		AssemblyError::Syntax {
			line: self.line,
			kind,
		}
	}

	/// Leaves the terminating newline in place so it still produces a token.
	fn skip_comment(&mut self) {
		while self.chars.next_if(|c| *c != '\n').is_some() {}
	}

	fn number(&mut self) -> Result<i64, AssemblyError> {
		let mut literal = String::new();
		if self.chars.next_if_eq(&'-').is_some() {
			literal.push('-');
		}
		while let Some(digit) = self.chars.next_if(char::is_ascii_digit) {
			literal.push(digit);
		}

		match literal.as_str() {
			"" => Err(self.syntax_error(SyntaxError::MissingNumber)),
			"-" => Err(self.syntax_error(SyntaxError::MissingDigit)),
			_ => match literal.parse::<i64>() {
				Ok(value) => Ok(value),
				Err(_) => Err(self.syntax_error(SyntaxError::NumberOutOfRange(literal))),
			},
		}
	}

	fn label(&mut self) -> Result<String, AssemblyError> {
		let mut name = String::new();
		while let Some(c) = self.chars.next_if(|c| !matches!(c, '\n' | '\r')) {
			if c == ' ' || c == '\t' {
				return Err(self.lex_error(LexError::LabelWhitespace));
			}
			name.push(c);
		}

		// a label right after a mnemonic is a jump operand, where the colon is optional
		let is_operand = matches!(
			self.tokens.last(),
			Some(Token {
				kind: TokenKind::Mnemonic(_),
				..
			})
		);

		let name = match name.strip_suffix(':') {
			Some(stripped) => stripped.to_owned(),
			None if is_operand => name,
			None => return Err(self.lex_error(LexError::LabelMissingColon(name))),
		};

		if name.is_empty() {
			return Err(self.lex_error(LexError::EmptyLabel));
		}

		Ok(name)
	}

	fn word(&mut self, first: char) -> Result<TokenKind, AssemblyError> {
		let mut lexeme = String::from(first);
		while let Some(c) = self.chars.next_if(|c| !is_delimiter(*c)) {
			lexeme.push(c);
		}

		if is_mnemonic(&lexeme) {
			Ok(TokenKind::Mnemonic(lexeme))
		} else if let Some(reg) = REGISTERS.get(lexeme.as_str()) {
			Ok(TokenKind::Register(*reg))
		} else {
			Err(self.syntax_error(SyntaxError::InvalidLexeme(lexeme)))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(source: &str) -> Vec<TokenKind> {
		lex(source)
			.unwrap()
			.into_iter()
			.map(|token| token.kind)
			.collect()
	}

	#[test]
	fn lexes_binary_instruction() {
		assert_eq!(
			kinds("movb #-12, r3\n"),
			vec![
				TokenKind::Mnemonic("movb".into()),
				TokenKind::Number(-12),
				TokenKind::Comma,
				TokenKind::Register(Register::R3),
				TokenKind::Newline,
			]
		);
	}

	#[test]
	fn prefers_longest_mnemonic() {
		assert_eq!(
			kinds("jge @a\njg @a"),
			vec![
				TokenKind::Mnemonic("jge".into()),
				TokenKind::Label("a".into()),
				TokenKind::Newline,
				TokenKind::Mnemonic("jg".into()),
				TokenKind::Label("a".into()),
			]
		);
	}

	#[test]
	fn comments_end_at_newline() {
		assert_eq!(
			kinds("halt ; stop here, r0\n\tprib r1"),
			vec![
				TokenKind::Mnemonic("halt".into()),
				TokenKind::Newline,
				TokenKind::Mnemonic("prib".into()),
				TokenKind::Register(Register::R1),
			]
		);
	}

	#[test]
	fn label_definitions_need_colon() {
		assert_eq!(
			kinds("@loop_start:\r\n"),
			vec![TokenKind::Label("loop_start".into()), TokenKind::Newline]
		);
		assert!(matches!(
			lex("@loop\n"),
			Err(AssemblyError::Lex {
				line: 1,
				kind: LexError::LabelMissingColon(_)
			})
		));
	}

	#[test]
	fn label_operands_may_keep_colon() {
		assert_eq!(
			kinds("jmp @end:"),
			vec![
				TokenKind::Mnemonic("jmp".into()),
				TokenKind::Label("end".into()),
			]
		);
	}

	#[test]
	fn rejects_whitespace_in_label() {
		assert!(matches!(
			lex("halt\n@my label:\n"),
			Err(AssemblyError::Lex {
				line: 2,
				kind: LexError::LabelWhitespace
			})
		));
		assert!(matches!(
			lex("@:"),
			Err(AssemblyError::Lex {
				kind: LexError::EmptyLabel,
				..
			})
		));
	}

	#[test]
	fn rejects_bad_numbers() {
		assert!(matches!(
			lex("prib #"),
			Err(AssemblyError::Syntax {
				kind: SyntaxError::MissingNumber,
				..
			})
		));
		assert!(matches!(
			lex("prib #x"),
			Err(AssemblyError::Syntax {
				kind: SyntaxError::MissingNumber,
				..
			})
		));
		assert!(matches!(
			lex("prib #-"),
			Err(AssemblyError::Syntax {
				kind: SyntaxError::MissingDigit,
				..
			})
		));
		assert!(matches!(
			lex("prib #99999999999999999999"),
			Err(AssemblyError::Syntax {
				kind: SyntaxError::NumberOutOfRange(_),
				..
			})
		));
	}

	#[test]
	fn rejects_unknown_lexemes() {
		match lex("movb #1, r0\nmovx r0, r1") {
			Err(AssemblyError::Syntax {
				line,
				kind: SyntaxError::InvalidLexeme(lexeme),
			}) => {
				assert_eq!(line, 2);
				assert_eq!(lexeme, "movx");
			},
			other => panic!("unexpected result: {:?}", other),
		}
		assert!(lex("r4").is_err());
		assert!(lex("jgx @a").is_err());
	}
}
