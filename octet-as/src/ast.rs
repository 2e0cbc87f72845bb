//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::fmt::Display;

use octet_isa::Register;

/// Syntax tree produced by the parser.
///
/// A `Root` only holds `Label` and `InstructionLine` nodes, in source order.
/// An `InstructionLine` always starts with a `Mnemonic`, followed by its
/// operands (commas are dropped). `Label` doubles as a jump operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Root(Vec<Node>),
	Label(String),
	InstructionLine(Vec<Node>),
	Mnemonic(String),
	Register(Register),
	IntegerValue(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
	Root,
	Label,
	InstructionLine,
	Mnemonic,
	Register,
	IntegerValue,
}

impl Node {
	pub fn kind(&self) -> NodeKind {
		match self {
			Self::Root(_) => NodeKind::Root,
			Self::Label(_) => NodeKind::Label,
			Self::InstructionLine(_) => NodeKind::InstructionLine,
			Self::Mnemonic(_) => NodeKind::Mnemonic,
			Self::Register(_) => NodeKind::Register,
			Self::IntegerValue(_) => NodeKind::IntegerValue,
		}
	}

	pub fn children(&self) -> &[Node] {
		match self {
			Self::Root(children) | Self::InstructionLine(children) => children,
			_ => &[],
		}
	}
}

impl Display for NodeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Root => "root",
			Self::Label => "label",
			Self::InstructionLine => "instruction line",
			Self::Mnemonic => "mnemonic",
			Self::Register => "register",
			Self::IntegerValue => "integer value",
		};
		write!(f, "{}", name)
	}
}

/// Renders the tree back as assembler source.
impl Display for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Root(children) => {
				for child in children {
					match child {
						Self::Label(name) => writeln!(f, "@{}:", name)?,
						other => writeln!(f, "{}", other)?,
					}
				}
				Ok(())
			},
			Self::InstructionLine(children) => {
				let mut children = children.iter();
				if let Some(mnemonic) = children.next() {
					write!(f, "{}", mnemonic)?;
				}
				for (i, operand) in children.enumerate() {
					let separator = if i == 0 { " " } else { ", " };
					write!(f, "{}{}", separator, operand)?;
				}
				Ok(())
			},
			Self::Label(name) => write!(f, "@{}", name),
			Self::Mnemonic(mnemonic) => write!(f, "{}", mnemonic),
			Self::Register(reg) => write!(f, "{}", reg),
			Self::IntegerValue(value) => write!(f, "#{}", value),
		}
	}
}
