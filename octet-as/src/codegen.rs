//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::mem;

use octet_isa::{
	AluOp, BitwiseOp, Instruction, JumpCondition, Operand, Register, UnaryOp, HALT_MNEMONIC,
	JUMP_LEN,
};
use positioned_io::WriteAt;
use tracing::{debug, trace};

use crate::{ast::Node, label::JumpLabels, AssemblyError, AstError};

/// A jump emitted before its target was known.
#[derive(Debug, Clone)]
struct Patch {
	offset: u32,
	condition: JumpCondition,
	label: String,
}

#[derive(Debug, Default)]
pub struct CodeGenerator {
	out: Vec<u8>,
	labels: JumpLabels,
	patches: Vec<Patch>,
}

pub fn generate(ast: &Node) -> Result<Vec<u8>, AssemblyError> {
	CodeGenerator::new().generate(ast)
}

fn operand(node: &Node) -> Option<Operand> {
	match node {
		Node::Register(reg) => Some(Operand::Register(*reg)),
		Node::IntegerValue(value) => Some(Operand::Immediate(*value)),
		_ => None,
	}
}

fn binary_operands(operands: &[Node]) -> Option<(Operand, Register)> {
	match operands {
		[src, Node::Register(dst)] => Some((operand(src)?, *dst)),
		_ => None,
	}
}

impl CodeGenerator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn generate(mut self, ast: &Node) -> Result<Vec<u8>, AssemblyError> {
		let Node::Root(children) = ast else {
			return Err(AstError::NotRoot(ast.kind()).into());
		};

		for child in children {
			match child {
				Node::Label(name) => {
					let offset = self.offset();
					trace!(%name, offset, "label");
					self.labels.add(name.as_str(), offset);
				},
				Node::InstructionLine(line) => self.instruction_line(line)?,
				other => return Err(AstError::UnexpectedRootChild(other.kind()).into()),
			}
		}

		debug!(
			bytes = self.out.len(),
			labels = self.labels.all().len(),
			patches = self.patches.len(),
			"emitted instructions"
		);

		self.back_patch()?;
		Ok(self.out)
	}

	fn offset(&self) -> u32 {
		self.out.len() as u32
	}

	fn instruction_line(&mut self, line: &[Node]) -> Result<(), AssemblyError> {
		let Some((Node::Mnemonic(mnemonic), operands)) = line.split_first() else {
			return Err(AstError::MissingMnemonic.into());
		};
		let malformed = || AstError::MalformedInstruction(mnemonic.clone());

		if let Some(condition) = JumpCondition::from_mnemonic(mnemonic) {
			let [Node::Label(label)] = operands else {
				return Err(AstError::ExpectedJumpLabel(mnemonic.clone()).into());
			};
			self.placeholder_jump(condition, label);
			return Ok(());
		}

		let instruction = if let Some(op) = AluOp::from_mnemonic(mnemonic) {
			let (src, dst) = binary_operands(operands).ok_or_else(malformed)?;
			Instruction::Alu { op, src, dst }
		} else if let Some(op) = BitwiseOp::from_mnemonic(mnemonic) {
			let (src, dst) = binary_operands(operands).ok_or_else(malformed)?;
			Instruction::Bitwise { op, src, dst }
		} else if let Some(op) = UnaryOp::from_mnemonic(mnemonic) {
			let [node] = operands else {
				return Err(malformed().into());
			};
			match (op, operand(node).ok_or_else(malformed)?) {
				(UnaryOp::Print, operand) => Instruction::Print(operand),
				(UnaryOp::Increment, Operand::Register(reg)) => Instruction::Increment(reg),
				(UnaryOp::Decrement, Operand::Register(reg)) => Instruction::Decrement(reg),
				_ => return Err(malformed().into()),
			}
		} else if mnemonic == HALT_MNEMONIC && operands.is_empty() {
			Instruction::Halt
		} else {
			return Err(malformed().into());
		};

		instruction.encode(&mut self.out);
		Ok(())
	}

	fn placeholder_jump(&mut self, condition: JumpCondition, label: &str) {
		self.patches.push(Patch {
			offset: self.offset(),
			condition,
			label: label.to_owned(),
		});
		self.out.extend_from_slice(&[0u8; JUMP_LEN]);
	}

	fn back_patch(&mut self) -> Result<(), AssemblyError> {
		for patch in mem::take(&mut self.patches) {
			let target = self
				.labels
				.fetch(&patch.label)
				.ok_or_else(|| AssemblyError::UndefinedLabel(patch.label.clone()))?;
			trace!(label = %patch.label, offset = patch.offset, target, "patching jump");

			let mut bytes = Vec::with_capacity(JUMP_LEN);
			Instruction::Jump {
				condition: patch.condition,
				target,
			}
			.encode(&mut bytes);
			self.out.write_all_at(patch.offset as u64, &bytes)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::parse;

	fn generated(source: &str) -> Vec<u8> {
		generate(&parse(source).unwrap()).unwrap()
	}

	#[test]
	fn emits_each_form() {
		assert_eq!(
			generated("movb #5, r0\naddb #3, r0\nprib r0\nhalt\n"),
			[
				0x50, 0xfe, 0x00, 0x00, 0x00, 0x05, //
				0x54, 0xfe, 0x00, 0x00, 0x00, 0x03, //
				0xb0, //
				0xf4,
			]
		);
		assert_eq!(
			generated("cmpb r2, r1\norb #1, r0\nxorb r3, r3\nincb r2\ndecb r0\n"),
			[0x86, 0xc1, 0x10, 0xfe, 0x00, 0x00, 0x00, 0x01, 0xc1, 0x37, 0x92, 0x94]
		);
	}

	#[test]
	fn backward_and_forward_jumps_resolve() {
		let bytes = generated("jmp @end\n@top:\nprib #-1\njle @top\n@end:\nhalt\n");
		assert_eq!(
			bytes,
			[
				0xc0, 0x10, 0x00, 0x00, 0x00, 0x12, //
				0xbf, 0xff, 0x00, 0x00, 0x00, 0x01, //
				0xc0, 0x18, 0x00, 0x00, 0x00, 0x06, //
				0xf4,
			]
		);
	}

	#[test]
	fn label_offset_counts_prior_bytes() {
		// 6 + 1 + 7 + 1 bytes before the label
		let bytes = generated("movb #1, r0\nincb r0\norb #2, r1\nhalt\n@here:\njz @here\n");
		assert_eq!(bytes.len(), 15 + JUMP_LEN);
		assert_eq!(&bytes[15..], [0xc0, 0x13, 0x00, 0x00, 0x00, 0x0f]);
	}

	#[test]
	fn stacked_labels_share_offset() {
		let bytes = generated("halt\n@a:\n@b:\njmp @a\njmp @b\n");
		assert_eq!(&bytes[1..7], &bytes[7..13]);
	}

	#[test]
	fn undefined_label_fails() {
		let result = generate(&parse("jmp @nowhere\nhalt\n").unwrap());
		assert!(matches!(
			result,
			Err(AssemblyError::UndefinedLabel(name)) if name == "nowhere"
		));
	}

	#[test]
	fn rejects_malformed_trees() {
		assert!(matches!(
			generate(&Node::Register(Register::R0)),
			Err(AssemblyError::Ast(AstError::NotRoot(_)))
		));
		assert!(matches!(
			generate(&Node::Root(vec![Node::IntegerValue(1)])),
			Err(AssemblyError::Ast(AstError::UnexpectedRootChild(_)))
		));
		assert!(matches!(
			generate(&Node::Root(vec![Node::InstructionLine(vec![
				Node::Register(Register::R0)
			])])),
			Err(AssemblyError::Ast(AstError::MissingMnemonic))
		));
		assert!(matches!(
			generate(&Node::Root(vec![Node::InstructionLine(vec![
				Node::Mnemonic("jmp".into()),
				Node::Register(Register::R0),
			])])),
			Err(AssemblyError::Ast(AstError::ExpectedJumpLabel(_)))
		));
		assert!(matches!(
			generate(&Node::Root(vec![Node::InstructionLine(vec![
				Node::Mnemonic("incb".into()),
				Node::IntegerValue(3),
			])])),
			Err(AssemblyError::Ast(AstError::MalformedInstruction(_)))
		));
	}
}
