//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::io::{self, Write};

use byteorder::{BigEndian, ByteOrder};
use octet_isa::{
	decode_magnitude, decode_sign, AluOp, BitwiseOp, BitwiseSubtype, Instruction, JumpCondition,
	Opcode, Operand, Register, BITWISE_PREFIX, JUMP_PREFIX,
};
use tracing::{debug, trace};

use crate::{
	util::{BytecodeOffset, Flags, RegisterFile},
	RuntimeError,
};

/// Reads one instruction, leaving `cursor` on its last byte.
struct Decoder<'a> {
	bytecode: &'a [u8],
	cursor: BytecodeOffset,
}

impl<'a> Decoder<'a> {
	fn new(bytecode: &'a [u8], cursor: BytecodeOffset) -> Self {
		Self { bytecode, cursor }
	}

	fn current(&self) -> Result<u8, RuntimeError> {
		self.bytecode
			.get(self.cursor.get())
			.copied()
			.ok_or(RuntimeError::InvalidNextBytecode {
				offset: (self.cursor - 1).get(),
			})
	}

	fn next(&mut self) -> Result<u8, RuntimeError> {
		self.cursor += 1;
		self.current()
	}

	fn next_word(&mut self) -> Result<[u8; 4], RuntimeError> {
		let mut word = [0u8; 4];
		for byte in &mut word {
			*byte = self.next()?;
		}
		Ok(word)
	}

	fn immediate(&mut self) -> Result<i64, RuntimeError> {
		let sign = self.next()?;
		let negative = decode_sign(sign).map_err(|_| RuntimeError::InvalidNumberSign {
			offset: self.cursor.get(),
		})?;
		let magnitude = self.next_word()?;
		Ok(decode_magnitude(negative, &magnitude))
	}

	fn subtype_error(&self, prefix: u8, subtype: u8) -> RuntimeError {
		RuntimeError::InvalidSubtype {
			prefix,
			subtype,
			offset: self.cursor.get(),
		}
	}

	fn decode(&mut self) -> Result<Instruction, RuntimeError> {
		let offset = self.cursor.get();
		let opcode = Opcode::try_from(self.current()?)
			.map_err(|opcode| RuntimeError::InvalidOpcode { opcode, offset })?;

		let instruction = match opcode {
			Opcode::AluRegisters { op, src, dst } => Instruction::Alu {
				op,
				src: Operand::Register(src),
				dst,
			},
			Opcode::AluImmediate { op, dst } => Instruction::Alu {
				op,
				src: Operand::Immediate(self.immediate()?),
				dst,
			},
			Opcode::Increment(reg) => Instruction::Increment(reg),
			Opcode::Decrement(reg) => Instruction::Decrement(reg),
			Opcode::PrintRegister(reg) => Instruction::Print(Operand::Register(reg)),
			Opcode::PrintImmediate => Instruction::Print(Operand::Immediate(self.immediate()?)),
			Opcode::JumpPrefix => {
				let subtype = self.next()?;
				let condition = JumpCondition::try_from(subtype)
					.map_err(|_| self.subtype_error(JUMP_PREFIX, subtype))?;
				let target = BigEndian::read_u32(&self.next_word()?);
				Instruction::Jump { condition, target }
			},
			Opcode::BitwisePrefix => {
				let subtype = self.next()?;
				match BitwiseSubtype::try_from(subtype) {
					Ok(BitwiseSubtype::Registers { op, src, dst }) => Instruction::Bitwise {
						op,
						src: Operand::Register(src),
						dst,
					},
					Ok(BitwiseSubtype::Immediate { op, dst }) => Instruction::Bitwise {
						op,
						src: Operand::Immediate(self.immediate()?),
						dst,
					},
					Err(subtype) => return Err(self.subtype_error(BITWISE_PREFIX, subtype)),
				}
			},
			Opcode::Halt => Instruction::Halt,
		};

		Ok(instruction)
	}
}

/// Decodes the instruction starting at `offset`, returning it along with its
/// encoded length.
pub fn decode_at(bytecode: &[u8], offset: usize) -> Result<(Instruction, usize), RuntimeError> {
	let mut decoder = Decoder::new(bytecode, offset.into());
	let instruction = decoder.decode()?;
	Ok((instruction, decoder.cursor.get() - offset + 1))
}

#[derive(Debug)]
pub struct VM<'a> {
	print_instructions: bool,

	bytecode: &'a [u8],
	register_file: RegisterFile,
	flags: Flags,
	instruction_pointer: BytecodeOffset,
	halted: bool,
}

impl<'a> VM<'a> {
	pub fn new(bytecode: &'a [u8]) -> Self {
		Self {
			print_instructions: false,

			bytecode,
			register_file: RegisterFile::new(),
			flags: Flags::empty(),
			instruction_pointer: BytecodeOffset::new(0),
			halted: false,
		}
	}

	/// Echo every executed instruction to stderr.
	pub fn set_print_instructions(&mut self, print_instructions: bool) {
		self.print_instructions = print_instructions;
	}

	pub fn register(&self, register: Register) -> i32 {
		self.register_file[register]
	}

	pub fn registers(&self) -> &RegisterFile {
		&self.register_file
	}

	pub fn flags(&self) -> Flags {
		self.flags
	}

	pub fn instruction_pointer(&self) -> usize {
		self.instruction_pointer.get()
	}

	pub fn is_halted(&self) -> bool {
		self.halted
	}

	/// `false` once `halt` ran or the instruction pointer left the image.
	pub fn is_running(&self) -> bool {
		!self.halted && self.instruction_pointer.get() < self.bytecode.len()
	}

	fn operand_value(&self, operand: Operand) -> i32 {
		match operand {
			Operand::Register(reg) => self.register_file[reg],
			// wraps into the 32-bit register range
			Operand::Immediate(value) => value as i32,
		}
	}

	/// Decodes and executes the instruction under the instruction pointer.
	pub fn execute_one<W: Write>(&mut self, output: &mut W) -> Result<(), RuntimeError> {
		let mut decoder = Decoder::new(self.bytecode, self.instruction_pointer);
		let instruction = decoder.decode()?;

		if self.print_instructions {
			eprintln!("{:#010x}: {}", self.instruction_pointer.get(), instruction);
		}
		self.instruction_pointer = decoder.cursor;

		macro_rules! do_jump {
			($target:expr) => {
				// the increment below lands exactly on the target
				self.instruction_pointer = BytecodeOffset::from($target as usize) - 1;
			};
		}

		macro_rules! update_register {
			($dst:expr, |$current:ident| $value:expr) => {
				let $current = self.register_file[$dst];
				self.register_file[$dst] = $value;
			};
		}

		match instruction {
			Instruction::Alu { op, src, dst } => {
				let value = self.operand_value(src);
				match op {
					AluOp::Move => self.register_file[dst] = value,
					AluOp::Add => {
						update_register!(dst, |current| current.wrapping_add(value));
					},
					AluOp::Subtract => {
						update_register!(dst, |current| current.wrapping_sub(value));
					},
					AluOp::Multiply => {
						update_register!(dst, |current| current.wrapping_mul(value));
					},
					AluOp::Divide => {
						if value == 0 {
							return Err(RuntimeError::DivisionByZero);
						}
						update_register!(dst, |current| current.wrapping_div(value));
					},
					AluOp::Compare => {
						let current = self.register_file[dst];
						self.flags.set_comparison(current.cmp(&value));
					},
				}
			},
			Instruction::Bitwise { op, src, dst } => {
				let value = self.operand_value(src);
				match op {
					BitwiseOp::Or => {
						update_register!(dst, |current| current | value);
					},
					BitwiseOp::Xor => {
						update_register!(dst, |current| current ^ value);
					},
				}
			},
			Instruction::Increment(reg) => {
				update_register!(reg, |current| current.wrapping_add(1));
			},
			Instruction::Decrement(reg) => {
				update_register!(reg, |current| current.wrapping_sub(1));
			},
			Instruction::Print(Operand::Register(reg)) => {
				writeln!(output, "{}", self.register_file[reg])?;
			},
			Instruction::Print(Operand::Immediate(value)) => {
				writeln!(output, "{}", value)?;
			},
			Instruction::Jump { condition, target } => {
				if self.flags.test_condition(condition) {
					trace!(%condition, target, "taking jump");
					do_jump!(target);
				}
			},
			Instruction::Halt => {
				self.halted = true;
				return Ok(());
			},
		}

		self.instruction_pointer += 1;
		Ok(())
	}

	/// Runs until `halt`, the end of the image, or a fault.
	pub fn run<W: Write>(&mut self, output: &mut W) -> Result<(), RuntimeError> {
		let mut steps = 0u64;
		while self.is_running() {
			self.execute_one(output)?;
			steps += 1;
		}
		debug!(
			steps,
			halted = self.halted,
			instruction_pointer = self.instruction_pointer.get(),
			"stopped"
		);
		Ok(())
	}
}

/// Runs `bytecode` from offset 0, printing to stdout.
pub fn execute(bytecode: &[u8]) -> Result<(), RuntimeError> {
	let stdout = io::stdout();
	let mut output = stdout.lock();
	VM::new(bytecode).run(&mut output)
}
