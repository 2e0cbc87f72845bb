//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{fs, io, ops::Deref, path::PathBuf, process::ExitCode};

use clap::Parser as ClapParser;
use memmap2::Mmap;
use tracing::{debug, error, warn, Level};

use octet_emu::VM;
use octet_isa::Register;

#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
	image: PathBuf,

	/// Treat the image as assembler source and assemble it first.
	#[arg(long)]
	assemble: bool,

	#[arg(long)]
	print_instructions: bool,

	/// Stop after this many instructions.
	#[arg(short = 't', long)]
	tmax: Option<u64>,

	#[arg(short, long, default_value_t = Level::WARN)]
	log_level: Level,
}

enum Image {
	Mapped(Mmap),
	Owned(Vec<u8>),
}

impl Deref for Image {
	type Target = [u8];

	fn deref(&self) -> &Self::Target {
		match self {
			Self::Mapped(map) => &map[..],
			Self::Owned(bytes) => &bytes[..],
		}
	}
}

fn load_image(cli: &Args) -> Result<Image, String> {
	if cli.assemble {
		let source = fs::read_to_string(&cli.image)
			.map_err(|e| format!("Failed to read \"{}\": {}", cli.image.display(), e))?;
		return octet_as::assemble(&source)
			.map(Image::Owned)
			.map_err(|e| format!("{}: {}", cli.image.display(), e));
	}

	let file = fs::File::open(&cli.image)
		.map_err(|e| format!("Failed to open \"{}\": {}", cli.image.display(), e))?;
	let len = file
		.metadata()
		.map_err(|e| format!("Failed to stat \"{}\": {}", cli.image.display(), e))?
		.len();
	if len == 0 {
		return Ok(Image::Owned(Vec::new()));
	}

	// SAFETY: the mapping is read-only and the image is not expected to be
	//         modified by anyone else while the emulator runs.
	let map = unsafe { Mmap::map(&file) }
		.map_err(|e| format!("Failed to map \"{}\": {}", cli.image.display(), e))?;
	Ok(Image::Mapped(map))
}

fn main() -> ExitCode {
	let cli = Args::parse();

	tracing_subscriber::fmt()
		.with_max_level(cli.log_level)
		.with_writer(io::stderr)
		.init();

	let image = match load_image(&cli) {
		Ok(x) => x,
		Err(e) => {
			error!("{}", e);
			return ExitCode::FAILURE;
		},
	};
	debug!(bytes = image.len(), "loaded image");

	let mut vm = VM::new(&image);
	vm.set_print_instructions(cli.print_instructions);

	let stdout = io::stdout();
	let mut output = stdout.lock();

	let mut result = Ok(());
	for _ in match cli.tmax {
		Some(t) => 0_u64..t,
		None => 0_u64..u64::MAX,
	} {
		if !vm.is_running() {
			break;
		}
		result = vm.execute_one(&mut output);
		if result.is_err() {
			break;
		}
	}

	if vm.is_running() && result.is_ok() {
		warn!("Stopped after {} instructions", cli.tmax.unwrap_or(u64::MAX));
	}

	for reg in Register::ALL {
		debug!("{} = {}", reg, vm.register(reg));
	}
	debug!(flags = ?vm.flags(), instruction_pointer = vm.instruction_pointer(), "final state");

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}", e);
			ExitCode::FAILURE
		},
	}
}
