//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use std::{fs, io, path::PathBuf, process::ExitCode};

use clap::Parser as ClapParser;
use tracing::{error, Level};

use octet_as::{assemble, parser::parse};

#[derive(ClapParser)]
#[command(author, version, about, long_about = None)]
struct Args {
	source: PathBuf,

	/// Write the raw bytecode here instead of printing it as hex.
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Print the syntax tree before assembling.
	#[arg(long)]
	dump_ast: bool,

	#[arg(short, long, default_value_t = Level::WARN)]
	log_level: Level,
}

fn hex_dump(bytes: &[u8]) -> String {
	bytes
		.chunks(16)
		.enumerate()
		.map(|(row, chunk)| {
			let columns: Vec<String> = chunk.iter().map(|byte| format!("{:02x}", byte)).collect();
			format!("{:08x}: {}\n", row * 16, columns.join(" "))
		})
		.collect()
}

fn main() -> ExitCode {
	let cli = Args::parse();

	tracing_subscriber::fmt()
		.with_max_level(cli.log_level)
		.with_writer(io::stderr)
		.init();

	let input = match fs::read_to_string(&cli.source) {
		Ok(x) => x,
		Err(e) => {
			error!("Failed to read \"{}\": {}", cli.source.display(), e);
			return ExitCode::FAILURE;
		},
	};

	if cli.dump_ast {
		match parse(&input) {
			Ok(ast) => println!("{:#?}", ast),
			Err(e) => {
				error!("{}: {}", cli.source.display(), e);
				return ExitCode::FAILURE;
			},
		}
	}

	let bytecode = match assemble(&input) {
		Ok(x) => x,
		Err(e) => {
			error!("{}: {}", cli.source.display(), e);
			return ExitCode::FAILURE;
		},
	};

	match cli.output {
		Some(output_path) => {
			if let Err(e) = fs::write(&output_path, &bytecode) {
				error!("Failed to write \"{}\": {}", output_path.display(), e);
				return ExitCode::FAILURE;
			}
		},
		None => print!("{}", hex_dump(&bytecode)),
	}

	ExitCode::SUCCESS
}
