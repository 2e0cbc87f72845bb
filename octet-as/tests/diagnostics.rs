//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use octet_as::{assemble, AssemblyError, LexError, SyntaxError};

fn message(source: &str) -> String {
	match assemble(source) {
		Ok(bytes) => panic!("expected {:?} to fail, got {:02x?}", source, bytes),
		Err(e) => e.to_string(),
	}
}

#[test]
fn messages_name_the_line() {
	assert_eq!(
		message("halt\n\nmovb r0, #1\n"),
		"syntax error on line 3: Number cannot be placed in second operand when its mnemonic is 'movb'."
	);
	assert_eq!(
		message("@start\nhalt\n"),
		"lex error on line 1: Label name 'start' must end with a colon."
	);
	assert_eq!(
		message("prib r0\nprob r0\n"),
		"syntax error on line 2: Current lexeme 'prob' is not a valid register or instruction."
	);
	assert_eq!(
		message("jz @nope"),
		"Jump target 'nope' is not a defined label."
	);
}

#[test]
fn first_error_wins() {
	// the lexer fails before the parser sees the bad operand on line 1
	assert!(matches!(
		assemble("movb r0, #1\n@bad label:\n"),
		Err(AssemblyError::Lex {
			line: 2,
			kind: LexError::LabelWhitespace
		})
	));
	assert!(matches!(
		assemble("movb r0, #1\nprib\n"),
		Err(AssemblyError::Syntax {
			line: 1,
			kind: SyntaxError::NumberDestination(_)
		})
	));
}

#[test]
fn crlf_sources_assemble() {
	let unix = assemble("@a:\nincb r1\njnz @a\n").unwrap();
	let dos = assemble("@a:\r\nincb r1\r\njnz @a\r\n").unwrap();
	assert_eq!(unix, dos);
}
