//
// Copyright (C) 2023 Ariel Abreu
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

pub const SIGN_POSITIVE: u8 = 0xfe;
pub const SIGN_NEGATIVE: u8 = 0xff;

/// Sign byte plus a 32-bit magnitude.
pub const IMMEDIATE_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid immediate sign byte {0:#04x}")]
pub struct InvalidSign(pub u8);

/// Encodes `value` as a sign byte followed by the big-endian magnitude.
///
/// Only the low 32 bits of the magnitude are kept, so anything outside
/// `-(2^32 - 1)..=2^32 - 1` is silently truncated.
pub fn encode_immediate(value: i64) -> [u8; IMMEDIATE_LEN] {
	let mut bytes = [0u8; IMMEDIATE_LEN];
	bytes[0] = if value < 0 {
		SIGN_NEGATIVE
	} else {
		SIGN_POSITIVE
	};
	BigEndian::write_u32(&mut bytes[1..], value.unsigned_abs() as u32);
	bytes
}

/// Returns `true` for a negative sign byte.
pub fn decode_sign(sign: u8) -> Result<bool, InvalidSign> {
	match sign {
		SIGN_POSITIVE => Ok(false),
		SIGN_NEGATIVE => Ok(true),
		other => Err(InvalidSign(other)),
	}
}

/// Applies a decoded sign to the 4-byte big-endian magnitude.
pub fn decode_magnitude(negative: bool, magnitude: &[u8]) -> i64 {
	let magnitude = BigEndian::read_u32(magnitude) as i64;
	if negative {
		-magnitude
	} else {
		magnitude
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encodes_sign_and_magnitude() {
		assert_eq!(encode_immediate(5), [0xfe, 0x00, 0x00, 0x00, 0x05]);
		assert_eq!(encode_immediate(0), [0xfe, 0x00, 0x00, 0x00, 0x00]);
		assert_eq!(encode_immediate(-1), [0xff, 0x00, 0x00, 0x00, 0x01]);
		assert_eq!(
			encode_immediate(i32::MIN as i64),
			[0xff, 0x80, 0x00, 0x00, 0x00]
		);
		assert_eq!(
			encode_immediate(i32::MAX as i64),
			[0xfe, 0x7f, 0xff, 0xff, 0xff]
		);
	}

	#[test]
	fn decodes_full_i32_range() {
		for value in [i32::MIN, -1, 0, 1, 0x1234_5678, i32::MAX] {
			let bytes = encode_immediate(value as i64);
			let negative = decode_sign(bytes[0]).unwrap();
			assert_eq!(decode_magnitude(negative, &bytes[1..]), value as i64);
		}
	}

	#[test]
	fn rejects_unknown_sign() {
		assert_eq!(decode_sign(0x00), Err(InvalidSign(0x00)));
		assert_eq!(decode_sign(0xfd), Err(InvalidSign(0xfd)));
	}
}
