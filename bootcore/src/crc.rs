// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Reflected CRC-32 (poly `0xEDB88320`) used for command integrity.
//!
//! Same algorithm (and the same `crc` crate catalog entry,
//! `CRC_32_ISO_HDLC`) used elsewhere in this codebase's flash CRC
//! routines.

use crc::{Crc, CRC_32_ISO_HDLC};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// CRC-32 over `data`, init `0xFFFFFFFF`, final XOR `0xFFFFFFFF`.
pub fn crc32(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// CRC-32 over a serialized frame, treating the 4 bytes at
/// `crc_field_offset..crc_field_offset + 4` as zero.
///
/// This is how the transmitted `crc32` header field is computed and
/// verified: the field's own slot is zero-sized for the purpose of
/// the hash.
pub fn crc32_skip_field(data: &[u8], crc_field_offset: usize) -> u32 {
    let mut digest = CRC32.digest();
    let end = crc_field_offset + 4;
    debug_assert!(end <= data.len());

    digest.update(&data[..crc_field_offset]);
    digest.update(&[0u8; 4]);
    digest.update(&data[end..]);
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_vector() {
        // "123456789" is the standard CRC-32/ISO-HDLC check string.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn empty_input_yields_zero() {
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn skip_field_ignores_the_crc_slot() {
        let mut frame = [0u8; 16];
        frame[5..9].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        let with_garbage = crc32_skip_field(&frame, 5);

        frame[5..9].copy_from_slice(&[0, 0, 0, 0]);
        let with_zero = crc32_skip_field(&frame, 5);

        assert_eq!(with_garbage, with_zero);
    }

    #[test]
    fn skip_field_is_sensitive_to_other_bytes() {
        let mut frame = [0u8; 16];
        let base = crc32_skip_field(&frame, 5);

        frame[10] ^= 0x01;
        let mutated = crc32_skip_field(&frame, 5);

        assert_ne!(base, mutated);
    }
}
