// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Black-box tests for the reflected CRC-32 engine: known test
//! vectors, and the round-trip property that recomputing a frame's CRC
//! with the header's own `crc32` field skipped reproduces the stored
//! value while any other single-bit mutation changes it.

use bootcore::crc::{crc32, crc32_skip_field};
use bootcore::protocol::Header;

// --- known vectors ---

#[test]
fn check_string_matches_iso_hdlc_catalog_value() {
    assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
}

// --- frame round-trip ---

#[test]
fn round_trips_through_a_full_frame() {
    let mut frame = [0u8; 13];
    frame[0..4].copy_from_slice(&13u32.to_le_bytes());
    frame[4] = 0x01;
    frame[9..13].copy_from_slice(&0x0800_2000u32.to_le_bytes());

    let crc = crc32_skip_field(&frame, Header::CRC_OFFSET);
    frame[Header::CRC_OFFSET..Header::CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());

    assert_eq!(crc32_skip_field(&frame, Header::CRC_OFFSET), crc);
}

#[test]
fn a_single_bit_flip_outside_the_crc_field_changes_the_checksum() {
    let mut frame = [0u8; 13];
    frame[0..4].copy_from_slice(&13u32.to_le_bytes());
    frame[4] = 0x01;
    frame[9..13].copy_from_slice(&0x0800_2000u32.to_le_bytes());
    let crc = crc32_skip_field(&frame, Header::CRC_OFFSET);
    frame[Header::CRC_OFFSET..Header::CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());

    frame[9] ^= 0x01;

    assert_ne!(crc32_skip_field(&frame, Header::CRC_OFFSET), crc);
}

#[test]
fn a_bit_flip_inside_the_crc_field_itself_is_not_observed() {
    let mut frame = [0u8; 13];
    frame[0..4].copy_from_slice(&13u32.to_le_bytes());
    frame[4] = 0x01;
    let crc = crc32_skip_field(&frame, Header::CRC_OFFSET);

    frame[Header::CRC_OFFSET] ^= 0xFF;

    assert_eq!(crc32_skip_field(&frame, Header::CRC_OFFSET), crc);
}
