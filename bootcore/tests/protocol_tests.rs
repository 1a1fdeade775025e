// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Black-box tests for the frame codec's public API.

use bootcore::protocol::{decode, Command, CommandId, DecodeError, Header};

fn header_only(cmd_id: u8) -> [u8; 9] {
    let mut buf = [0u8; 9];
    Header { payload_size: 9, cmd_id, crc32: 0 }.encode(&mut buf);
    buf
}

#[test]
fn version_has_no_body() {
    let buf = header_only(CommandId::Version as u8);
    assert!(matches!(decode(&buf, 1512), Ok(Command::Version)));
}

#[test]
fn enter_cmd_mode_carries_the_key() {
    let mut buf = [0u8; 13];
    Header { payload_size: 13, cmd_id: CommandId::EnterCmdMode as u8, crc32: 0 }.encode(&mut buf);
    buf[9..13].copy_from_slice(&0x09B2_1FFCu32.to_le_bytes());

    match decode(&buf, 1512).unwrap() {
        Command::EnterCmdMode { key } => assert_eq!(key, 0x09B2_1FFC),
        other => panic!("wrong variant: {:?}", other),
    }
}

#[test]
fn jump_to_app_carries_the_key() {
    let mut buf = [0u8; 13];
    Header { payload_size: 13, cmd_id: CommandId::JumpToApp as u8, crc32: 0 }.encode(&mut buf);
    buf[9..13].copy_from_slice(&0x4032_AFE5u32.to_le_bytes());

    match decode(&buf, 1512).unwrap() {
        Command::JumpToApp { key } => assert_eq!(key, 0x4032_AFE5),
        other => panic!("wrong variant: {:?}", other),
    }
}

#[test]
fn flash_erase_carries_page_address_and_count() {
    let mut buf = [0u8; 17];
    Header { payload_size: 17, cmd_id: CommandId::FlashErase as u8, crc32: 0 }.encode(&mut buf);
    buf[9..13].copy_from_slice(&0x0800_4000u32.to_le_bytes());
    buf[13..17].copy_from_slice(&4u32.to_le_bytes());

    match decode(&buf, 1512).unwrap() {
        Command::FlashErase { page_address, page_count } => {
            assert_eq!(page_address, 0x0800_4000);
            assert_eq!(page_count, 4);
        }
        other => panic!("wrong variant: {:?}", other),
    }
}

#[test]
fn a_truncated_buffer_is_a_bad_length_not_a_panic() {
    let buf = [0u8; 4];
    assert_eq!(decode(&buf, 1512), Err(DecodeError::BadLength));
}

#[test]
fn payload_size_over_the_caller_ceiling_is_rejected() {
    let mut buf = [0u8; 13];
    Header { payload_size: 13, cmd_id: CommandId::GotoAddr as u8, crc32: 0 }.encode(&mut buf);
    assert_eq!(decode(&buf, 9), Err(DecodeError::BadLength));
}
