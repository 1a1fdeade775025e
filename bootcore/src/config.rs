// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Compile-time bootloader configuration.
//!
//! `APP_*` and `BL_*` bounds here are placeholder defaults for host
//! builds and tests; `bootloader-fw` overrides them with values read
//! from the linker script at startup (see `bootloader-fw::layout`).

/// Largest accepted `payload_size` — must fit a DATA_PACKET frame
/// (header + data_len + next_len + end_flag + 1024 data bytes).
pub const MAX_BUFFER_SIZE: usize = 1024 + 9 + 9;

/// Flash page size in bytes, used by FLASH_ERASE's `page_count` unit.
pub const PAGE_SIZE: u32 = 1024;

/// Inclusive flash address bounds.
pub const FLASH_START: u32 = 0x0800_0000;
pub const FLASH_END: u32 = 0x0807_FFFF;

/// Application region, normally supplied by the link stage.
pub const APP_START: u32 = 0x0800_2000;
pub const APP_END: u32 = 0x0807_FFFF;
pub const APP_LEN: u32 = APP_END - APP_START + 1;

/// Bootloader's own region, normally supplied by the link stage.
pub const BL_START: u32 = 0x0800_0000;
pub const BL_END: u32 = 0x0800_1FFF;

pub const ENTER_CMD_MODE_KEY: u32 = 0x09B2_1FFC;
pub const JUMP_TO_APP_KEY: u32 = 0x4032_AFE5;

/// Consecutive CRC-failing DATA_PACKETs tolerated before a MEM_WRITE
/// session aborts.
pub const MAX_RETRIES: u32 = 5;

/// Coarse timeout (ms) for the whole "wait for a command" phase; its
/// callback moves the state machine to `Mode::Default`.
pub const COMMAND_TIMEOUT_MS: u32 = 1_000_000;
/// Per-`receive` poll timeout (ms).
pub const RECEIVE_TIMEOUT_MS: u32 = 1_000;
/// Per-`send` timeout (ms).
pub const SEND_TIMEOUT_MS: u32 = 1_000;

/// Bootloader version reported by the VERSION command.
pub const VERSION: u8 = 0x01;

/// Out-of-band synchronization byte exchanged once per command-mode
/// session.
pub const SYNC_BYTE: u8 = 0xA5;

/// Flash words that mean "no application present".
pub const FLASH_ERASED_WORD_1: u32 = 0xFFFF_FFFF;
pub const FLASH_ERASED_WORD_2: u32 = 0x0000_0000;

/// Data payload carried by one DATA_PACKET frame.
pub const DATA_BLOCK_SIZE: usize = 1024;
