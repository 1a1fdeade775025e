// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Top-level state machine driving boot selection, host
//! synchronization, command reception, and application dispatch.
//!
//! ```text
//!    [Init] ──init ok──▶ [ReceiveCommand]
//!      │                        │
//!      │                    sync + header + body
//!      │                        ▼
//!      │                 [CommandMode] ◀── completed handler ──┐
//!      │                        │                              │
//!      │                    timeout / key=Default              │
//!      │                        ▼                              │
//!      │                   [Default] ──valid image──▶ launch app
//!      │                        │
//!      │                  no valid image
//!      │                        ▼
//!      │                     halt
//! ```
//!
//! No-image behavior in `Default` halts in a busy loop rather than
//! falling back to command mode: once a session has deliberately left
//! command mode with no application to hand off to, there is nothing
//! left to retry.

use crate::config::{self, MAX_BUFFER_SIZE};
use crate::context::{BootContext, Mode};
use crate::image::{is_image_valid, Launcher};
use crate::platform::Platform;
use crate::handlers;
use crate::protocol::{self, Command, DecodeError, Header};

/// Run the bootloader forever. Never returns: `Default` either
/// launches the application or halts.
pub fn run<P: Platform, L: Launcher>(ctx: &mut BootContext, platform: &mut P, launcher: &mut L) -> ! {
    loop {
        match ctx.mode() {
            Mode::Init => init(ctx, platform),
            Mode::ReceiveCommand => receive_command(ctx, platform),
            Mode::CommandMode => command_mode(ctx, platform),
            Mode::Default => default_mode(ctx, platform, launcher),
        }
    }
}

fn init<P: Platform>(ctx: &mut BootContext, platform: &mut P) {
    platform.init_led();
    platform.init_button();
    platform.init_comm();

    if platform.get_button_state() {
        ctx.set_mode(Mode::Default);
    } else {
        ctx.set_mode(Mode::ReceiveCommand);
    }
}

fn receive_command<P: Platform>(ctx: &mut BootContext, platform: &mut P) {
    if !platform.wait_for_sync(config::SYNC_BYTE, config::COMMAND_TIMEOUT_MS) {
        ctx.set_mode(Mode::Default);
        return;
    }

    let _ = platform.send(&[config::SYNC_BYTE], config::SEND_TIMEOUT_MS);
    ctx.set_mode(Mode::CommandMode);
    command_mode(ctx, platform);
}

fn command_mode<P: Platform>(ctx: &mut BootContext, platform: &mut P) {
    if platform.receive(&mut ctx.command_buffer[..Header::SIZE], config::RECEIVE_TIMEOUT_MS).is_err() {
        return;
    }
    let header = Header::decode(&ctx.command_buffer);
    let payload_size = header.payload_size as usize;

    if payload_size < Header::SIZE || payload_size > MAX_BUFFER_SIZE {
        return;
    }
    if platform
        .receive(&mut ctx.command_buffer[Header::SIZE..payload_size], config::RECEIVE_TIMEOUT_MS)
        .is_err()
    {
        return;
    }

    dispatch(ctx, platform, payload_size, &header);
}

/// A `Command`, stripped of its borrow on `ctx.command_buffer`, so the
/// decode (which reads the buffer) and the handler call (which may
/// need to write other `ctx` fields) are two clearly separate borrows
/// rather than one held across the other.
#[derive(Clone, Copy)]
enum Routed {
    Unknown(u8),
    BadLength,
    GotoAddr(u32),
    MemWrite(u32),
    MemRead(u32, u32),
    Version,
    FlashErase(u32, u32),
    EnterCmdMode(u32),
    JumpToApp(u32),
    Ignored,
}

fn dispatch<P: Platform>(ctx: &mut BootContext, platform: &mut P, len: usize, header: &Header) {
    let routed = match protocol::decode(&ctx.command_buffer[..len], MAX_BUFFER_SIZE) {
        Err(DecodeError::UnknownCommand(id)) => Routed::Unknown(id),
        Err(DecodeError::BadLength) => Routed::BadLength,
        Ok(Command::GotoAddr { address }) => Routed::GotoAddr(address),
        Ok(Command::MemWrite { start_address }) => Routed::MemWrite(start_address),
        Ok(Command::MemRead { start_address, length }) => Routed::MemRead(start_address, length),
        Ok(Command::Version) => Routed::Version,
        Ok(Command::FlashErase { page_address, page_count }) => Routed::FlashErase(page_address, page_count),
        Ok(Command::EnterCmdMode { key }) => Routed::EnterCmdMode(key),
        Ok(Command::JumpToApp { key }) => Routed::JumpToApp(key),
        // a DATA_PACKET arriving outside a MEM_WRITE session has no handler
        Ok(Command::DataPacket { .. }) => Routed::Ignored,
    };

    match routed {
        Routed::Unknown(id) => crate::log::debug!("unknown command id {=u8:#04x}, ignoring", id),
        Routed::BadLength => handlers::send_invalid_length(platform, header.cmd_id),
        Routed::GotoAddr(address) => handlers::goto_addr(ctx, platform, header, len, address),
        Routed::MemWrite(start_address) => handlers::mem_write(ctx, platform, header, len, start_address),
        Routed::MemRead(start_address, length) => handlers::mem_read(ctx, platform, header, len, start_address, length),
        Routed::Version => handlers::version(ctx, platform, header, len),
        Routed::FlashErase(page_address, page_count) => {
            handlers::flash_erase(ctx, platform, header, len, page_address, page_count)
        }
        Routed::EnterCmdMode(key) => handlers::enter_cmd_mode(ctx, platform, header, len, key),
        Routed::JumpToApp(key) => handlers::jump_to_app(ctx, platform, header, len, key),
        Routed::Ignored => {}
    }
}

fn default_mode<P: Platform, L: Launcher>(ctx: &mut BootContext, platform: &mut P, launcher: &mut L) -> ! {
    let mut first_word = [0u8; 4];
    platform.flash_read(ctx.app_start, &mut first_word);

    if is_image_valid(u32::from_le_bytes(first_word)) {
        launcher.launch(ctx.app_start);
    }

    loop {
        platform.delay(1);
    }
}
