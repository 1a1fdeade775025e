// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command implementations driving the bootloader's wire protocol.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use bootcore::protocol::{nack, CommandId};
use indicatif::{ProgressBar, ProgressStyle};

use crate::transport::Transport;

const CHUNK_SIZE: usize = bootcore::config::DATA_BLOCK_SIZE;
const ERASE_TIMEOUT_MS: u64 = 60_000;

fn describe_nack(nack_field: u8) -> String {
    let mut flags = Vec::new();
    if nack_field & nack::INVALID_CMD != 0 {
        flags.push("invalid command");
    }
    if nack_field & nack::INVALID_KEY != 0 {
        flags.push("invalid key");
    }
    if nack_field & nack::INVALID_ADDRESS != 0 {
        flags.push("invalid address");
    }
    if nack_field & nack::INVALID_LENGTH != 0 {
        flags.push("invalid length");
    }
    if nack_field & nack::INVALID_DATA != 0 {
        flags.push("invalid data");
    }
    if nack_field & nack::INVALID_CRC != 0 {
        flags.push("invalid crc");
    }
    if nack_field & nack::OPERATION_FAILURE != 0 {
        flags.push("operation failure");
    }
    if flags.is_empty() {
        format!("{:#04x}", nack_field)
    } else {
        flags.join(", ")
    }
}

/// Device-only timeout for GOTO_ADDR's conditional second ack: short
/// enough not to stall a successful `goto`, long enough for the
/// device's own back-to-back sends to have landed.
const GOTO_SECOND_ACK_TIMEOUT_MS: u64 = 200;

/// GOTO_ADDR: set the device's working address.
///
/// The device always sends one ack first, then — only if the address
/// turns out to lie inside its own bootloader region — a second,
/// rejecting one. A successful `goto` never sees that second frame.
pub fn goto(transport: &mut Transport, address: u32) -> Result<()> {
    transport.send_command(CommandId::GotoAddr as u8, &address.to_le_bytes())?;
    let ack = transport.recv_ack()?;
    if !ack.ack {
        bail!("GOTO_ADDR rejected: {}", describe_nack(ack.nack_field));
    }

    if let Some(second) = transport.try_recv_ack(GOTO_SECOND_ACK_TIMEOUT_MS)? {
        if !second.ack {
            bail!("GOTO_ADDR rejected: {}", describe_nack(second.nack_field));
        }
    }

    println!("Address set to {:#010x}", address);
    Ok(())
}

/// VERSION: query and print the bootloader version.
pub fn version(transport: &mut Transport) -> Result<()> {
    transport.send_command(CommandId::Version as u8, &[])?;
    let ack = transport.recv_ack()?;
    if !ack.ack {
        bail!("VERSION rejected: {}", describe_nack(ack.nack_field));
    }
    let body = transport.recv_frame()?;
    let version = *body.first().context("empty VERSION response")?;
    println!("Bootloader version: {}", version);
    Ok(())
}

/// FLASH_ERASE: erase `page_count` pages starting at `page_address`.
pub fn erase(transport: &mut Transport, page_address: u32, page_count: u32) -> Result<()> {
    print!("Erasing {} page(s) at {:#010x}... ", page_count, page_address);
    std::io::stdout().flush()?;

    let mut body = [0u8; 8];
    body[0..4].copy_from_slice(&page_address.to_le_bytes());
    body[4..8].copy_from_slice(&page_count.to_le_bytes());
    transport.send_command(CommandId::FlashErase as u8, &body)?;

    let ack = transport.recv_ack()?;
    if !ack.ack {
        bail!("FLASH_ERASE rejected: {}", describe_nack(ack.nack_field));
    }
    let ack = transport.recv_ack_timeout(ERASE_TIMEOUT_MS)?;
    if !ack.ack {
        bail!("FLASH_ERASE failed: {}", describe_nack(ack.nack_field));
    }
    println!("OK");
    Ok(())
}

/// ENTER_CMD_MODE: re-arm the state machine's stay-in-command-mode key.
pub fn enter_cmd_mode(transport: &mut Transport) -> Result<()> {
    transport.send_command(
        CommandId::EnterCmdMode as u8,
        &bootcore::config::ENTER_CMD_MODE_KEY.to_le_bytes(),
    )?;
    let ack = transport.recv_ack()?;
    if !ack.ack {
        bail!("ENTER_CMD_MODE rejected: {}", describe_nack(ack.nack_field));
    }
    println!("Command mode re-armed.");
    Ok(())
}

/// JUMP_TO_APP: launch the application.
pub fn jump_to_app(transport: &mut Transport) -> Result<()> {
    print!("Jumping to application... ");
    std::io::stdout().flush()?;
    transport.send_command(
        CommandId::JumpToApp as u8,
        &bootcore::config::JUMP_TO_APP_KEY.to_le_bytes(),
    )?;
    let ack = transport.recv_ack()?;
    if !ack.ack {
        bail!("JUMP_TO_APP rejected: {}", describe_nack(ack.nack_field));
    }
    println!("OK");
    Ok(())
}

/// MEM_WRITE: stream `file`'s contents to flash starting at `address`.
pub fn write(transport: &mut Transport, file: &Path, address: u32) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let size = data.len() as u32;

    println!("File: {} ({} bytes)", file.display(), size);
    println!("Target: {:#010x}", address);

    transport.send_command(CommandId::MemWrite as u8, &address.to_le_bytes())?;
    let ack = transport.recv_ack()?;
    if !ack.ack {
        bail!("MEM_WRITE rejected: {}", describe_nack(ack.nack_field));
    }

    let pb = ProgressBar::new(size as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );

    let chunks: Vec<&[u8]> = data.chunks(CHUNK_SIZE).collect();
    let mut sent = 0u64;

    for (i, chunk) in chunks.iter().enumerate() {
        let end_flag = i + 1 == chunks.len();
        let next_len = if end_flag { 0 } else { chunks[i + 1].len() as u32 };

        let mut body = vec![0u8; 9 + chunk.len()];
        body[0..4].copy_from_slice(&(chunk.len() as u32).to_le_bytes());
        body[4..8].copy_from_slice(&next_len.to_le_bytes());
        body[8] = end_flag as u8;
        body[9..].copy_from_slice(chunk);

        transport.send_command(CommandId::DataPacket as u8, &body)?;
        let ack = transport.recv_ack()?;
        if !ack.ack {
            pb.abandon();
            bail!("DATA_PACKET rejected at offset {}: {}", sent, describe_nack(ack.nack_field));
        }

        sent += chunk.len() as u64;
        pb.set_position(sent);
    }

    pb.finish_with_message("upload complete");
    println!();
    println!("Wrote {} bytes starting at {:#010x}.", size, address);
    Ok(())
}

/// MEM_READ: stream `length` bytes from `address` into `out`.
pub fn read(transport: &mut Transport, address: u32, length: u32, out: &Path) -> Result<()> {
    println!("Reading {} bytes from {:#010x}", length, address);

    let mut body = [0u8; 8];
    body[0..4].copy_from_slice(&address.to_le_bytes());
    body[4..8].copy_from_slice(&length.to_le_bytes());
    transport.send_command(CommandId::MemRead as u8, &body)?;

    let ack = transport.recv_ack()?;
    if !ack.ack {
        bail!("MEM_READ rejected: {}", describe_nack(ack.nack_field));
    }

    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );

    let mut collected = Vec::with_capacity(length as usize);
    loop {
        let body = transport.recv_frame()?;
        let (data_len, end_flag, data) = parse_data_packet_body(&body)?;
        collected.extend_from_slice(data);
        pb.set_position(collected.len() as u64);
        transport.send_ack()?;
        if end_flag || data_len == 0 {
            break;
        }
    }

    pb.finish_with_message("download complete");
    println!();
    fs::write(out, &collected).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Saved {} bytes to {}.", collected.len(), out.display());
    Ok(())
}

/// Pulls `(data_len, end_flag, data)` out of a DATA_PACKET body
/// (everything after the 9-byte header), matching the field layout
/// `protocol::Command::DataPacket` decodes on the device side.
fn parse_data_packet_body(body: &[u8]) -> Result<(u32, bool, &[u8])> {
    if body.len() < 9 {
        bail!("DATA_PACKET response body is too short");
    }
    let data_len = u32::from_le_bytes([body[0], body[1], body[2], body[3]]);
    let end_flag = body[8] != 0;
    let data = &body[9..];
    if data_len as usize != data.len() {
        bail!("DATA_PACKET response data_len does not match the bytes received");
    }
    Ok((data_len, end_flag, data))
}
