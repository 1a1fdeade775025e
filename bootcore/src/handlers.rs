// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Per-command handlers.
//!
//! Every handler shares one pre-amble: recompute the CRC over the
//! already-received frame and bail out with `ACK(cmd_id, 0,
//! INVALID_CRC)` if it disagrees with the header's `crc32` field. The
//! state machine has already decoded the frame into a `Command`
//! before calling in here; handlers take the decoded fields plus
//! `len`, the byte count of the frame the state machine landed in
//! `ctx.command_buffer`, and recheck the CRC against that buffer
//! rather than a separately-threaded slice — `ctx.command_buffer` is
//! the one receive buffer, there is no second copy on the stack.

use crate::config::{self, DATA_BLOCK_SIZE, MAX_BUFFER_SIZE, MAX_RETRIES};
use crate::context::{BootContext, Mode};
use crate::crc::crc32_skip_field;
use crate::platform::Platform;
use crate::protocol::{self, nack, Ack, CommandId, Header};

fn verify_crc(frame: &[u8], header: &Header) -> bool {
    crc32_skip_field(frame, Header::CRC_OFFSET) == header.crc32
}

fn send_ack<P: Platform>(platform: &mut P, cmd_id: u8, ack: bool, nack_field: u8) {
    let frame = Ack { cmd_id, ack, nack_field }.encode();
    let _ = platform.send(&frame, config::SEND_TIMEOUT_MS);
}

/// Sent by the dispatcher for a known command id whose `payload_size`
/// does not fit that id's frame shape, before any handler runs.
pub fn send_invalid_length<P: Platform>(platform: &mut P, cmd_id: u8) {
    send_ack(platform, cmd_id, false, nack::INVALID_LENGTH);
}

/// Blocking receive of one more frame (header then body) into
/// `ctx.command_buffer`, returning the number of bytes received, or
/// `None` on a transport error.
fn receive_frame<P: Platform>(ctx: &mut BootContext, platform: &mut P) -> Option<usize> {
    platform.receive(&mut ctx.command_buffer[..Header::SIZE], config::RECEIVE_TIMEOUT_MS).ok()?;
    let header = Header::decode(&ctx.command_buffer);
    let payload_size = header.payload_size as usize;
    if payload_size < Header::SIZE || payload_size > MAX_BUFFER_SIZE {
        return Some(Header::SIZE);
    }
    platform
        .receive(&mut ctx.command_buffer[Header::SIZE..payload_size], config::RECEIVE_TIMEOUT_MS)
        .ok()?;
    Some(payload_size)
}

fn receive_ack<P: Platform>(platform: &mut P) -> bool {
    let mut buf = [0u8; Ack::SIZE];
    if platform.receive(&mut buf, config::RECEIVE_TIMEOUT_MS).is_err() {
        return false;
    }
    matches!(Ack::decode(&buf), Some(a) if a.ack && a.cmd_id == CommandId::Ack as u8)
}

pub fn goto_addr<P: Platform>(ctx: &mut BootContext, platform: &mut P, header: &Header, len: usize, address: u32) {
    if !verify_crc(&ctx.command_buffer[..len], header) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_CRC);
        return;
    }

    send_ack(platform, header.cmd_id, true, nack::SUCCESS);

    if crate::region::inside_range(address, ctx.bl_start, ctx.bl_end) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_ADDRESS);
        return;
    }

    ctx.current_address = address;
}

pub fn mem_write<P: Platform>(ctx: &mut BootContext, platform: &mut P, header: &Header, len: usize, start_address: u32) {
    if !verify_crc(&ctx.command_buffer[..len], header) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_CRC);
        return;
    }

    let address_ok = !crate::region::inside_range(start_address, ctx.bl_start, ctx.bl_end)
        && crate::region::inside_range(start_address, ctx.flash_start, ctx.flash_end);
    if !address_ok {
        send_ack(platform, header.cmd_id, false, nack::INVALID_ADDRESS);
        return;
    }

    send_ack(platform, header.cmd_id, true, nack::SUCCESS);

    let mut address = start_address;
    let mut retries: u32 = 0;

    loop {
        let Some(plen) = receive_frame(ctx, platform) else {
            return;
        };
        let sub_header = Header::decode(&ctx.command_buffer);

        let packet = match protocol::decode(&ctx.command_buffer[..plen], MAX_BUFFER_SIZE) {
            Ok(protocol::Command::DataPacket { data_len, end_flag, data, .. }) => (data_len, end_flag, data),
            _ => {
                send_ack(platform, sub_header.cmd_id, false, nack::INVALID_DATA | nack::INVALID_CRC);
                if retries >= MAX_RETRIES {
                    return;
                }
                retries += 1;
                continue;
            }
        };

        if !verify_crc(&ctx.command_buffer[..plen], &sub_header) {
            send_ack(platform, sub_header.cmd_id, false, nack::INVALID_DATA | nack::INVALID_CRC);
            if retries >= MAX_RETRIES {
                return;
            }
            retries += 1;
            continue;
        }

        let (data_len, end_flag, data) = packet;

        if crate::region::block_overlaps_range(ctx.bl_start, ctx.bl_end, address, data_len) {
            send_ack(platform, sub_header.cmd_id, false, nack::INVALID_ADDRESS);
            return;
        }

        if platform.flash_write(address, data).is_err() {
            crate::log::debug!("flash_write failed at {=u32:#010x}", address);
            send_ack(platform, sub_header.cmd_id, false, nack::OPERATION_FAILURE);
            return;
        }

        address += data_len;
        retries = 0;
        send_ack(platform, sub_header.cmd_id, true, nack::SUCCESS);

        if end_flag {
            break;
        }
    }
}

pub fn mem_read<P: Platform>(
    ctx: &mut BootContext,
    platform: &mut P,
    header: &Header,
    len: usize,
    start_address: u32,
    length: u32,
) {
    if !verify_crc(&ctx.command_buffer[..len], header) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_CRC);
        return;
    }

    let address_ok = !crate::region::inside_range(start_address, ctx.bl_start, ctx.bl_end)
        && crate::region::block_inside_range(ctx.flash_start, ctx.flash_end, start_address, length);
    if !address_ok {
        send_ack(platform, header.cmd_id, false, nack::INVALID_ADDRESS);
        return;
    }

    send_ack(platform, header.cmd_id, true, nack::SUCCESS);

    let blocks = length / DATA_BLOCK_SIZE as u32;
    let remainder = length % DATA_BLOCK_SIZE as u32;
    let mut address = start_address;
    let mut out = [0u8; MAX_BUFFER_SIZE];
    let mut data = [0u8; DATA_BLOCK_SIZE];

    for i in 0..blocks {
        platform.flash_read(address, &mut data);
        let end_flag = (i + 1) * DATA_BLOCK_SIZE as u32 == length;

        // next_len names the byte size of the frame that will carry
        // the next block, not the raw data-byte count: 0 when there
        // is no next block, else the DATA_PACKET frame overhead plus
        // that block's data bytes.
        let next_block_bytes = if i + 1 == blocks { remainder } else { DATA_BLOCK_SIZE as u32 };
        let next_len = if next_block_bytes == 0 { 0 } else { protocol::DATA_PACKET_OVERHEAD + next_block_bytes };

        if !send_data_packet(platform, &mut out, &data, next_len, end_flag) {
            return;
        }
        if !receive_ack(platform) {
            return;
        }
        address += DATA_BLOCK_SIZE as u32;
    }

    let mut remaining = remainder;
    while remaining > 0 {
        let n = remaining as usize;
        platform.flash_read(address, &mut data[..n]);

        if !send_data_packet(platform, &mut out, &data[..n], 0, true) {
            return;
        }
        if receive_ack(platform) {
            break;
        }
        // resend until ack received
    }
}

fn send_data_packet<P: Platform>(platform: &mut P, out: &mut [u8; MAX_BUFFER_SIZE], data: &[u8], next_len: u32, end_flag: bool) -> bool {
    let len = protocol::encode_data_packet(out, data, next_len, end_flag);
    let crc = crc32_skip_field(&out[..len], Header::CRC_OFFSET);
    out[Header::CRC_OFFSET..Header::CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());
    platform.send(&out[..len], config::SEND_TIMEOUT_MS).is_ok()
}

pub fn version<P: Platform>(ctx: &mut BootContext, platform: &mut P, header: &Header, len: usize) {
    if !verify_crc(&ctx.command_buffer[..len], header) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_CRC);
        return;
    }

    send_ack(platform, header.cmd_id, true, nack::SUCCESS);

    let mut out = [0u8; Header::SIZE + 1];
    let resp_len = protocol::encode_response(&mut out, &[config::VERSION]);
    let crc = crc32_skip_field(&out[..resp_len], Header::CRC_OFFSET);
    out[Header::CRC_OFFSET..Header::CRC_OFFSET + 4].copy_from_slice(&crc.to_le_bytes());
    let _ = platform.send(&out[..resp_len], config::SEND_TIMEOUT_MS);
}

pub fn flash_erase<P: Platform>(
    ctx: &mut BootContext,
    platform: &mut P,
    header: &Header,
    len: usize,
    page_address: u32,
    page_count: u32,
) {
    if !verify_crc(&ctx.command_buffer[..len], header) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_CRC);
        return;
    }

    if crate::region::inside_range(page_address, ctx.bl_start, ctx.bl_end) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_ADDRESS);
        return;
    }

    let byte_len = page_count.saturating_mul(config::PAGE_SIZE);
    if !crate::region::block_inside_range(ctx.flash_start, ctx.flash_end, page_address, byte_len) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_ADDRESS);
        return;
    }

    send_ack(platform, header.cmd_id, true, nack::SUCCESS);

    let ok = platform.erase_flash(page_address, page_count).is_ok();
    if !ok {
        crate::log::debug!("erase_flash failed at {=u32:#010x}", page_address);
    }
    send_ack(platform, header.cmd_id, ok, if ok { nack::SUCCESS } else { nack::OPERATION_FAILURE });
}

pub fn enter_cmd_mode<P: Platform>(ctx: &mut BootContext, platform: &mut P, header: &Header, len: usize, key: u32) {
    if !verify_crc(&ctx.command_buffer[..len], header) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_CRC);
        return;
    }

    let matches = key == config::ENTER_CMD_MODE_KEY;
    if !matches {
        ctx.set_mode(Mode::Default);
    }
    send_ack(platform, header.cmd_id, matches, 0);
}

pub fn jump_to_app<P: Platform>(ctx: &mut BootContext, platform: &mut P, header: &Header, len: usize, key: u32) {
    if !verify_crc(&ctx.command_buffer[..len], header) {
        send_ack(platform, header.cmd_id, false, nack::INVALID_CRC);
        return;
    }

    let matches = key == config::JUMP_TO_APP_KEY;
    if matches {
        ctx.set_mode(Mode::Default);
    }
    send_ack(platform, header.cmd_id, matches, 0);
}
