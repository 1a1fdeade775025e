// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Frame codec: command ids, header layout, and per-command bodies.
//!
//! On-wire structs are never reinterpreted through pointer casts —
//! every multi-byte field is read and written at an explicit
//! little-endian byte offset, which also sidesteps any packed-struct
//! alignment assumption. There is no dynamic allocation: `decode`
//! borrows its `DataPacket` payload straight out of the caller-owned
//! buffer.

use crate::config::DATA_BLOCK_SIZE;
use crate::crc::crc32_skip_field;

/// Command ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    GotoAddr = 0x01,
    MemWrite = 0x02,
    MemRead = 0x03,
    Version = 0x04,
    FlashErase = 0x05,
    Ack = 0x06,
    EnterCmdMode = 0x07,
    JumpToApp = 0x08,
    DataPacket = 0x09,
    Response = 0xFF,
}

impl CommandId {
    pub fn from_u8(v: u8) -> Option<CommandId> {
        Some(match v {
            0x01 => CommandId::GotoAddr,
            0x02 => CommandId::MemWrite,
            0x03 => CommandId::MemRead,
            0x04 => CommandId::Version,
            0x05 => CommandId::FlashErase,
            0x06 => CommandId::Ack,
            0x07 => CommandId::EnterCmdMode,
            0x08 => CommandId::JumpToApp,
            0x09 => CommandId::DataPacket,
            0xFF => CommandId::Response,
            _ => return None,
        })
    }
}

/// NACK bitfield. Multiple bits may be OR'd into one ACK.
pub mod nack {
    pub const SUCCESS: u8 = 0x00;
    pub const INVALID_CMD: u8 = 0x01;
    pub const INVALID_KEY: u8 = 0x02;
    pub const INVALID_ADDRESS: u8 = 0x04;
    pub const INVALID_LENGTH: u8 = 0x08;
    pub const INVALID_DATA: u8 = 0x10;
    pub const INVALID_CRC: u8 = 0x20;
    pub const OPERATION_FAILURE: u8 = 0x40;
}

/// 9-byte command header.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub payload_size: u32,
    pub cmd_id: u8,
    pub crc32: u32,
}

impl Header {
    pub const SIZE: usize = 9;
    /// Byte offset of the `crc32` field within a header — the CRC
    /// engine skips these 4 bytes when hashing a whole frame.
    pub const CRC_OFFSET: usize = 5;

    /// Read a header out of the first 9 bytes of `buf`.
    ///
    /// Panics if `buf` is shorter than `Header::SIZE`; callers always
    /// receive the header before calling this.
    pub fn decode(buf: &[u8]) -> Header {
        Header {
            payload_size: le_u32(buf, 0),
            cmd_id: buf[4],
            crc32: le_u32(buf, 5),
        }
    }

    pub fn encode(&self, buf: &mut [u8]) {
        buf[0..4].copy_from_slice(&self.payload_size.to_le_bytes());
        buf[4] = self.cmd_id;
        buf[5..9].copy_from_slice(&self.crc32.to_le_bytes());
    }
}

fn le_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// A fully decoded command frame, borrowed from the caller's buffer.
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    GotoAddr { address: u32 },
    MemWrite { start_address: u32 },
    MemRead { start_address: u32, length: u32 },
    Version,
    FlashErase { page_address: u32, page_count: u32 },
    EnterCmdMode { key: u32 },
    JumpToApp { key: u32 },
    DataPacket {
        data_len: u32,
        next_len: u32,
        end_flag: bool,
        data: &'a [u8],
    },
}

/// Frame overhead of a DATA_PACKET (header + `data_len` + `next_len` +
/// `end_flag`) excluding the data block itself — the unit `next_len`
/// is expressed in, per `original_source/bl/src/bl_handlers.c`'s
/// `sizeof(BL_DATA_PACKET_CMD) - BL_DATA_BLOCK_SIZE`.
pub const DATA_PACKET_OVERHEAD: u32 = (Header::SIZE + 9) as u32;

/// Minimum total frame size (header inclusive) for a given command id.
pub fn min_frame_size(id: CommandId) -> usize {
    match id {
        CommandId::GotoAddr => Header::SIZE + 4,
        CommandId::MemWrite => Header::SIZE + 4,
        CommandId::MemRead => Header::SIZE + 8,
        CommandId::Version => Header::SIZE,
        CommandId::FlashErase => Header::SIZE + 8,
        CommandId::EnterCmdMode => Header::SIZE + 4,
        CommandId::JumpToApp => Header::SIZE + 4,
        CommandId::DataPacket => Header::SIZE + 9,
        CommandId::Ack | CommandId::Response => Header::SIZE,
    }
}

/// Why `decode` could not produce a `Command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// `cmd_id` is not one of the known received-command ids.
    UnknownCommand(u8),
    /// `payload_size` is below the id's minimum body size, above
    /// `max_buffer_size`, or (for DATA_PACKET) inconsistent with
    /// `data_len`.
    BadLength,
}

/// Decode a full frame (header + body) already sitting in `buf`.
///
/// `buf` must hold at least `Header::SIZE` bytes; `max_buffer_size` is
/// the caller's configured ceiling on `payload_size`
/// (`config::MAX_BUFFER_SIZE` in production, overridable in tests).
pub fn decode<'a>(buf: &'a [u8], max_buffer_size: usize) -> Result<Command<'a>, DecodeError> {
    if buf.len() < Header::SIZE {
        return Err(DecodeError::BadLength);
    }
    let header = Header::decode(buf);
    let Some(id) = CommandId::from_u8(header.cmd_id) else {
        return Err(DecodeError::UnknownCommand(header.cmd_id));
    };

    let payload_size = header.payload_size as usize;
    if payload_size < min_frame_size(id) || payload_size > max_buffer_size || payload_size > buf.len() {
        return Err(DecodeError::BadLength);
    }

    let body = &buf[Header::SIZE..payload_size];
    Ok(match id {
        CommandId::GotoAddr => Command::GotoAddr { address: le_u32(body, 0) },
        CommandId::MemWrite => Command::MemWrite { start_address: le_u32(body, 0) },
        CommandId::MemRead => Command::MemRead {
            start_address: le_u32(body, 0),
            length: le_u32(body, 4),
        },
        CommandId::Version => Command::Version,
        CommandId::FlashErase => Command::FlashErase {
            page_address: le_u32(body, 0),
            page_count: le_u32(body, 4),
        },
        CommandId::EnterCmdMode => Command::EnterCmdMode { key: le_u32(body, 0) },
        CommandId::JumpToApp => Command::JumpToApp { key: le_u32(body, 0) },
        CommandId::DataPacket => {
            let data_len = le_u32(body, 0);
            let next_len = le_u32(body, 4);
            let end_flag = body[8] != 0;
            if data_len as usize != body.len() - 9 {
                return Err(DecodeError::BadLength);
            }
            Command::DataPacket {
                data_len,
                next_len,
                end_flag,
                data: &body[9..],
            }
        }
        CommandId::Ack | CommandId::Response => unreachable!("not a received command id"),
    })
}

/// 3-byte ACK frame, sent-only, no CRC.
#[derive(Debug, Clone, Copy)]
pub struct Ack {
    pub cmd_id: u8,
    pub ack: bool,
    pub nack_field: u8,
}

impl Ack {
    pub const SIZE: usize = 3;

    pub fn encode(&self) -> [u8; Self::SIZE] {
        [self.cmd_id, self.ack as u8, self.nack_field]
    }

    pub fn decode(buf: &[u8]) -> Option<Ack> {
        if buf.len() < Self::SIZE {
            return None;
        }
        Some(Ack {
            cmd_id: buf[0],
            ack: buf[1] == 1,
            nack_field: buf[2],
        })
    }
}

/// Build a DATA_PACKET frame into `out`, returning the number of
/// bytes written (the frame's `payload_size`).
///
/// `crc` is the already-computed CRC over the frame with the header's
/// `crc32` field zero-sized (see `crc::crc32_skip_field`); callers
/// compute it over `out[..len]` after this call and patch it in with
/// `Header::encode`, matching the two-pass "fill body, then CRC"
/// order the VERSION and MEM_READ handlers use.
pub fn encode_data_packet(out: &mut [u8], data: &[u8], next_len: u32, end_flag: bool) -> usize {
    debug_assert!(data.len() <= DATA_BLOCK_SIZE);
    let payload_size = (Header::SIZE + 9 + data.len()) as u32;

    Header {
        payload_size,
        cmd_id: CommandId::DataPacket as u8,
        crc32: 0,
    }
    .encode(out);

    out[9..13].copy_from_slice(&(data.len() as u32).to_le_bytes());
    out[13..17].copy_from_slice(&next_len.to_le_bytes());
    out[17] = end_flag as u8;
    out[18..18 + data.len()].copy_from_slice(data);

    payload_size as usize
}

/// Build a RESPONSE frame (header with `cmd_id = 0xFF`, followed by
/// `data`) into `out`, returning the frame length.
pub fn encode_response(out: &mut [u8], data: &[u8]) -> usize {
    let payload_size = (Header::SIZE + data.len()) as u32;

    Header {
        payload_size,
        cmd_id: CommandId::Response as u8,
        crc32: 0,
    }
    .encode(out);

    out[Header::SIZE..Header::SIZE + data.len()].copy_from_slice(data);
    payload_size as usize
}

/// Build a complete command frame (header + `body`) into `out`,
/// computing and filling in the CRC. Returns the frame length.
///
/// This is the same two-pass "encode with `crc32 = 0`, hash, encode
/// again" sequence the handlers use to build their own outbound
/// frames; callers driving the protocol from the host side (rather
/// than responding to it) reuse it instead of duplicating the
/// header/CRC-offset bookkeeping.
pub fn encode_request(out: &mut [u8], cmd_id: u8, body: &[u8]) -> usize {
    let payload_size = (Header::SIZE + body.len()) as u32;

    Header { payload_size, cmd_id, crc32: 0 }.encode(out);
    out[Header::SIZE..Header::SIZE + body.len()].copy_from_slice(body);

    let crc = crc32_skip_field(&out[..payload_size as usize], Header::CRC_OFFSET);
    Header { payload_size, cmd_id, crc32: crc }.encode(out);

    payload_size as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_header(buf: &mut [u8], payload_size: u32, cmd_id: u8, crc32: u32) {
        Header { payload_size, cmd_id, crc32 }.encode(buf);
    }

    #[test]
    fn decodes_goto_addr() {
        let mut buf = [0u8; 13];
        encode_header(&mut buf, 13, CommandId::GotoAddr as u8, 0);
        buf[9..13].copy_from_slice(&0x0800_2000u32.to_le_bytes());

        match decode(&buf, 1512).unwrap() {
            Command::GotoAddr { address } => assert_eq!(address, 0x0800_2000),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn decodes_version_with_no_body() {
        let mut buf = [0u8; 9];
        encode_header(&mut buf, 9, CommandId::Version as u8, 0);
        assert!(matches!(decode(&buf, 1512), Ok(Command::Version)));
    }

    #[test]
    fn decodes_mem_read() {
        let mut buf = [0u8; 17];
        encode_header(&mut buf, 17, CommandId::MemRead as u8, 0);
        buf[9..13].copy_from_slice(&0x0800_4000u32.to_le_bytes());
        buf[13..17].copy_from_slice(&256u32.to_le_bytes());

        match decode(&buf, 1512).unwrap() {
            Command::MemRead { start_address, length } => {
                assert_eq!(start_address, 0x0800_4000);
                assert_eq!(length, 256);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn decodes_data_packet_with_partial_block() {
        let mut buf = [0u8; 9 + 9 + 10];
        encode_header(&mut buf, buf.len() as u32, CommandId::DataPacket as u8, 0);
        buf[9..13].copy_from_slice(&10u32.to_le_bytes());
        buf[13..17].copy_from_slice(&0u32.to_le_bytes());
        buf[17] = 1;
        buf[18..28].copy_from_slice(&[7u8; 10]);

        match decode(&buf, 1512).unwrap() {
            Command::DataPacket { data_len, end_flag, data, .. } => {
                assert_eq!(data_len, 10);
                assert!(end_flag);
                assert_eq!(data, &[7u8; 10]);
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_command_id() {
        let mut buf = [0u8; 9];
        encode_header(&mut buf, 9, 0x42, 0);
        assert_eq!(decode(&buf, 1512), Err(DecodeError::UnknownCommand(0x42)));
    }

    #[test]
    fn rejects_payload_size_below_minimum() {
        let mut buf = [0u8; 9];
        encode_header(&mut buf, 9, CommandId::GotoAddr as u8, 0); // needs 13
        assert_eq!(decode(&buf, 1512), Err(DecodeError::BadLength));
    }

    #[test]
    fn rejects_payload_size_above_max_buffer() {
        let mut buf = [0u8; 13];
        encode_header(&mut buf, 13, CommandId::GotoAddr as u8, 0);
        assert_eq!(decode(&buf, 12), Err(DecodeError::BadLength));
    }

    #[test]
    fn rejects_data_packet_with_inconsistent_data_len() {
        let mut buf = [0u8; 9 + 9 + 10];
        encode_header(&mut buf, buf.len() as u32, CommandId::DataPacket as u8, 0);
        buf[9..13].copy_from_slice(&999u32.to_le_bytes()); // lies about data_len
        assert_eq!(decode(&buf, 1512), Err(DecodeError::BadLength));
    }

    #[test]
    fn ack_round_trips() {
        let ack = Ack { cmd_id: CommandId::Version as u8, ack: true, nack_field: 0 };
        let bytes = ack.encode();
        let decoded = Ack::decode(&bytes).unwrap();
        assert_eq!(decoded.cmd_id, ack.cmd_id);
        assert_eq!(decoded.ack, ack.ack);
        assert_eq!(decoded.nack_field, ack.nack_field);
    }

    #[test]
    fn encode_data_packet_sets_payload_size_and_fields() {
        let mut out = [0u8; 64];
        let data = [1u8, 2, 3, 4, 5];
        let len = encode_data_packet(&mut out, &data, 0, true);

        assert_eq!(len, Header::SIZE + 9 + data.len());
        let header = Header::decode(&out);
        assert_eq!(header.payload_size as usize, len);
        assert_eq!(header.cmd_id, CommandId::DataPacket as u8);
        assert_eq!(le_u32(&out, 9), data.len() as u32);
        assert_eq!(out[17], 1);
        assert_eq!(&out[18..18 + data.len()], &data[..]);
    }

    #[test]
    fn encode_request_produces_a_frame_that_decodes_cleanly() {
        let mut out = [0u8; 13];
        let body = 0x0800_2000u32.to_le_bytes();
        let len = encode_request(&mut out, CommandId::GotoAddr as u8, &body);

        assert_eq!(len, 13);
        match decode(&out[..len], 1512).unwrap() {
            Command::GotoAddr { address } => assert_eq!(address, 0x0800_2000),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn encode_response_sets_cmd_id_and_data() {
        let mut out = [0u8; 16];
        let len = encode_response(&mut out, &[0x01]);

        assert_eq!(len, Header::SIZE + 1);
        let header = Header::decode(&out);
        assert_eq!(header.cmd_id, CommandId::Response as u8);
        assert_eq!(out[Header::SIZE], 0x01);
    }
}
