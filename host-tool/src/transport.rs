// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Serial transport for the bootloader's wire protocol.

use std::io::{Read, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bootcore::crc::crc32_skip_field;
use bootcore::protocol::{encode_request, Ack, Header};
use serialport::SerialPort;

/// Default timeout for serial operations in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// The bootloader's fixed host-link baud rate.
const BAUD_RATE: u32 = 115_200;

/// A connection to a device running the bootloader, one command-mode
/// session per `Transport`: [`Transport::new`] performs the sync
/// handshake before returning.
pub struct Transport {
    port: Box<dyn SerialPort>,
}

impl Transport {
    /// Open `port_name` and perform the out-of-band sync handshake.
    pub fn new(port_name: &str) -> Result<Self> {
        let port = serialport::new(port_name, BAUD_RATE)
            .timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
            .open()
            .with_context(|| format!("failed to open serial port {}", port_name))?;

        let mut transport = Self { port };
        transport.sync()?;
        Ok(transport)
    }

    /// Get the port name.
    pub fn port_name(&self) -> String {
        self.port.name().unwrap_or_else(|| "?".to_string())
    }

    fn sync(&mut self) -> Result<()> {
        self.port
            .write_all(&[bootcore::config::SYNC_BYTE])
            .context("failed to send sync byte")?;
        self.port.flush()?;

        let mut echo = [0u8; 1];
        self.read_exact_timeout(&mut echo, DEFAULT_TIMEOUT_MS)
            .context("timed out waiting for the bootloader's sync echo")?;
        if echo[0] != bootcore::config::SYNC_BYTE {
            bail!("unexpected sync echo: {:#04x}", echo[0]);
        }
        Ok(())
    }

    fn read_exact_timeout(&mut self, buf: &mut [u8], timeout_ms: u64) -> Result<()> {
        let old_timeout = self.port.timeout();
        self.port.set_timeout(Duration::from_millis(timeout_ms))?;
        let result = self
            .port
            .read_exact(buf)
            .map_err(|e| anyhow::anyhow!("serial read error: {}", e));
        let _ = self.port.set_timeout(old_timeout);
        result
    }

    /// Build and send a command frame for `cmd_id` with `body` as its
    /// fields (already laid out little-endian).
    pub fn send_command(&mut self, cmd_id: u8, body: &[u8]) -> Result<()> {
        let mut buf = [0u8; bootcore::config::MAX_BUFFER_SIZE];
        let len = encode_request(&mut buf, cmd_id, body);
        self.port
            .write_all(&buf[..len])
            .context("failed to write command frame")?;
        self.port.flush()?;
        Ok(())
    }

    /// Receive and validate a 3-byte ACK frame.
    pub fn recv_ack(&mut self) -> Result<Ack> {
        let mut buf = [0u8; Ack::SIZE];
        self.read_exact_timeout(&mut buf, DEFAULT_TIMEOUT_MS)
            .context("timed out waiting for ACK")?;
        Ack::decode(&buf).ok_or_else(|| anyhow::anyhow!("malformed ACK frame"))
    }

    /// Receive an ACK, with a longer timeout (for long-running
    /// operations like FLASH_ERASE).
    pub fn recv_ack_timeout(&mut self, timeout_ms: u64) -> Result<Ack> {
        let mut buf = [0u8; Ack::SIZE];
        self.read_exact_timeout(&mut buf, timeout_ms)
            .context("timed out waiting for ACK")?;
        Ack::decode(&buf).ok_or_else(|| anyhow::anyhow!("malformed ACK frame"))
    }

    /// Like [`Transport::recv_ack`], but returns `Ok(None)` instead of
    /// erroring out on a timeout. Used where the device only sends a
    /// second ACK conditionally (GOTO_ADDR's address-rejection ack).
    pub fn try_recv_ack(&mut self, timeout_ms: u64) -> Result<Option<Ack>> {
        let mut buf = [0u8; Ack::SIZE];
        match self.read_exact_timeout(&mut buf, timeout_ms) {
            Ok(()) => Ok(Ack::decode(&buf)),
            Err(_) => Ok(None),
        }
    }

    /// Receive a full header + body frame (9-byte header, then
    /// `payload_size - 9` more bytes), returning just the body.
    pub fn recv_frame(&mut self) -> Result<Vec<u8>> {
        let mut buf = [0u8; bootcore::config::MAX_BUFFER_SIZE];
        self.read_exact_timeout(&mut buf[..Header::SIZE], DEFAULT_TIMEOUT_MS)
            .context("timed out waiting for a response header")?;

        let header = Header::decode(&buf);
        let payload_size = header.payload_size as usize;
        if payload_size < Header::SIZE || payload_size > buf.len() {
            bail!("response header has an implausible payload_size: {}", payload_size);
        }

        self.read_exact_timeout(&mut buf[Header::SIZE..payload_size], DEFAULT_TIMEOUT_MS)
            .context("timed out waiting for a response body")?;

        if crc32_skip_field(&buf[..payload_size], Header::CRC_OFFSET) != header.crc32 {
            bail!("response frame failed its CRC check");
        }

        Ok(buf[Header::SIZE..payload_size].to_vec())
    }

    /// Send a RESPONSE/DATA_PACKET-style ACK back to the device (the
    /// device expects a well-formed ACK frame, `cmd_id = ACK`, after
    /// each DATA_PACKET it sends during MEM_READ).
    pub fn send_ack(&mut self) -> Result<()> {
        let frame = Ack {
            cmd_id: bootcore::protocol::CommandId::Ack as u8,
            ack: true,
            nack_field: bootcore::protocol::nack::SUCCESS,
        }
        .encode();
        self.port.write_all(&frame).context("failed to send ACK")?;
        self.port.flush()?;
        Ok(())
    }
}
