// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Internal error taxonomy. Handlers translate these into NACK bits
//! on the wire; the variants themselves never cross the wire.

/// Internal error kinds surfaced by the core. `no_std`-friendly: no
/// heap, no `std::error::Error` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A `Platform` send/receive call failed or timed out.
    Transport,
    /// A frame's recomputed CRC did not match its header field.
    Crc,
    /// A requested address or range violated the region policy.
    Range,
    /// The external flash erase/write primitive reported failure.
    FlashOp,
    /// Unknown command id, or `payload_size` out of bounds for it.
    Protocol,
}
