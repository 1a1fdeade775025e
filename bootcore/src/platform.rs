// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! External collaborators the core consumes but does not implement:
//! byte-serial I/O, the coarse command timeout, flash erase/write/
//! read, and LED/button GPIO.
//!
//! `bootloader-fw` implements this trait against `rp2040-hal`; host
//! tests implement it against an in-memory fake so the state machine
//! and handlers in this crate are fully testable without hardware.

use crate::error::Error;

/// The bootloader's view of its hardware/host-link collaborators.
pub trait Platform {
    /// Send `buf`, blocking up to `timeout_ms`.
    fn send(&mut self, buf: &[u8], timeout_ms: u32) -> Result<(), Error>;

    /// Blocking receive of exactly `buf.len()` bytes, up to
    /// `timeout_ms`.
    fn receive(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<(), Error>;

    /// Wait for `sync_byte` on the link, or for `coarse_timeout_ms` to
    /// elapse, whichever comes first.
    ///
    /// Collapses the source's pair of racing ISRs (a byte-arrival
    /// interrupt re-armed on every mismatched byte, and a coarse
    /// timer) into a single blocking call: the implementation is free
    /// to realize it with real interrupts or by polling, as long as it
    /// returns `true` as soon as `sync_byte` is seen and `false` once
    /// the timeout elapses without it. The caller (`state_machine`)
    /// echoes `sync_byte` back itself on a `true` return, keeping
    /// every `send` on the main-loop path rather than inside a
    /// callback.
    fn wait_for_sync(&mut self, sync_byte: u8, coarse_timeout_ms: u32) -> bool;

    /// Busy/blocking delay.
    fn delay(&mut self, ms: u32);

    /// Erase `page_count` pages starting at `page_address`.
    fn erase_flash(&mut self, page_address: u32, page_count: u32) -> Result<(), Error>;

    /// Program `data` starting at `address`.
    fn flash_write(&mut self, address: u32, data: &[u8]) -> Result<(), Error>;

    /// Read `buf.len()` bytes from memory-mapped flash starting at
    /// `address`.
    fn flash_read(&self, address: u32, buf: &mut [u8]);

    fn init_led(&mut self);
    fn set_led(&mut self, on: bool);
    fn init_button(&mut self);
    fn get_button_state(&mut self) -> bool;
    fn init_comm(&mut self);
}
