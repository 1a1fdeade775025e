// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! The bootloader's one piece of shared mutable state.
//!
//! Modeled as an explicit, owned value created once at startup and
//! threaded through the state machine and handlers by `&mut`, rather
//! than as a `static mut` the way an embedded `BL_Context_t bl_ctx`
//! singleton is often declared. `mode` is the single field the
//! receive-interrupt callback publishes; it is stored in an
//! `AtomicU8` so the state machine's busy-wait observes the ISR's
//! write under a defined memory ordering.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::config::MAX_BUFFER_SIZE;

/// Top-level bootloader mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Init = 0,
    ReceiveCommand = 1,
    CommandMode = 2,
    Default = 3,
}

impl Mode {
    fn from_u8(v: u8) -> Mode {
        match v {
            0 => Mode::Init,
            1 => Mode::ReceiveCommand,
            2 => Mode::CommandMode,
            _ => Mode::Default,
        }
    }
}

/// Process-wide bootloader state.
///
/// `mode` is read/written through `AtomicU8` because it is the one
/// field written from the receive-interrupt callback path; every
/// other field is touched only from the main state-machine/handler
/// path and needs no synchronization.
pub struct BootContext {
    mode: AtomicU8,
    /// Working address set by GOTO_ADDR.
    pub current_address: u32,
    pub app_start: u32,
    pub app_end: u32,
    pub app_len: u32,
    pub bl_start: u32,
    pub bl_end: u32,
    pub flash_start: u32,
    pub flash_end: u32,
    /// Command receive buffer, large enough for the worst-case frame:
    /// a DATA_PACKET (header + 1024 data bytes + 9 bytes of streaming
    /// metadata).
    pub command_buffer: [u8; MAX_BUFFER_SIZE],
}

impl BootContext {
    /// Create a new, zero-initialized context for the given memory
    /// layout. Call once at startup.
    pub fn new(app_start: u32, app_end: u32, app_len: u32, bl_start: u32, bl_end: u32, flash_start: u32, flash_end: u32) -> Self {
        Self {
            mode: AtomicU8::new(Mode::Init as u8),
            current_address: 0,
            app_start,
            app_end,
            app_len,
            bl_start,
            bl_end,
            flash_start,
            flash_end,
            command_buffer: [0u8; MAX_BUFFER_SIZE],
        }
    }

    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.mode.load(Ordering::Acquire))
    }

    pub fn set_mode(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;

    fn ctx() -> BootContext {
        BootContext::new(APP_START, APP_END, APP_LEN, BL_START, BL_END, FLASH_START, FLASH_END)
    }

    #[test]
    fn starts_in_init_mode() {
        assert_eq!(ctx().mode(), Mode::Init);
    }

    #[test]
    fn command_buffer_starts_zeroed() {
        assert!(ctx().command_buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn set_mode_is_visible_through_shared_reference() {
        let c = ctx();
        let observer: &BootContext = &c;
        c.set_mode(Mode::CommandMode);
        assert_eq!(observer.mode(), Mode::CommandMode);
    }

    #[test]
    fn current_address_defaults_to_zero() {
        assert_eq!(ctx().current_address, 0);
    }
}
