// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Memory layout read from the linker script: flash bounds, the
//! bootloader's own region, and the application region, all supplied
//! by the link stage rather than compiled in.
//!
//! Mirrors the firmware's `MemoryLayout::from_linker` pattern of
//! reading `__fw_a_entry` etc. via `unsafe extern "C"` statics, but for
//! a single-application layout: bootloader region, flash bounds, and
//! one application region instead of two firmware banks.

unsafe extern "C" {
    static __flash_start: u32;
    static __flash_end: u32;
    static __bl_start: u32;
    static __bl_end: u32;
    static __app_start: u32;
    static __app_end: u32;
}

macro_rules! linker_addr {
    ($sym:ident) => {
        unsafe { &$sym as *const u32 as u32 }
    };
}

/// Flash address bounds and region split, resolved from `memory.x`
/// symbols at startup rather than compiled-in constants.
pub struct MemoryLayout {
    pub flash_start: u32,
    pub flash_end: u32,
    pub bl_start: u32,
    pub bl_end: u32,
    pub app_start: u32,
    pub app_end: u32,
    pub app_len: u32,
}

impl MemoryLayout {
    pub fn from_linker() -> Self {
        let app_start = linker_addr!(__app_start);
        let app_end = linker_addr!(__app_end);
        Self {
            flash_start: linker_addr!(__flash_start),
            flash_end: linker_addr!(__flash_end),
            bl_start: linker_addr!(__bl_start),
            bl_end: linker_addr!(__bl_end),
            app_start,
            app_end,
            app_len: app_end - app_start + 1,
        }
    }
}
