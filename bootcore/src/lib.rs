// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Core of a host-driven firmware bootloader: framing, CRC, region
//! safety policy, command handlers and the top-level state machine.
//!
//! This crate is `no_std` by default so it runs on the target MCU; the
//! `std` feature is enabled for host-side unit tests, where the
//! `Platform` trait is implemented by an in-memory fake instead of
//! real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod config;
pub mod context;
pub mod crc;
pub mod error;
pub mod handlers;
pub mod image;
mod log;
pub mod platform;
pub mod protocol;
pub mod region;
pub mod state_machine;

pub use context::{BootContext, Mode};
pub use error::Error;
pub use platform::Platform;
pub use protocol::Command;
