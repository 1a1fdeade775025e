// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Host-side tool for the bootloader's wire protocol.
//!
//! Usage:
//!   host-tool --port /dev/ttyACM0 version
//!   host-tool --port /dev/ttyACM0 write firmware.bin --address 0x08002000
//!   host-tool --port /dev/ttyACM0 jump-to-app

mod cli;
mod commands;
mod transport;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args)
}
