// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;
use crate::transport::Transport;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "host-tool")]
#[command(about = "Host-side tool for the bootloader's wire protocol")]
pub struct Cli {
    /// Serial port (e.g., /dev/ttyACM0)
    #[arg(short, long)]
    pub port: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Query the bootloader version (VERSION)
    Version,

    /// Set the device's working address (GOTO_ADDR)
    Goto {
        /// Target address, e.g. 0x08002000
        #[arg(value_parser = parse_u32)]
        address: u32,
    },

    /// Write a file to flash starting at an address (MEM_WRITE)
    Write {
        /// Firmware binary file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Destination address, e.g. 0x08002000
        #[arg(short, long, value_parser = parse_u32)]
        address: u32,
    },

    /// Read a region of flash into a file (MEM_READ)
    Read {
        /// Source address, e.g. 0x08002000
        #[arg(short, long, value_parser = parse_u32)]
        address: u32,

        /// Number of bytes to read
        #[arg(short, long)]
        length: u32,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Erase one or more flash pages (FLASH_ERASE)
    Erase {
        /// Page-aligned address, e.g. 0x08002000
        #[arg(short, long, value_parser = parse_u32)]
        address: u32,

        /// Number of pages to erase
        #[arg(short, long, default_value = "1")]
        pages: u32,
    },

    /// Re-arm the command-mode timeout (ENTER_CMD_MODE)
    EnterCmdMode,

    /// Launch the application (JUMP_TO_APP)
    JumpToApp,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let (s, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    u32::from_str_radix(s, radix).map_err(|e| e.to_string())
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    let mut transport = Transport::new(&cli.port)?;

    match cli.command {
        Commands::Version => commands::version(&mut transport),
        Commands::Goto { address } => commands::goto(&mut transport, address),
        Commands::Write { file, address } => commands::write(&mut transport, &file, address),
        Commands::Read { address, length, out } => commands::read(&mut transport, address, length, &out),
        Commands::Erase { address, pages } => commands::erase(&mut transport, address, pages),
        Commands::EnterCmdMode => commands::enter_cmd_mode(&mut transport),
        Commands::JumpToApp => commands::jump_to_app(&mut transport),
    }
}
