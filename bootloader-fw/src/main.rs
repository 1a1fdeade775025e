// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! On-device bootloader entry point for RP2040: a host-driven binary
//! command protocol for inspecting and updating a single application
//! region of flash over a UART link.

#![no_std]
#![no_main]

mod boot;
mod flash;
mod layout;
mod peripherals;
mod platform;

use defmt_rtt as _;
use panic_probe as _;

defmt::timestamp!("{=u64:us}", { 0 });

use cortex_m_rt::entry;

#[unsafe(link_section = ".boot2")]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

#[entry]
fn main() -> ! {
    defmt::println!("Bootloader init");

    let mut p = peripherals::init();
    peripherals::blink(&mut p.led_pin, &mut p.timer, 3);

    let layout = layout::MemoryLayout::from_linker();

    let mut ctx = bootcore::context::BootContext::new(
        layout.app_start,
        layout.app_end,
        layout.app_len,
        layout.bl_start,
        layout.bl_end,
        layout.flash_start,
        layout.flash_end,
    );

    let mut rp_platform =
        platform::RpPlatform::new(p.uart, p.led_pin, p.gp2, p.timer, &layout);
    let mut launcher = boot::RpLauncher;

    bootcore::state_machine::run(&mut ctx, &mut rp_platform, &mut launcher);
}
