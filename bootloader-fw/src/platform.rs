// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! `bootcore::Platform` implementation against `rp2040-hal`: UART0 for
//! the host link, the RP2040 ROM flash routines via [`crate::flash`],
//! and on-board LED/button GPIO.
//!
//! Mirrors the separation drawn elsewhere in this codebase between a
//! USB CDC transport and the `boot`/`flash` modules, but behind a
//! single trait impl instead of free functions called directly from
//! `main`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use rp2040_hal::Timer;

use bootcore::error::Error;
use bootcore::platform::Platform;

use crate::flash;
use crate::layout::MemoryLayout;
use crate::peripherals::{Gp2Pin, LedPin, Uart};

pub struct RpPlatform {
    uart: Uart,
    led: LedPin,
    button: Gp2Pin,
    timer: Timer,
    flash_base: u32,
}

impl RpPlatform {
    pub fn new(uart: Uart, led: LedPin, button: Gp2Pin, timer: Timer, layout: &MemoryLayout) -> Self {
        Self {
            uart,
            led,
            button,
            timer,
            flash_base: layout.flash_start,
        }
    }

    fn deadline_us(&self, timeout_ms: u32) -> u64 {
        self.timer.get_counter().ticks() + (timeout_ms as u64) * 1000
    }

    fn now_us(&self) -> u64 {
        self.timer.get_counter().ticks()
    }
}

impl Platform for RpPlatform {
    fn send(&mut self, buf: &[u8], _timeout_ms: u32) -> Result<(), Error> {
        self.uart
            .write_full_blocking(buf);
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<(), Error> {
        let deadline = self.deadline_us(timeout_ms);
        let mut filled = 0usize;
        while filled < buf.len() {
            if self.now_us() >= deadline {
                return Err(Error::Transport);
            }
            match self.uart.read_raw(&mut buf[filled..filled + 1]) {
                Ok(n) => filled += n,
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(_)) => return Err(Error::Transport),
            }
        }
        Ok(())
    }

    fn wait_for_sync(&mut self, sync_byte: u8, coarse_timeout_ms: u32) -> bool {
        let deadline = self.deadline_us(coarse_timeout_ms);
        let mut byte = [0u8; 1];
        while self.now_us() < deadline {
            match self.uart.read_raw(&mut byte) {
                Ok(1) if byte[0] == sync_byte => return true,
                _ => continue,
            }
        }
        false
    }

    fn delay(&mut self, ms: u32) {
        self.timer.delay_ms(ms);
    }

    fn erase_flash(&mut self, page_address: u32, page_count: u32) -> Result<(), Error> {
        unsafe {
            flash::erase(self.flash_base, page_address, page_count);
        }
        Ok(())
    }

    fn flash_write(&mut self, address: u32, data: &[u8]) -> Result<(), Error> {
        unsafe {
            flash::program(self.flash_base, address, data);
        }
        Ok(())
    }

    fn flash_read(&self, address: u32, buf: &mut [u8]) {
        flash::read(address, buf);
    }

    fn init_led(&mut self) {
        let _ = self.led.set_low();
    }

    fn set_led(&mut self, on: bool) {
        if on {
            let _ = self.led.set_high();
        } else {
            let _ = self.led.set_low();
        }
    }

    fn init_button(&mut self) {}

    fn get_button_state(&mut self) -> bool {
        self.button.is_low().unwrap_or(false)
    }

    fn init_comm(&mut self) {
        flash::init();
    }
}
