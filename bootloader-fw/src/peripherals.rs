// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Peripheral initialization for the bootloader.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use fugit::RateExtU32;
use rp2040_hal as hal;
use rp2040_hal::gpio::FunctionUart;
use rp2040_hal::uart::{DataBits, StopBits, UartConfig, UartPeripheral};

pub type LedPin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio25, hal::gpio::FunctionSioOutput, hal::gpio::PullDown>;
pub type Gp2Pin =
    hal::gpio::Pin<hal::gpio::bank0::Gpio2, hal::gpio::FunctionSioInput, hal::gpio::PullUp>;

pub type UartPins = (
    hal::gpio::Pin<hal::gpio::bank0::Gpio0, FunctionUart, hal::gpio::PullNone>,
    hal::gpio::Pin<hal::gpio::bank0::Gpio1, FunctionUart, hal::gpio::PullNone>,
);
pub type Uart = UartPeripheral<hal::uart::Enabled, hal::pac::UART0, UartPins>;

/// Host link baud rate; the host tool opens its `serialport` handle
/// at the same fixed rate.
const UART_BAUD_RATE: u32 = 115_200;

pub struct Peripherals {
    pub led_pin: LedPin,
    pub gp2: Gp2Pin,
    pub timer: hal::Timer,
    pub uart: Uart,
}

pub fn init() -> Peripherals {
    let mut pac = unsafe { hal::pac::Peripherals::steal() };

    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);
    let clocks = hal::clocks::init_clocks_and_plls(
        12_000_000u32,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .unwrap();

    let timer = hal::Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let sio = hal::Sio::new(pac.SIO);
    let pins = hal::gpio::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let uart_pins = (
        pins.gpio0.into_function::<FunctionUart>(),
        pins.gpio1.into_function::<FunctionUart>(),
    );
    let uart = UartPeripheral::new(pac.UART0, uart_pins, &mut pac.RESETS)
        .enable(
            UartConfig::new(UART_BAUD_RATE.Hz(), DataBits::Eight, None, StopBits::One),
            clocks.peripheral_clock.freq(),
        )
        .unwrap();

    Peripherals {
        led_pin: pins.gpio25.into_push_pull_output(),
        gp2: pins.gpio2.into_pull_up_input(),
        timer,
        uart,
    }
}

/// Toggle the status LED a few times. Standalone now that this crate
/// no longer pulls in a shared helper crate for it.
pub fn blink<P: OutputPin>(led: &mut P, timer: &mut hal::Timer, times: u32) {
    for _ in 0..times {
        let _ = led.set_high();
        timer.delay_ms(100);
        let _ = led.set_low();
        timer.delay_ms(100);
    }
}
