// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Diagnostic logging shim.
//!
//! `bootcore` is linked both into `bootloader-fw` (where `defmt` is
//! available and wired to RTT) and into host-side unit tests (where it
//! isn't). These macros collapse to no-ops when the `defmt` feature is
//! off, so the core stays dependency-free for host builds.

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub(crate) use debug;
