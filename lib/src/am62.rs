// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The GPIO register map of the TI AM62x SoCs.
//!
//! For more information see the GPIO chapter of the [AM62x Technical Reference Manual].
//!
//! [AM62x Technical Reference Manual]: https://www.ti.com/lit/pdf/spruiv7

use crate::register::{Bit, Register};

/// The physical base address of the GPIO0 controller.
pub const GPIO0_BASE: u64 = 0x0060_0000;

/// The registers controlling a pair of GPIO banks.
///
/// Each register holds one bit per line, with the lower bank in bits 0..16
/// and the upper bank in bits 16..32.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bank {
    /// Direction - a set bit selects input, a cleared bit selects output.
    pub dir: Register,
    /// The levels being driven on output lines.
    pub out_data: Register,
    /// Write-only. Writing a 1 drives the line high.
    pub set_data: Register,
    /// Write-only. Writing a 1 drives the line low.
    pub clr_data: Register,
    /// The levels read from the lines.
    pub in_data: Register,
}

/// Banks 0 and 1.
pub const BANK01: Bank = Bank {
    dir: Register::new(0x10),
    out_data: Register::new(0x14),
    set_data: Register::new(0x18),
    clr_data: Register::new(0x1c),
    in_data: Register::new(0x20),
};

/// Banks 2 and 3.
pub const BANK23: Bank = Bank {
    dir: Register::new(0x38),
    out_data: Register::new(0x3c),
    set_data: Register::new(0x40),
    clr_data: Register::new(0x44),
    in_data: Register::new(0x48),
};

/// GPIO0_42 - bank 2, line 10.
///
/// Brought out as GPIO_8_CSI on SODIMM_222 of the Verdin AM62.
pub const GPIO0_42: Bit = Bit::new(10);
