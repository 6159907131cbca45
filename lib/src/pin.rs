// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::am62::Bank;
use crate::register::{Bit, RegisterBlock};
use std::fmt;

/// The logical level of a line.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Level {
    /// The line is driven low.
    #[default]
    Low,
    /// The line is driven high.
    High,
}

impl Level {
    /// The opposite level.
    pub fn not(&self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl std::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        Level::not(&self)
    }
}

impl From<bool> for Level {
    fn from(b: bool) -> Self {
        if b {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::High => write!(f, "Active"),
            Level::Low => write!(f, "Inactive"),
        }
    }
}

/// A single line configured as an output.
///
/// Holds the register block the line belongs to, so holding the pin grants
/// access to the registers for as long as it lives.
///
/// The line is switched to output when the pin is created, so it is always
/// an output by the time it is driven.
#[derive(Debug)]
pub struct OutputPin<R: RegisterBlock> {
    regs: R,
    bank: Bank,
    bit: Bit,
}

impl<R: RegisterBlock> OutputPin<R> {
    /// Configure the line `bit` of `bank` as an output and return the pin.
    ///
    /// The level driven by the line is left unchanged.
    pub fn new(regs: R, bank: Bank, bit: Bit) -> Self {
        regs.configure_as_output(bank.dir, bit);
        log::debug!("configured line {} at {:#x} as output", bit.index(), bank.dir.offset());
        OutputPin { regs, bank, bit }
    }

    /// Drive the line high.
    #[inline]
    pub fn set_high(&self) {
        self.regs.assert_bits(self.bank.set_data, self.bit.mask());
    }

    /// Drive the line low.
    #[inline]
    pub fn set_low(&self) {
        self.regs.assert_bits(self.bank.clr_data, self.bit.mask());
    }

    /// Drive the line to the given level.
    pub fn set_level(&self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// The level the line is being driven to, read back from the hardware.
    pub fn level(&self) -> Level {
        self.regs.test_bit(self.bank.out_data, self.bit).into()
    }

    /// Check if the line is being driven high.
    pub fn is_set_high(&self) -> bool {
        self.level() == Level::High
    }

    /// The line controlled by the pin.
    pub fn bit(&self) -> Bit {
        self.bit
    }

    /// The register block containing the line.
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Release the pin and return the register block.
    ///
    /// The line remains an output.
    pub fn into_inner(self) -> R {
        self.regs
    }
}
