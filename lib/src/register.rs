// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// The size of a register block in bytes - one page.
pub const BLOCK_SIZE: usize = 4096;

/// The location of a 32-bit register, as a byte offset into a register block.
///
/// Offsets are checked on construction, so a [`Register`] defined as a
/// constant with an offset that is misaligned or outside the block fails to
/// compile.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Register(usize);

impl Register {
    /// Create a register at the given byte offset.
    ///
    /// # Panics
    ///
    /// If the offset is not 32-bit aligned or the register does not fit in
    /// the block.  In a const context that is a compile error.
    pub const fn new(offset: usize) -> Register {
        assert!(offset % 4 == 0, "register offset must be 32-bit aligned");
        assert!(
            offset + 4 <= BLOCK_SIZE,
            "register must lie within the register block"
        );
        Register(offset)
    }

    /// The byte offset of the register from the start of the block.
    #[inline]
    pub const fn offset(&self) -> usize {
        self.0
    }

    /// The index of the register as a 32-bit word.
    #[inline]
    pub(crate) const fn word(&self) -> usize {
        self.0 / 4
    }
}

/// A single bit within a 32-bit register.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Bit(u8);

impl Bit {
    /// Create a bit with the given index.
    ///
    /// # Panics
    ///
    /// If the index is 32 or more.  In a const context that is a compile error.
    pub const fn new(index: u8) -> Bit {
        assert!(index < 32, "bit index must be less than 32");
        Bit(index)
    }

    /// The index of the bit, 0 being the least significant.
    #[inline]
    pub const fn index(&self) -> u8 {
        self.0
    }

    /// The register value with only this bit set.
    #[inline]
    pub const fn mask(&self) -> u32 {
        1 << self.0
    }
}

/// Access to a block of 32-bit registers.
///
/// Implementations must not cache register contents - every read goes to the
/// backing store, as the hardware may change register contents at any time.
///
/// Accesses take `&self` as the registers are shared with the hardware anyway.
pub trait RegisterBlock {
    /// Read the register.
    fn read(&self, reg: Register) -> u32;

    /// Write the register.
    fn write(&self, reg: Register, value: u32);

    /// Set a single bit in the register, leaving the other bits untouched.
    fn set_bit(&self, reg: Register, bit: Bit) {
        let v = self.read(reg);
        self.write(reg, v | bit.mask());
    }

    /// Clear a single bit in the register, leaving the other bits untouched.
    fn clear_bit(&self, reg: Register, bit: Bit) {
        let v = self.read(reg);
        self.write(reg, v & !bit.mask());
    }

    /// Check if a bit in the register is set.
    fn test_bit(&self, reg: Register, bit: Bit) -> bool {
        self.read(reg) & bit.mask() != 0
    }

    /// Write a mask to a write-only set or clear register.
    ///
    /// Only the bits set in the mask are affected by the hardware, so no
    /// read is required.
    fn assert_bits(&self, reg: Register, mask: u32) {
        self.write(reg, mask);
    }

    /// Configure the pin controlled by `bit` as an output.
    ///
    /// A cleared bit in the direction register selects output.
    fn configure_as_output(&self, dir: Register, bit: Bit) {
        self.clear_bit(dir, bit);
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &T {
    #[inline]
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    #[inline]
    fn write(&self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for Arc<T> {
    #[inline]
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    #[inline]
    fn write(&self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for Box<T> {
    #[inline]
    fn read(&self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    #[inline]
    fn write(&self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

/// A register block held in ordinary memory.
///
/// Stands in for a mapped register block where no hardware is available.
/// Registers behave as plain memory.
#[derive(Debug)]
pub struct MemBlock {
    words: Box<[AtomicU32]>,
}

impl MemBlock {
    /// Create a block with all registers zeroed.
    pub fn new() -> MemBlock {
        MemBlock {
            words: (0..BLOCK_SIZE / 4).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Create a block with the given registers preset and the remainder zeroed.
    pub fn with_values(values: &[(Register, u32)]) -> MemBlock {
        let b = MemBlock::new();
        for (reg, value) in values {
            b.write(*reg, *value);
        }
        b
    }
}

impl Default for MemBlock {
    fn default() -> Self {
        MemBlock::new()
    }
}

impl RegisterBlock for MemBlock {
    #[inline]
    fn read(&self, reg: Register) -> u32 {
        self.words[reg.word()].load(Ordering::SeqCst)
    }

    #[inline]
    fn write(&self, reg: Register, value: u32) {
        self.words[reg.word()].store(value, Ordering::SeqCst)
    }
}
