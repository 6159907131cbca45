// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stand-ins for the GPIO controller and the monotonic clock, allowing
//! toggling to be exercised without hardware or without waiting.

use crate::am62::{Bank, BANK01, BANK23};
use crate::period::{Clock, Timestamp};
use crate::pin::Level;
use crate::register::{Bit, MemBlock, Register, RegisterBlock};
use crate::Result;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A simulated GPIO controller.
///
/// Behaves as plain memory except for the data registers of its banks:
///  - writing a mask to `set_data` sets those bits in `out_data`,
///  - writing a mask to `clr_data` clears those bits in `out_data`,
///  - `set_data` and `clr_data` are write-only and read back as zero.
///
/// Every change to an `out_data` register is recorded, so the sequence of
/// levels driven on a line can be inspected.
#[derive(Debug)]
pub struct SimulatedBank {
    block: MemBlock,
    banks: Vec<Bank>,
    // out_data register and value after each change
    history: Mutex<Vec<(Register, u32)>>,
}

impl SimulatedBank {
    /// Create a controller with the AM62x banks and all registers zeroed.
    pub fn new() -> SimulatedBank {
        SimulatedBank::with_banks(&[BANK01, BANK23])
    }

    /// Create a controller with the given banks and all registers zeroed.
    pub fn with_banks(banks: &[Bank]) -> SimulatedBank {
        SimulatedBank {
            block: MemBlock::new(),
            banks: banks.to_vec(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// The levels driven on a line, in order, one entry per change of level.
    ///
    /// The initial level, before any change, is not included.
    pub fn levels(&self, bank: Bank, bit: Bit) -> Vec<Level> {
        // registers start zeroed
        let mut last = Level::Low;
        let mut levels = Vec::new();
        for (reg, value) in self.lock().iter() {
            if *reg != bank.out_data {
                continue;
            }
            let level = Level::from(value & bit.mask() != 0);
            if level != last {
                levels.push(level);
                last = level;
            }
        }
        levels
    }

    /// The number of changes recorded to the `out_data` registers.
    pub fn changes(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(Register, u32)>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update_out(&self, history: &mut Vec<(Register, u32)>, reg: Register, value: u32) {
        if self.block.read(reg) != value {
            self.block.write(reg, value);
            history.push((reg, value));
        }
    }
}

impl Default for SimulatedBank {
    fn default() -> Self {
        SimulatedBank::new()
    }
}

impl RegisterBlock for SimulatedBank {
    fn read(&self, reg: Register) -> u32 {
        if self
            .banks
            .iter()
            .any(|b| reg == b.set_data || reg == b.clr_data)
        {
            return 0;
        }
        self.block.read(reg)
    }

    fn write(&self, reg: Register, value: u32) {
        // held across the read-modify-write of out_data
        let mut history = self.lock();
        for b in self.banks.iter() {
            if reg == b.set_data {
                let out = self.block.read(b.out_data) | value;
                return self.update_out(&mut history, b.out_data, out);
            }
            if reg == b.clr_data {
                let out = self.block.read(b.out_data) & !value;
                return self.update_out(&mut history, b.out_data, out);
            }
            if reg == b.out_data {
                return self.update_out(&mut history, reg, value);
            }
        }
        self.block.write(reg, value);
    }
}

/// A simulated monotonic clock.
///
/// Sleeping returns immediately, moving the simulated time forward to the
/// deadline.  Each sleep is first charged a fixed amount of simulated work,
/// standing in for the time spent between deadlines.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now: Timestamp,
    work: Duration,
    deadlines: Vec<Timestamp>,
    overruns: usize,
}

impl SimClock {
    /// Create a clock starting at zero.
    pub fn new() -> SimClock {
        SimClock::default()
    }

    /// Create a clock starting at the given time.
    pub fn starting_at(now: Timestamp) -> SimClock {
        SimClock {
            now,
            ..Default::default()
        }
    }

    /// Charge `work` of simulated time before each sleep.
    pub fn with_work(mut self, work: Duration) -> SimClock {
        self.work = work;
        self
    }

    /// The deadlines slept until, in order.
    pub fn deadlines(&self) -> &[Timestamp] {
        &self.deadlines
    }

    /// The number of deadlines that had already passed when slept until.
    pub fn overruns(&self) -> usize {
        self.overruns
    }
}

impl Clock for SimClock {
    fn now(&mut self) -> Result<Timestamp> {
        Ok(self.now)
    }

    fn sleep_until(&mut self, deadline: Timestamp) -> Result<()> {
        self.now.add_nanos(self.work.as_nanos() as u64);
        self.deadlines.push(deadline);
        if self.now < deadline {
            self.now = deadline;
        } else {
            self.overruns += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::am62::GPIO0_42;

    #[test]
    fn set_and_clear_drive_out_data() {
        let s = SimulatedBank::new();
        s.assert_bits(BANK23.set_data, 0x400);
        assert_eq!(s.read(BANK23.out_data), 0x400);
        s.assert_bits(BANK23.set_data, 0x1);
        assert_eq!(s.read(BANK23.out_data), 0x401);
        s.assert_bits(BANK23.clr_data, 0x400);
        assert_eq!(s.read(BANK23.out_data), 0x1);
        // banks are independent
        assert_eq!(s.read(BANK01.out_data), 0);
    }

    #[test]
    fn set_and_clear_read_as_zero() {
        let s = SimulatedBank::new();
        s.assert_bits(BANK23.set_data, 0x400);
        assert_eq!(s.read(BANK23.set_data), 0);
        assert_eq!(s.read(BANK23.clr_data), 0);
    }

    #[test]
    fn other_registers_are_memory() {
        let s = SimulatedBank::new();
        s.write(BANK23.dir, 0xffff_ffff);
        s.configure_as_output(BANK23.dir, GPIO0_42);
        assert_eq!(s.read(BANK23.dir), 0xffff_fbff);
        assert_eq!(s.changes(), 0);
    }

    #[test]
    fn levels_record_changes_only() {
        let s = SimulatedBank::new();
        s.assert_bits(BANK23.set_data, 0x400);
        s.assert_bits(BANK23.set_data, 0x400);
        s.assert_bits(BANK23.set_data, 0x1);
        s.assert_bits(BANK23.clr_data, 0x400);
        s.assert_bits(BANK23.set_data, 0x400);
        assert_eq!(s.changes(), 4);
        assert_eq!(
            s.levels(BANK23, GPIO0_42),
            vec![Level::High, Level::Low, Level::High]
        );
        assert_eq!(s.levels(BANK23, Bit::new(0)), vec![Level::High]);
        assert!(s.levels(BANK01, GPIO0_42).is_empty());
    }

    #[test]
    fn sim_clock_sleeps_to_deadline() {
        let mut c = SimClock::starting_at(Timestamp::new(10, 0));
        assert_eq!(c.now().unwrap(), Timestamp::new(10, 0));
        c.sleep_until(Timestamp::new(10, 500_000_000)).unwrap();
        assert_eq!(c.now().unwrap(), Timestamp::new(10, 500_000_000));
        assert_eq!(c.deadlines(), &[Timestamp::new(10, 500_000_000)]);
        assert_eq!(c.overruns(), 0);
    }

    #[test]
    fn sim_clock_overrun() {
        let mut c = SimClock::new().with_work(Duration::from_millis(700));
        c.sleep_until(Timestamp::new(0, 500_000_000)).unwrap();
        assert_eq!(c.overruns(), 1);
        assert_eq!(c.now().unwrap(), Timestamp::new(0, 700_000_000));
        c.sleep_until(Timestamp::new(1, 500_000_000)).unwrap();
        assert_eq!(c.overruns(), 1);
        assert_eq!(c.now().unwrap(), Timestamp::new(1, 500_000_000));
    }
}
