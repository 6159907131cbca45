// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::period::{Clock, Period, Timestamp};
use crate::pin::{Level, OutputPin};
use crate::register::RegisterBlock;
use crate::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// The default time the line is held at each level - half the toggle cycle.
pub const DEFAULT_HALF_PERIOD: Duration = Duration::from_millis(500);

/// A flag used to request that a [`Toggler`] stop.
///
/// Clones share the same flag, so one clone can be handed to a signal
/// handler while another is held by the toggler.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Create a token that has not been stopped.
    pub fn new() -> StopToken {
        StopToken::default()
    }

    /// Request a stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check if a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A change in the level of the toggled line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Transition {
    /// The level the line was driven to.
    pub level: Level,
    /// The deadline at which the line was scheduled to change.
    pub at: Timestamp,
    /// The deadline at which the line will next change.
    pub deadline: Timestamp,
}

type Observer = Box<dyn FnMut(&Transition) + Send>;

/// Toggles an output line with a fixed period.
///
/// Each level is held until an absolute deadline, and the deadlines are
/// advanced by exactly one half period each transition, so the time taken
/// to drive the line does not accumulate as drift.
///
/// ```no_run
/// # fn example() -> gpiommio::Result<()> {
/// use gpiommio::am62::{BANK23, GPIO0_42};
/// use gpiommio::{Mapping, MonotonicClock, OutputPin, Toggler, DEFAULT_HALF_PERIOD};
///
/// let pin = OutputPin::new(Mapping::new()?, BANK23, GPIO0_42);
/// let mut toggler = Toggler::new(pin, MonotonicClock, DEFAULT_HALF_PERIOD)?;
/// toggler.run_cycles(10)?;
/// # Ok(())
/// # }
/// ```
pub struct Toggler<R: RegisterBlock, C: Clock> {
    pin: OutputPin<R>,
    clock: C,
    half_period: Duration,
    state: Option<Level>,
    stop: StopToken,
    observer: Option<Observer>,
}

impl<R: RegisterBlock, C: Clock> Toggler<R, C> {
    /// Create a toggler that holds each level of the `pin` for `half_period`.
    ///
    /// The `half_period` must be non-zero.
    pub fn new(pin: OutputPin<R>, clock: C, half_period: Duration) -> Result<Self> {
        // validate the period up front rather than on the first run
        Period::new(Timestamp::default(), half_period)?;
        Ok(Toggler {
            pin,
            clock,
            half_period,
            state: None,
            stop: StopToken::new(),
            observer: None,
        })
    }

    /// Use the given token to stop the toggler.
    pub fn with_stop_token(mut self, stop: StopToken) -> Self {
        self.stop = stop;
        self
    }

    /// Call `f` after each transition, before sleeping until the next.
    pub fn on_transition<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Transition) + Send + 'static,
    {
        self.observer = Some(Box::new(f));
        self
    }

    /// A token that stops this toggler.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// The level the line was last driven to, or `None` if it has not been driven.
    pub fn state(&self) -> Option<Level> {
        self.state
    }

    /// The time each level is held.
    pub fn half_period(&self) -> Duration {
        self.half_period
    }

    /// Toggle the line until stopped via the [`StopToken`].
    ///
    /// Never returns if the toggler is never stopped.
    pub fn run(&mut self) -> Result<()> {
        self.run_until(None)
    }

    /// Toggle the line through `cycles` full high and low cycles, or until
    /// stopped via the [`StopToken`].
    pub fn run_cycles(&mut self, cycles: u64) -> Result<()> {
        self.run_until(Some(cycles.saturating_mul(2)))
    }

    /// Release the toggler and return the pin.
    pub fn into_pin(self) -> OutputPin<R> {
        self.pin
    }

    fn run_until(&mut self, limit: Option<u64>) -> Result<()> {
        let res = self.toggle(limit);
        // never leave the line high
        if self.state == Some(Level::High) {
            self.drive(Level::Low);
        }
        res
    }

    fn toggle(&mut self, limit: Option<u64>) -> Result<()> {
        let mut period = Period::new(self.clock.now()?, self.half_period)?;
        let mut transitions = 0u64;
        while !self.stop.is_stopped() && limit.map_or(true, |n| transitions < n) {
            let level = match self.state {
                Some(Level::High) => Level::Low,
                _ => Level::High,
            };
            self.drive(level);
            let at = period.deadline();
            let deadline = period.advance();
            if let Some(f) = self.observer.as_mut() {
                f(&Transition {
                    level,
                    at,
                    deadline,
                });
            }
            self.clock.sleep_until(deadline)?;
            transitions += 1;
        }
        Ok(())
    }

    #[inline]
    fn drive(&mut self, level: Level) {
        self.pin.set_level(level);
        self.state = Some(level);
    }
}

impl<R: RegisterBlock, C: Clock> fmt::Debug for Toggler<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toggler")
            .field("bit", &self.pin.bit())
            .field("half_period", &self.half_period)
            .field("state", &self.state)
            .field("stopped", &self.stop.is_stopped())
            .finish()
    }
}
