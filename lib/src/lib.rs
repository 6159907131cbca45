// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library for driving a GPIO line on Linux platforms by mapping the GPIO
//! controller registers via `/dev/mem`.
//!
//! The registers are accessed through the [`RegisterBlock`] trait, which is
//! implemented by the hardware [`Mapping`] as well as by in-memory stand-ins
//! in the [`sim`] module, so everything above the mapping can be exercised
//! without hardware.
//!
//! An [`OutputPin`] configures a line as an output and drives it, and a
//! [`Toggler`] toggles the pin with a fixed period, sleeping until absolute
//! deadlines so the period does not drift.  The toggler can be run on a
//! real-time worker thread created by [`rt::spawn`].
//!
//! Toggling the SODIMM_222 pin of a Verdin AM62:
//! ```no_run
//! # fn main() -> gpiommio::Result<()> {
//! use gpiommio::am62::{BANK23, GPIO0_42};
//! use gpiommio::{rt, Mapping, MonotonicClock, OutputPin, StopToken, Toggler};
//! use std::time::Duration;
//!
//! rt::lock_memory()?;
//! let pin = OutputPin::new(Mapping::new()?, BANK23, GPIO0_42);
//! let stop = StopToken::new();
//! let mut toggler = Toggler::new(pin, MonotonicClock, Duration::from_millis(500))?
//!     .with_stop_token(stop.clone());
//! let worker = rt::spawn(&rt::RtConfig::default(), move || toggler.run())?;
//! worker.join()??;
//! # Ok(())
//! # }
//! ```

use gpiommio_uapi as uapi;
use std::path::PathBuf;

/// The GPIO register map of the TI AM62x.
pub mod am62;

mod mapping;
pub use mapping::Mapping;

mod period;
pub use period::{Clock, MonotonicClock, Period, Timestamp};

mod pin;
pub use pin::{Level, OutputPin};

mod register;
pub use register::{Bit, MemBlock, Register, RegisterBlock, BLOCK_SIZE};

/// Real-time scheduling of the toggling thread.
pub mod rt;

pub mod sim;

mod toggle;
pub use toggle::{StopToken, Toggler, Transition, DEFAULT_HALF_PERIOD};

/// The result for [`gpiommio`] functions.
///
/// [`gpiommio`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`gpiommio`] functions.
///
/// [`gpiommio`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The memory device could not be opened due to insufficient privileges.
    #[error("\"{0}\" permission denied.")]
    PermissionDenied(PathBuf, #[source] uapi::Error),

    /// The memory device could not be opened.
    #[error("\"{0}\" is unavailable.")]
    DeviceUnavailable(PathBuf, #[source] uapi::Error),

    /// The register block could not be mapped.
    #[error("unable to map the register block.")]
    Mapping(#[source] uapi::Error),

    /// The process memory could not be locked.
    #[error("unable to lock memory.")]
    MemoryLock(#[source] uapi::Error),

    /// A step setting up the scheduling attributes failed.
    #[error("unable to {0}.")]
    SchedulingSetup(rt::SchedStep, #[source] uapi::Error),

    /// The worker thread could not be created.
    #[error("unable to create thread.")]
    ThreadCreation(#[source] uapi::Error),

    /// The worker thread could not be joined.
    #[error("unable to join thread: {0}.")]
    ThreadJoin(String),

    /// Reading or sleeping on the clock failed.
    #[error("clock failure.")]
    Clock(#[source] uapi::Error),

    /// An error returned when there is a problem with an argument.
    #[error("{0}")]
    InvalidArgument(String),
}
