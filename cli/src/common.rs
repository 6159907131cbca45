// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use chrono::{DateTime, Local, TimeDelta, Utc};
use clap::Parser;
use gpiommio::rt::SchedStep;
use gpiommio::{Clock, MonotonicClock, Timestamp};
use std::time::Duration;

// common helper functions

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseDurationError {
    #[error("'{0}' unknown units - use 's', 'ms' or 'us'.")]
    Units(String),
    #[error("'{0}' must start with a digit")]
    NoDigits(String),
    #[error("'{0}' {1}")]
    ParseDigits(String, std::num::ParseIntError),
    #[error("'{0}' must be greater than zero")]
    Zero(String),
    #[error("'{0}' is too long")]
    Overflow(String),
}

pub fn parse_duration(s: &str) -> std::result::Result<Duration, ParseDurationError> {
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    let (num, scale) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(0) => return Err(ParseDurationError::NoDigits(s.into())),
        Some(n) => {
            let (num, units) = s.split_at(n);
            let scale: u64 = match units {
                "us" => 1000,
                "ms" => 1000000,
                "s" => 1000000000,
                _ => return Err(ParseDurationError::Units(s.into())),
            };
            (num, scale)
        }
        None => (s, 1000000),
    };
    let t = num
        .parse::<u64>()
        .map_err(|e| ParseDurationError::ParseDigits(num.into(), e))?
        .checked_mul(scale)
        .ok_or_else(|| ParseDurationError::Overflow(s.into()))?;
    Ok(Duration::from_nanos(t))
}

pub fn parse_period(s: &str) -> std::result::Result<Duration, ParseDurationError> {
    let d = parse_duration(s)?;
    if d.is_zero() {
        return Err(ParseDurationError::Zero(s.into()));
    }
    Ok(d)
}

// common command line parser options

#[derive(Clone, Copy, Debug, Default, Parser)]
pub struct EmitOpts {
    /// Provide more detailed error messages and debug logging.
    #[arg(short = 'v', long, display_order = 800)]
    pub verbose: bool,

    /// Don't display the level transitions.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Format transition timestamps as local time.
    #[arg(long, group = "timefmt")]
    pub localtime: bool,

    /// Format transition timestamps as UTC.
    #[arg(long, group = "timefmt")]
    pub utc: bool,
}

impl EmitOpts {
    pub fn timefmt(&self) -> TimeFmt {
        if self.localtime {
            TimeFmt::Localtime
        } else if self.utc {
            TimeFmt::Utc
        } else {
            TimeFmt::Seconds
        }
    }
}

pub fn emit_error(opts: &EmitOpts, e: &anyhow::Error) {
    eprintln!("{}", format_error(opts, e));
}

pub fn format_error(opts: &EmitOpts, e: &anyhow::Error) -> String {
    if opts.verbose {
        format!("{e:#}")
    } else {
        format!("{e}")
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TimeFmt {
    Seconds,
    Localtime,
    Utc,
}

/// Relates monotonic timestamps to the wall clock.
///
/// Captured once, so wall clock steps after capture do not disturb the
/// spacing of the formatted times.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    mono: Timestamp,
    wall: DateTime<Utc>,
}

impl WallClock {
    pub fn new(mono: Timestamp, wall: DateTime<Utc>) -> WallClock {
        WallClock { mono, wall }
    }

    pub fn now() -> gpiommio::Result<WallClock> {
        let mono = MonotonicClock.now()?;
        Ok(WallClock::new(mono, Utc::now()))
    }

    /// The wall clock time corresponding to the monotonic `ts`.
    pub fn to_utc(&self, ts: &Timestamp) -> DateTime<Utc> {
        let delta = ts.as_nanos() - self.mono.as_nanos();
        let delta = delta.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
        self.wall
            .checked_add_signed(TimeDelta::nanoseconds(delta))
            .unwrap_or(self.wall)
    }
}

pub fn format_time(ts: &Timestamp, timefmt: &TimeFmt, clock: &WallClock) -> String {
    match timefmt {
        TimeFmt::Seconds => ts.to_string(),
        TimeFmt::Localtime => format!(
            "{}",
            clock.to_utc(ts).with_timezone(&Local).format("%FT%T%.9f")
        ),
        TimeFmt::Utc => format!("{}", clock.to_utc(ts).format("%FT%T%.9fZ")),
    }
}

/// The process exit status for an error.
///
/// Each class of setup failure has its own status.
pub fn exit_status(e: &anyhow::Error) -> u8 {
    use gpiommio::Error::*;

    match e.chain().find_map(|c| c.downcast_ref::<gpiommio::Error>()) {
        Some(PermissionDenied(..)) => 2,
        Some(DeviceUnavailable(..)) => 3,
        Some(Mapping(_)) => 4,
        Some(MemoryLock(_)) => 5,
        Some(SchedulingSetup(step, _)) => match step {
            SchedStep::Init => 6,
            SchedStep::StackSize => 7,
            SchedStep::Policy => 8,
            SchedStep::Priority => 9,
            SchedStep::InheritMode => 10,
        },
        Some(ThreadCreation(_)) => 11,
        Some(ThreadJoin(_)) => 12,
        Some(Clock(_)) => 13,
        Some(InvalidArgument(_)) | None => 1,
    }
}
