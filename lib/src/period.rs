// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Error, Result};
use gpiommio_uapi::time::{self, timespec};
use std::fmt;
use std::time::Duration;

const NANOS_PER_SEC: u64 = 1_000_000_000;

// leaves room to add a period to any normalised nsec without overflow
const MAX_INTERVAL: u64 = u64::MAX - NANOS_PER_SEC;

/// A point in time on the monotonic clock.
///
/// The nanosecond component is always less than one second.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Timestamp {
    // field order matters for the derived Ord
    sec: i64,
    nsec: u32,
}

impl Timestamp {
    /// Create a timestamp, carrying any whole seconds in `nsec` into `sec`.
    pub fn new(sec: i64, nsec: u64) -> Timestamp {
        let mut ts = Timestamp { sec, nsec: 0 };
        ts.add_nanos(nsec);
        ts
    }

    /// The seconds component.
    #[inline]
    pub fn sec(&self) -> i64 {
        self.sec
    }

    /// The nanoseconds component, in the range `0..1_000_000_000`.
    #[inline]
    pub fn nsec(&self) -> u32 {
        self.nsec
    }

    /// Move the timestamp forward by `nanos` nanoseconds.
    pub fn add_nanos(&mut self, nanos: u64) {
        let nsec = self.nsec as u64 + nanos;
        // equivalent to repeatedly moving a second from nsec to sec
        self.sec += (nsec / NANOS_PER_SEC) as i64;
        self.nsec = (nsec % NANOS_PER_SEC) as u32;
    }

    /// The time since the epoch of the clock in nanoseconds.
    pub fn as_nanos(&self) -> i128 {
        self.sec as i128 * NANOS_PER_SEC as i128 + self.nsec as i128
    }

    /// The time elapsed from `earlier` to this timestamp, if any.
    pub fn duration_since(&self, earlier: &Timestamp) -> Option<Duration> {
        let d = self.as_nanos() - earlier.as_nanos();
        u64::try_from(d).ok().map(Duration::from_nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec, self.nsec)
    }
}

impl From<timespec> for Timestamp {
    fn from(ts: timespec) -> Self {
        Timestamp::new(ts.tv_sec as i64, ts.tv_nsec as u64)
    }
}

impl From<Timestamp> for timespec {
    fn from(ts: Timestamp) -> Self {
        timespec {
            tv_sec: ts.sec as _,
            tv_nsec: ts.nsec as _,
        }
    }
}

/// A fixed period and the deadline at the end of the current period.
///
/// The deadline is only ever advanced by whole periods, so the deadlines
/// do not drift no matter how long is spent within each period.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Period {
    next: Timestamp,
    interval: u64,
}

impl Period {
    /// Create a period of length `interval`, with the first period starting at `start`.
    ///
    /// The interval must be non-zero, and less than about 584 years.
    pub fn new(start: Timestamp, interval: Duration) -> Result<Period> {
        if interval.is_zero() {
            return Err(Error::InvalidArgument(
                "period must be greater than zero".into(),
            ));
        }
        let interval = u64::try_from(interval.as_nanos())
            .ok()
            .filter(|&n| n <= MAX_INTERVAL)
            .ok_or_else(|| Error::InvalidArgument(format!("period {:?} is too long", interval)))?;
        Ok(Period {
            next: start,
            interval,
        })
    }

    /// The current deadline.
    #[inline]
    pub fn deadline(&self) -> Timestamp {
        self.next
    }

    /// The length of the period.
    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval)
    }

    /// Move the deadline to the end of the next period, and return it.
    pub fn advance(&mut self) -> Timestamp {
        self.next.add_nanos(self.interval);
        self.next
    }
}

/// A source of time that supports sleeping until an absolute deadline.
pub trait Clock {
    /// The current time.
    fn now(&mut self) -> Result<Timestamp>;

    /// Suspend the caller until the clock reaches `deadline`.
    ///
    /// Returns immediately if the deadline has already passed.
    fn sleep_until(&mut self, deadline: Timestamp) -> Result<()>;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Result<Timestamp> {
        (**self).now()
    }

    fn sleep_until(&mut self, deadline: Timestamp) -> Result<()> {
        (**self).sleep_until(deadline)
    }
}

/// The system monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&mut self) -> Result<Timestamp> {
        time::monotonic_now()
            .map(Timestamp::from)
            .map_err(Error::Clock)
    }

    fn sleep_until(&mut self, deadline: Timestamp) -> Result<()> {
        time::sleep_until(&deadline.into()).map_err(Error::Clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_new_normalises() {
        let ts = Timestamp::new(3, 2_500_000_000);
        assert_eq!(ts.sec(), 5);
        assert_eq!(ts.nsec(), 500_000_000);
        assert_eq!(Timestamp::new(1, 999_999_999).nsec(), 999_999_999);
    }

    #[test]
    fn timestamp_add_nanos_carries() {
        let mut ts = Timestamp::new(10, 800_000_000);
        ts.add_nanos(500_000_000);
        assert_eq!(ts, Timestamp::new(11, 300_000_000));
        ts.add_nanos(700_000_000);
        assert_eq!(ts, Timestamp::new(12, 0));
        ts.add_nanos(0);
        assert_eq!(ts, Timestamp::new(12, 0));
    }

    #[test]
    fn timestamp_ordering() {
        assert!(Timestamp::new(1, 999_999_999) < Timestamp::new(2, 0));
        assert!(Timestamp::new(2, 1) > Timestamp::new(2, 0));
    }

    #[test]
    fn timestamp_duration_since() {
        let a = Timestamp::new(10, 800_000_000);
        let b = Timestamp::new(11, 300_000_000);
        assert_eq!(b.duration_since(&a), Some(Duration::from_millis(500)));
        assert_eq!(a.duration_since(&b), None);
    }

    #[test]
    fn timestamp_display() {
        assert_eq!(Timestamp::new(12, 34).to_string(), "12.000000034");
    }

    #[test]
    fn timestamp_timespec() {
        let ts = Timestamp::new(42, 123_456_789);
        let spec: timespec = ts.into();
        assert_eq!(spec.tv_sec, 42);
        assert_eq!(spec.tv_nsec, 123_456_789);
        assert_eq!(Timestamp::from(spec), ts);
    }

    #[test]
    fn period_advance() {
        let mut p = Period::new(Timestamp::new(10, 800_000_000), Duration::from_millis(500)).unwrap();
        assert_eq!(p.deadline(), Timestamp::new(10, 800_000_000));
        assert_eq!(p.advance(), Timestamp::new(11, 300_000_000));
        assert_eq!(p.deadline(), Timestamp::new(11, 300_000_000));
        assert_eq!(p.advance(), Timestamp::new(11, 800_000_000));
        assert_eq!(p.interval(), Duration::from_millis(500));
    }

    #[test]
    fn period_multi_second() {
        let mut p = Period::new(Timestamp::new(0, 999_999_999), Duration::new(3, 2)).unwrap();
        assert_eq!(p.advance(), Timestamp::new(4, 1));
    }

    #[test]
    fn period_zero() {
        let e = Period::new(Timestamp::default(), Duration::ZERO).unwrap_err();
        assert!(matches!(e, Error::InvalidArgument(_)));
    }

    #[test]
    fn period_too_long() {
        let e = Period::new(Timestamp::default(), Duration::MAX).unwrap_err();
        assert!(matches!(e, Error::InvalidArgument(_)));
        let e = Period::new(Timestamp::default(), Duration::from_nanos(u64::MAX)).unwrap_err();
        assert!(matches!(e, Error::InvalidArgument(_)));
        let e = Period::new(Timestamp::default(), Duration::from_nanos(MAX_INTERVAL + 1))
            .unwrap_err();
        assert!(matches!(e, Error::InvalidArgument(_)));
    }

    #[test]
    fn period_longest() {
        let start = Timestamp::new(0, 999_999_999);
        let mut p = Period::new(start, Duration::from_nanos(MAX_INTERVAL)).unwrap();
        let next = p.advance();
        assert!(next > start);
        assert!(next.nsec() < 1_000_000_000);
        assert_eq!(
            next.as_nanos(),
            start.as_nanos() + MAX_INTERVAL as i128
        );
    }

    #[test]
    fn toggler_rejects_overlong_period() {
        use crate::am62::{BANK23, GPIO0_42};
        use crate::sim::SimClock;
        use crate::{MemBlock, OutputPin, Toggler};

        let pin = OutputPin::new(MemBlock::new(), BANK23, GPIO0_42);
        let e = Toggler::new(pin, SimClock::new(), Duration::from_nanos(u64::MAX)).unwrap_err();
        assert!(matches!(e, Error::InvalidArgument(_)));
    }

    #[test]
    fn monotonic_clock() {
        let mut c = MonotonicClock;
        let start = c.now().unwrap();
        let mut deadline = start;
        deadline.add_nanos(5_000_000);
        c.sleep_until(deadline).unwrap();
        assert!(c.now().unwrap() >= deadline);
    }
}
