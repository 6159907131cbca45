// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::common::{Error, Result};
pub use libc::timespec;
use std::mem::MaybeUninit;
use std::ptr;

/// Read the current time of the monotonic clock.
pub fn monotonic_now() -> Result<timespec> {
    let mut ts = MaybeUninit::<timespec>::uninit();
    unsafe {
        match libc::clock_gettime(libc::CLOCK_MONOTONIC, ts.as_mut_ptr()) {
            0 => Ok(ts.assume_init()),
            _ => Err(Error::last_os_error()),
        }
    }
}

/// Sleep until the monotonic clock reaches `deadline`.
///
/// The sleep is absolute, so the wake time does not depend on when the call
/// is made. A sleep interrupted by a signal is resumed with the same deadline.
///
/// Returns immediately if the deadline has already passed.
pub fn sleep_until(deadline: &timespec) -> Result<()> {
    loop {
        let ret = unsafe {
            libc::clock_nanosleep(
                libc::CLOCK_MONOTONIC,
                libc::TIMER_ABSTIME,
                deadline,
                ptr::null_mut(),
            )
        };
        match ret {
            0 => return Ok(()),
            libc::EINTR => continue,
            e => return Err(Error::from_errno(e)),
        }
    }
}
