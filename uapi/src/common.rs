// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

use std::io::Error as IoError;

/// The result returned by [`gpiommio_uapi`] functions.
///
/// [`gpiommio_uapi`]: crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`gpiommio_uapi`] functions.
///
/// [`gpiommio_uapi`]: crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error returned from an underlying system call.
    #[error(transparent)]
    Os(#[from] std::io::Error),
}

impl Error {
    /// The error corresponding to the current value of `errno`.
    pub(crate) fn last_os_error() -> Error {
        Error::Os(IoError::last_os_error())
    }

    /// The error corresponding to an error number returned directly by a call,
    /// as the pthread and clock_nanosleep functions do.
    pub(crate) fn from_errno(errno: libc::c_int) -> Error {
        Error::Os(IoError::from_raw_os_error(errno))
    }

    /// The raw OS error number, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Error::Os(e) => e.raw_os_error(),
        }
    }

    /// The kind of the underlying OS error.
    pub fn kind(&self) -> std::io::ErrorKind {
        match self {
            Error::Os(e) => e.kind(),
        }
    }
}

/// Convert the return value of a call that returns an error number directly.
#[inline]
pub(crate) fn errno_result(ret: libc::c_int) -> Result<()> {
    match ret {
        0 => Ok(()),
        e => Err(Error::from_errno(e)),
    }
}
