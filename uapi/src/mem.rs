// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::common::{Error, Result};
use libc::{c_void, off_t};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr::{self, NonNull};

/// The path to the physical memory device.
pub const DEV_MEM: &str = "/dev/mem";

/// Open a memory device, such as `/dev/mem`, for synchronous read/write access.
///
/// * `path` - The path to the device.
pub fn open_mem<P: AsRef<Path>>(path: P) -> Result<File> {
    Ok(OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_SYNC)
        .open(path)?)
}

/// Map a window of a file into the process address space.
///
/// The window is mapped shared and read/write, so writes go straight through
/// to the device.
///
/// The mapping remains valid after the file is closed.
///
/// * `f` - The open memory device.
/// * `offset` - The physical address of the start of the window.
///   Must be a multiple of the page size.
/// * `len` - The size of the window in bytes.
pub fn map_shared(f: &File, offset: u64, len: usize) -> Result<NonNull<u8>> {
    let offset = off_t::try_from(offset).map_err(|_| Error::from_errno(libc::EOVERFLOW))?;
    let addr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            f.as_raw_fd(),
            offset,
        )
    };
    if addr == libc::MAP_FAILED {
        return Err(Error::last_os_error());
    }
    NonNull::new(addr as *mut u8).ok_or_else(|| Error::from_errno(libc::EFAULT))
}

/// Release a window previously mapped by [`map_shared`].
///
/// # Safety
///
/// `addr` and `len` must describe a mapping returned by [`map_shared`] that
/// has not already been unmapped, and no references into the window may
/// outlive this call.
pub unsafe fn unmap(addr: NonNull<u8>, len: usize) -> Result<()> {
    match libc::munmap(addr.as_ptr() as *mut c_void, len) {
        0 => Ok(()),
        _ => Err(Error::last_os_error()),
    }
}

/// Lock all current and future pages of the process into RAM.
pub fn lock_memory() -> Result<()> {
    match unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) } {
        0 => Ok(()),
        _ => Err(Error::last_os_error()),
    }
}

/// Undo the effect of [`lock_memory`].
pub fn unlock_memory() -> Result<()> {
    match unsafe { libc::munlockall() } {
        0 => Ok(()),
        _ => Err(Error::last_os_error()),
    }
}

/// The size of a memory page on this platform.
pub fn page_size() -> usize {
    match unsafe { libc::sysconf(libc::_SC_PAGESIZE) } {
        n if n > 0 => n as usize,
        _ => 4096,
    }
}
