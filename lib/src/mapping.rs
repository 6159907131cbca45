// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::am62::GPIO0_BASE;
use crate::register::{Register, RegisterBlock, BLOCK_SIZE};
use crate::{Error, Result};
use gpiommio_uapi::mem;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::ptr::{self, NonNull};

/// A block of GPIO controller registers mapped into the process address space.
///
/// The block is unmapped when the [`Mapping`] is dropped.
///
/// Register accesses are volatile and go straight to the hardware.
///
/// ```no_run
/// # fn example() -> gpiommio::Result<()> {
/// use gpiommio::am62::{BANK23, GPIO0_42};
/// use gpiommio::{Mapping, RegisterBlock};
///
/// let regs = Mapping::new()?;
/// regs.configure_as_output(BANK23.dir, GPIO0_42);
/// regs.assert_bits(BANK23.set_data, GPIO0_42.mask());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Mapping {
    addr: NonNull<u8>,
    len: usize,
    base: u64,
}

// The mapping is plain device memory accessed only via volatile 32-bit
// reads and writes.
unsafe impl Send for Mapping {}
unsafe impl Sync for Mapping {}

impl Mapping {
    /// Map the GPIO0 controller registers via `/dev/mem`.
    ///
    /// Typically requires root privileges.
    pub fn new() -> Result<Mapping> {
        Mapping::from_parts(mem::DEV_MEM, GPIO0_BASE)
    }

    /// Map the register block at physical address `base` from the memory
    /// device at `path`.
    ///
    /// The base must be page aligned.
    pub fn from_parts<P: AsRef<Path>>(path: P, base: u64) -> Result<Mapping> {
        let path = path.as_ref();
        let f = mem::open_mem(path).map_err(|e| open_error(path, e))?;
        let addr = mem::map_shared(&f, base, BLOCK_SIZE).map_err(Error::Mapping)?;
        // the mapping remains valid without the device handle
        drop(f);
        log::debug!(
            "mapped {:#x}..{:#x} from {}",
            base,
            base + BLOCK_SIZE as u64,
            path.display()
        );
        Ok(Mapping {
            addr,
            len: BLOCK_SIZE,
            base,
        })
    }

    /// The physical address of the start of the block.
    pub fn base(&self) -> u64 {
        self.base
    }

    #[inline]
    fn reg_ptr(&self, reg: Register) -> *mut u32 {
        // Register offsets are bounded by BLOCK_SIZE and 32-bit aligned,
        // and the mapping itself is page aligned.
        unsafe { self.addr.as_ptr().add(reg.offset()) as *mut u32 }
    }
}

fn open_error(path: &Path, e: gpiommio_uapi::Error) -> Error {
    let path = PathBuf::from(path);
    match e.kind() {
        ErrorKind::PermissionDenied => Error::PermissionDenied(path, e),
        _ => Error::DeviceUnavailable(path, e),
    }
}

impl RegisterBlock for Mapping {
    #[inline]
    fn read(&self, reg: Register) -> u32 {
        unsafe { ptr::read_volatile(self.reg_ptr(reg)) }
    }

    #[inline]
    fn write(&self, reg: Register, value: u32) {
        unsafe { ptr::write_volatile(self.reg_ptr(reg), value) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        match unsafe { mem::unmap(self.addr, self.len) } {
            Ok(()) => log::debug!("unmapped {:#x}", self.base),
            Err(e) => log::warn!("failed to unmap {:#x}: {}", self.base, e),
        }
    }
}
