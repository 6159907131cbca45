// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

//! A thin but safe Rust layer around the Linux calls needed to drive memory
//! mapped GPIO controllers from user space.
//!
//! This covers mapping physical memory via `/dev/mem`, locking process
//! memory, absolute sleeps on the monotonic clock, and creating threads with
//! explicit real-time scheduling attributes.

pub(crate) mod common;

pub use common::{Error, Result};

/// Mapping of physical memory into the process address space.
pub mod mem;

/// Threads with explicit scheduling attributes.
pub mod thread;

/// Reading and sleeping on the monotonic clock.
pub mod time;
