// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Error, Result};
use gpiommio_uapi::mem;
use gpiommio_uapi::thread::{self, InheritSched, JoinHandle, ThreadAttr};
use std::fmt;

pub use gpiommio_uapi::thread::SchedPolicy;

/// The default static priority of a real-time worker.
pub const DEFAULT_PRIORITY: i32 = 80;

/// The smallest stack given to a real-time worker.
///
/// The platform minimum is too small for the formatting and logging
/// machinery on some targets.
pub const MIN_STACK_SIZE: usize = 64 * 1024;

/// The steps involved in setting up the scheduling attributes of a worker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SchedStep {
    /// Initialising the attributes.
    Init,
    /// Setting the stack size.
    StackSize,
    /// Setting the scheduling policy.
    Policy,
    /// Setting the static priority.
    Priority,
    /// Selecting explicit, rather than inherited, scheduling.
    InheritMode,
}

impl fmt::Display for SchedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedStep::Init => "initialize thread attributes",
            SchedStep::StackSize => "set stack size",
            SchedStep::Policy => "set scheduling policy",
            SchedStep::Priority => "set thread priority",
            SchedStep::InheritMode => "set inheritance mode",
        };
        write!(f, "{}", name)
    }
}

/// The scheduling configuration of a real-time worker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RtConfig {
    /// The scheduling policy.
    pub policy: SchedPolicy,
    /// The static priority, in the range valid for the policy.
    pub priority: i32,
    /// The size of the worker stack.
    pub stack_size: usize,
}

impl Default for RtConfig {
    fn default() -> Self {
        RtConfig {
            policy: SchedPolicy::Fifo,
            priority: DEFAULT_PRIORITY,
            stack_size: thread::STACK_MIN.max(MIN_STACK_SIZE),
        }
    }
}

impl RtConfig {
    /// Set the static priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Build the thread attributes, failing on the first step that fails.
    fn thread_attr(&self) -> Result<ThreadAttr> {
        let mut attr = ThreadAttr::new().map_err(|e| Error::SchedulingSetup(SchedStep::Init, e))?;
        attr.set_stack_size(self.stack_size)
            .map_err(|e| Error::SchedulingSetup(SchedStep::StackSize, e))?;
        // policy must precede priority as the valid priorities depend on it
        attr.set_sched_policy(self.policy)
            .map_err(|e| Error::SchedulingSetup(SchedStep::Policy, e))?;
        attr.set_sched_priority(self.priority)
            .map_err(|e| Error::SchedulingSetup(SchedStep::Priority, e))?;
        attr.set_inherit_sched(InheritSched::Explicit)
            .map_err(|e| Error::SchedulingSetup(SchedStep::InheritMode, e))?;
        Ok(attr)
    }
}

/// Lock all current and future process memory into RAM, so the worker is
/// never delayed by paging.
pub fn lock_memory() -> Result<()> {
    mem::lock_memory().map_err(Error::MemoryLock)?;
    log::debug!("locked process memory");
    Ok(())
}

/// A thread running under a real-time scheduling policy.
#[derive(Debug)]
pub struct Worker<T> {
    handle: JoinHandle<T>,
}

impl<T> Worker<T> {
    /// Wait for the worker to finish and return its result.
    ///
    /// Fails if the join fails or the worker panicked.
    pub fn join(self) -> Result<T> {
        match self.handle.join() {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(_)) => Err(Error::ThreadJoin("worker panicked".into())),
            Err(e) => Err(Error::ThreadJoin(e.to_string())),
        }
    }
}

/// Spawn a worker running `f` with the given scheduling configuration.
///
/// Any failure setting up the scheduling is returned rather than silently
/// falling back to the default policy.
pub fn spawn<F, T>(config: &RtConfig, f: F) -> Result<Worker<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let attr = config.thread_attr()?;
    let handle = thread::spawn(&attr, f).map_err(Error::ThreadCreation)?;
    log::debug!(
        "spawned worker with {:?} priority {}",
        config.policy,
        config.priority
    );
    Ok(Worker { handle })
}
