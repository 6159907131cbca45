// SPDX-FileCopyrightText: 2025 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: MIT

use super::common::{errno_result, Error, Result};
use libc::{c_int, c_void, pthread_attr_t, pthread_t};
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

/// The smallest stack size accepted for a thread.
pub const STACK_MIN: usize = libc::PTHREAD_STACK_MIN;

/// The scheduling policy applied to a thread.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SchedPolicy {
    /// The standard time-sharing policy.
    #[default]
    Other,
    /// Real-time first-in first-out.
    Fifo,
    /// Real-time round-robin.
    RoundRobin,
}

impl From<SchedPolicy> for c_int {
    fn from(p: SchedPolicy) -> Self {
        match p {
            SchedPolicy::Other => libc::SCHED_OTHER,
            SchedPolicy::Fifo => libc::SCHED_FIFO,
            SchedPolicy::RoundRobin => libc::SCHED_RR,
        }
    }
}

impl TryFrom<c_int> for SchedPolicy {
    type Error = String;

    fn try_from(v: c_int) -> std::result::Result<Self, Self::Error> {
        match v {
            libc::SCHED_OTHER => Ok(SchedPolicy::Other),
            libc::SCHED_FIFO => Ok(SchedPolicy::Fifo),
            libc::SCHED_RR => Ok(SchedPolicy::RoundRobin),
            x => Err(format!("invalid value: {}", x)),
        }
    }
}

/// Where a new thread takes its scheduling attributes from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InheritSched {
    /// Copy the policy and priority of the creating thread.
    #[default]
    Inherit,
    /// Use the policy and priority set in the [`ThreadAttr`].
    Explicit,
}

impl From<InheritSched> for c_int {
    fn from(i: InheritSched) -> Self {
        match i {
            InheritSched::Inherit => libc::PTHREAD_INHERIT_SCHED,
            InheritSched::Explicit => libc::PTHREAD_EXPLICIT_SCHED,
        }
    }
}

/// The attributes used to create a thread.
///
/// Wraps a `pthread_attr_t`, which is destroyed when the [`ThreadAttr`] is dropped.
pub struct ThreadAttr {
    attr: pthread_attr_t,
}

impl ThreadAttr {
    /// Initialise a set of attributes with the platform defaults.
    pub fn new() -> Result<ThreadAttr> {
        let mut attr = MaybeUninit::<pthread_attr_t>::uninit();
        errno_result(unsafe { libc::pthread_attr_init(attr.as_mut_ptr()) })?;
        Ok(ThreadAttr {
            attr: unsafe { attr.assume_init() },
        })
    }

    /// Set the size of the stack of the thread.
    ///
    /// Must be at least [`STACK_MIN`].
    pub fn set_stack_size(&mut self, size: usize) -> Result<()> {
        errno_result(unsafe { libc::pthread_attr_setstacksize(&mut self.attr, size) })
    }

    /// The size of the stack of the thread.
    pub fn stack_size(&self) -> Result<usize> {
        let mut size = 0;
        errno_result(unsafe { libc::pthread_attr_getstacksize(&self.attr, &mut size) })?;
        Ok(size)
    }

    /// Set the scheduling policy of the thread.
    ///
    /// Only takes effect if the scheduling is [`InheritSched::Explicit`].
    pub fn set_sched_policy(&mut self, policy: SchedPolicy) -> Result<()> {
        errno_result(unsafe { libc::pthread_attr_setschedpolicy(&mut self.attr, policy.into()) })
    }

    /// The scheduling policy of the thread.
    pub fn sched_policy(&self) -> Result<SchedPolicy> {
        let mut policy = 0;
        errno_result(unsafe { libc::pthread_attr_getschedpolicy(&self.attr, &mut policy) })?;
        SchedPolicy::try_from(policy).map_err(|_| Error::from_errno(libc::EINVAL))
    }

    /// Set the static priority of the thread.
    ///
    /// The valid range depends on the policy, so set the policy first.
    pub fn set_sched_priority(&mut self, priority: i32) -> Result<()> {
        let mut param: libc::sched_param = unsafe { mem::zeroed() };
        param.sched_priority = priority;
        errno_result(unsafe { libc::pthread_attr_setschedparam(&mut self.attr, &param) })
    }

    /// The static priority of the thread.
    pub fn sched_priority(&self) -> Result<i32> {
        let mut param: libc::sched_param = unsafe { mem::zeroed() };
        errno_result(unsafe { libc::pthread_attr_getschedparam(&self.attr, &mut param) })?;
        Ok(param.sched_priority)
    }

    /// Set whether the scheduling attributes are inherited from the creating thread.
    pub fn set_inherit_sched(&mut self, inherit: InheritSched) -> Result<()> {
        errno_result(unsafe { libc::pthread_attr_setinheritsched(&mut self.attr, inherit.into()) })
    }
}

impl Drop for ThreadAttr {
    fn drop(&mut self) {
        unsafe {
            libc::pthread_attr_destroy(&mut self.attr);
        }
    }
}

/// An owned permission to join on a thread created by [`spawn`].
///
/// If the handle is dropped without being joined the thread is detached.
#[derive(Debug)]
pub struct JoinHandle<T> {
    thread: Option<pthread_t>,
    _result: PhantomData<T>,
}

impl<T> JoinHandle<T> {
    /// Wait for the thread to finish and return its result.
    ///
    /// The inner result is an `Err` if the thread panicked.
    pub fn join(mut self) -> Result<std::thread::Result<T>> {
        let thread = match self.thread.take() {
            Some(t) => t,
            None => return Err(Error::from_errno(libc::ESRCH)),
        };
        let mut ret: *mut c_void = ptr::null_mut();
        errno_result(unsafe { libc::pthread_join(thread, &mut ret) })?;
        if ret.is_null() {
            return Err(Error::from_errno(libc::EINVAL));
        }
        let res = unsafe { Box::from_raw(ret as *mut std::thread::Result<T>) };
        Ok(*res)
    }
}

impl<T> Drop for JoinHandle<T> {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            unsafe {
                libc::pthread_detach(thread);
            }
        }
    }
}

/// Spawn a thread with the given attributes, running `f`.
///
/// The attributes are only read during the call, so they may be dropped or
/// reused once it returns.
pub fn spawn<F, T>(attr: &ThreadAttr, f: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let payload = Box::into_raw(Box::new(f));
    let mut thread = MaybeUninit::<pthread_t>::uninit();
    let ret = unsafe {
        libc::pthread_create(
            thread.as_mut_ptr(),
            &attr.attr,
            trampoline::<F, T>,
            payload as *mut c_void,
        )
    };
    if ret != 0 {
        // the thread never started so the closure is still ours
        drop(unsafe { Box::from_raw(payload) });
        return Err(Error::from_errno(ret));
    }
    Ok(JoinHandle {
        thread: Some(unsafe { thread.assume_init() }),
        _result: PhantomData,
    })
}

extern "C" fn trampoline<F, T>(arg: *mut c_void) -> *mut c_void
where
    F: FnOnce() -> T,
{
    let f = unsafe { Box::from_raw(arg as *mut F) };
    // unwinding must not cross the C frame
    let res: std::thread::Result<T> = panic::catch_unwind(AssertUnwindSafe(move || f()));
    Box::into_raw(Box::new(res)) as *mut c_void
}
