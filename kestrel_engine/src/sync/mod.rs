//! Useful synchronization primitives.
//!
//! A poisoned lock only means another search thread panicked while holding it; the
//! boolean inside is still meaningful, so poisoning is recovered from rather than propagated.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A `LockLatch` starts as false and eventually becomes true. You can block
/// until it becomes true.
pub struct LockLatch {
    m: Mutex<bool>,
    v: Condvar,
}

impl Default for LockLatch {
    fn default() -> Self {
        LockLatch::new()
    }
}

impl LockLatch {
    #[inline]
    pub fn new() -> LockLatch {
        LockLatch::new_value(false)
    }

    #[inline]
    fn guard(&self) -> MutexGuard<'_, bool> {
        self.m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until latch is set.
    #[inline]
    pub fn wait(&self) {
        self.await_value(true);
    }

    // Sets the lock to true and notifies any threads waiting on it.
    #[inline]
    pub fn set(&self) {
        self.set_value(true);
    }

    // Locks the latch, causing threads to await its unlocking.
    #[inline]
    pub fn lock(&self) {
        *self.guard() = false;
    }

    /// Returns if the latch is currently set.
    #[inline]
    pub fn is_set(&self) -> bool {
        *self.guard()
    }

    #[inline]
    fn new_value(value: bool) -> LockLatch {
        LockLatch {
            m: Mutex::new(value),
            v: Condvar::new(),
        }
    }

    #[inline]
    fn set_value(&self, value: bool) {
        let mut guard = self.guard();
        *guard = value;
        self.v.notify_all();
    }

    #[inline]
    fn await_value(&self, value: bool) {
        let mut guard = self.guard();
        while *guard != value {
            guard = self.v.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// A `GuardedBool` allows for waiting on a specific bool value.
pub struct GuardedBool {
    a: LockLatch,
}

impl GuardedBool {
    #[inline]
    pub fn new(value: bool) -> GuardedBool {
        GuardedBool {
            a: LockLatch::new_value(value),
        }
    }

    /// Sets the value.
    #[inline]
    pub fn set(&self, value: bool) {
        self.a.set_value(value);
    }

    /// Returns the current value.
    #[inline]
    pub fn get(&self) -> bool {
        self.a.is_set()
    }

    /// Awaits a value.
    #[inline]
    pub fn wait(&self, value: bool) {
        self.a.await_value(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn latch_releases_waiter() {
        let latch = Arc::new(LockLatch::new());
        let l2 = Arc::clone(&latch);
        let handle = thread::spawn(move || {
            l2.wait();
            true
        });
        latch.set();
        assert!(handle.join().unwrap());
        assert!(latch.is_set());
        latch.lock();
        assert!(!latch.is_set());
    }

    #[test]
    fn guarded_bool_round_trip() {
        let flag = Arc::new(GuardedBool::new(true));
        let f2 = Arc::clone(&flag);
        let handle = thread::spawn(move || f2.set(false));
        flag.wait(false);
        handle.join().unwrap();
        assert!(!flag.get());
    }
}
