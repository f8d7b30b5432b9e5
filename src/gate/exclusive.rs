//! Exclusive-access gate
//!
//! A binary semaphore. Unlike a mutex guard, the gate may be released by a
//! thread other than the one that acquired it: the first reader of a batch
//! acquires it and the last reader releases it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Binary semaphore guarding the critical section
#[derive(Debug, Default)]
pub struct ExclusiveGate {
    held: Mutex<bool>,
    released: Condvar,
    acquisitions: AtomicU64,
}

impl ExclusiveGate {
    /// Create an open gate
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, bool> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the gate is taken
    pub fn acquire(&self) {
        let mut held = self.state();
        while *held {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *held = true;
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the gate, giving up at `deadline`
    ///
    /// Returns `false` if the deadline passed first. A deadline already in
    /// the past still takes an open gate.
    pub fn acquire_until(&self, deadline: Option<Instant>) -> bool {
        let Some(deadline) = deadline else {
            self.acquire();
            return true;
        };

        let mut held = self.state();
        while *held {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            held = self
                .released
                .wait_timeout(held, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *held = true;
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Open the gate and wake one waiter
    pub fn release(&self) {
        let mut held = self.state();
        debug_assert!(*held, "released an open gate");
        *held = false;
        drop(held);
        self.released.notify_one();
    }

    /// Whether the gate is currently taken
    pub fn is_held(&self) -> bool {
        *self.state()
    }

    /// Total number of successful acquisitions
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }
}
