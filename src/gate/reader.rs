//! Reader admission gate
//!
//! First-in / last-out: the reader that moves the count from 0 to 1 takes
//! the exclusive gate on behalf of the whole batch, and the reader that
//! moves it back to 0 releases it. Readers in between pass straight
//! through.
//!
//! While the first reader waits for the exclusive gate it marks the batch
//! as admitting. Readers arriving behind it wait on a condvar, each with
//! its own deadline, rather than racing a writer for the gate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use super::exclusive::ExclusiveGate;

#[derive(Debug, Default)]
struct BatchState {
    active: usize,
    /// A first reader is waiting for the exclusive gate
    admitting: bool,
}

/// Tracks active readers and holds the exclusive gate for them
#[derive(Debug, Default)]
pub(crate) struct ReaderGate {
    batch: Mutex<BatchState>,
    settled: Condvar,
    /// Lock-free mirror of the active count for diagnostics
    observed: AtomicUsize,
    peak: AtomicUsize,
}

impl ReaderGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn batch(&self) -> MutexGuard<'_, BatchState> {
        self.batch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit one reader
    ///
    /// Returns `false` without changing the count if `deadline` passed
    /// before the reader was admitted.
    pub(crate) fn acquire(&self, exclusive: &ExclusiveGate, deadline: Option<Instant>) -> bool {
        let mut batch = self.batch();
        loop {
            if batch.active > 0 {
                self.enter(&mut batch);
                return true;
            }
            if !batch.admitting {
                break;
            }
            batch = match deadline {
                None => self
                    .settled
                    .wait(batch)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    self.settled
                        .wait_timeout(batch, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }

        // First reader of a batch
        batch.admitting = true;
        drop(batch);
        let acquired = exclusive.acquire_until(deadline);

        let mut batch = self.batch();
        batch.admitting = false;
        if acquired {
            self.enter(&mut batch);
        }
        drop(batch);
        self.settled.notify_all();
        acquired
    }

    fn enter(&self, batch: &mut BatchState) {
        batch.active += 1;
        self.observed.store(batch.active, Ordering::SeqCst);
        self.peak.fetch_max(batch.active, Ordering::Relaxed);
    }

    /// Release one reader
    pub(crate) fn release(&self, exclusive: &ExclusiveGate) {
        let mut batch = self.batch();
        debug_assert!(batch.active > 0, "reader released without admission");
        batch.active = batch.active.saturating_sub(1);
        self.observed.store(batch.active, Ordering::SeqCst);
        if batch.active == 0 {
            exclusive.release();
        }
    }

    /// Readers currently inside the critical section
    pub(crate) fn active(&self) -> usize {
        self.observed.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously admitted readers
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_first_reader_takes_gate() {
        let exclusive = ExclusiveGate::new();
        let readers = ReaderGate::new();

        assert!(readers.acquire(&exclusive, None));
        assert!(exclusive.is_held());
        assert!(readers.acquire(&exclusive, None));
        assert_eq!(readers.active(), 2);
        assert_eq!(exclusive.acquisitions(), 1);
    }

    #[test]
    fn test_last_reader_releases_gate() {
        let exclusive = ExclusiveGate::new();
        let readers = ReaderGate::new();

        readers.acquire(&exclusive, None);
        readers.acquire(&exclusive, None);
        readers.release(&exclusive);
        assert!(exclusive.is_held());
        readers.release(&exclusive);
        assert!(!exclusive.is_held());
        assert_eq!(readers.active(), 0);
        assert_eq!(readers.peak(), 2);
    }

    #[test]
    fn test_timeout_leaves_count_unchanged() {
        let exclusive = ExclusiveGate::new();
        let readers = ReaderGate::new();
        exclusive.acquire();

        let deadline = Instant::now() + Duration::from_millis(20);
        assert!(!readers.acquire(&exclusive, Some(deadline)));
        assert_eq!(readers.active(), 0);
        assert!(exclusive.is_held());
    }

    #[test]
    fn test_queued_reader_honors_own_deadline() {
        let exclusive = ExclusiveGate::new();
        let readers = ReaderGate::new();
        exclusive.acquire();

        thread::scope(|s| {
            let first = s.spawn(|| readers.acquire(&exclusive, None));
            while !readers.batch().admitting {
                thread::sleep(Duration::from_millis(1));
            }

            let started = Instant::now();
            let deadline = started + Duration::from_millis(30);
            assert!(!readers.acquire(&exclusive, Some(deadline)));
            assert!(started.elapsed() < Duration::from_millis(500));
            assert_eq!(readers.active(), 0);

            exclusive.release();
            assert!(first.join().unwrap());
        });

        assert_eq!(readers.active(), 1);
    }
}
