//! Writer admission gate
//!
//! Writers draw tickets and are admitted strictly in ticket order. The
//! writer whose ticket is being served holds the turn; it then competes
//! with reader batches for the exclusive gate. Releasing drops the
//! exclusive gate first and then passes the turn to the next ticket.
//!
//! A writer whose deadline expires while waiting for its turn abandons its
//! ticket. Abandoned tickets are skipped when the turn advances.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use super::exclusive::ExclusiveGate;

/// FIFO ticket dispenser
#[derive(Debug, Default)]
struct TicketQueue {
    next_ticket: u64,
    now_serving: u64,
    abandoned: BTreeSet<u64>,
}

impl TicketQueue {
    fn draw(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn advance(&mut self) {
        self.now_serving += 1;
        while self.abandoned.remove(&self.now_serving) {
            self.now_serving += 1;
        }
    }

    fn abandon(&mut self, ticket: u64) {
        if ticket == self.now_serving {
            self.advance();
        } else {
            self.abandoned.insert(ticket);
        }
    }

    /// Tickets drawn and not yet finished or abandoned
    fn pending(&self) -> u64 {
        self.next_ticket - self.now_serving - self.abandoned.len() as u64
    }
}

/// Serializes writers in arrival order
#[derive(Debug, Default)]
pub(crate) struct WriterGate {
    queue: Mutex<TicketQueue>,
    turn: Condvar,
    active: AtomicUsize,
}

impl WriterGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, TicketQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit one writer, returning its ticket
    ///
    /// Returns `None` if `deadline` passed first, in which case the ticket
    /// is given up and no gate is held.
    pub(crate) fn acquire(&self, exclusive: &ExclusiveGate, deadline: Option<Instant>) -> Option<u64> {
        let ticket = {
            let mut queue = self.queue();
            let ticket = queue.draw();

            while queue.now_serving != ticket {
                match deadline {
                    None => {
                        queue = self.turn.wait(queue).unwrap_or_else(PoisonError::into_inner);
                    }
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            queue.abandon(ticket);
                            drop(queue);
                            self.turn.notify_all();
                            return None;
                        }
                        queue = self
                            .turn
                            .wait_timeout(queue, deadline - now)
                            .unwrap_or_else(PoisonError::into_inner)
                            .0;
                    }
                }
            }
            ticket
        };

        // Turn taken; now wait out any reader batch or earlier writer
        if !exclusive.acquire_until(deadline) {
            self.queue().advance();
            self.turn.notify_all();
            return None;
        }

        self.active.fetch_add(1, Ordering::SeqCst);
        Some(ticket)
    }

    /// Release the exclusive gate and hand the turn to the next ticket
    pub(crate) fn release(&self, exclusive: &ExclusiveGate) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        exclusive.release();
        self.queue().advance();
        self.turn.notify_all();
    }

    /// Block until no writer holds or waits for a turn
    ///
    /// Returns `false` if `deadline` passed first.
    pub(crate) fn wait_idle(&self, deadline: Option<Instant>) -> bool {
        let mut queue = self.queue();
        while queue.pending() > 0 {
            match deadline {
                None => {
                    queue = self.turn.wait(queue).unwrap_or_else(PoisonError::into_inner);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    queue = self
                        .turn
                        .wait_timeout(queue, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
        true
    }

    /// Writers inside the critical section (0 or 1)
    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Writers holding or waiting for a turn
    pub(crate) fn pending(&self) -> usize {
        self.queue().pending() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ticket_queue_skips_abandoned() {
        let mut queue = TicketQueue::default();
        let first = queue.draw();
        let second = queue.draw();
        let third = queue.draw();
        assert_eq!((first, second, third), (0, 1, 2));

        queue.abandon(second);
        assert_eq!(queue.pending(), 2);

        queue.advance();
        assert_eq!(queue.now_serving, third);
        assert_eq!(queue.pending(), 1);
        assert!(queue.abandoned.is_empty());
    }

    #[test]
    fn test_abandon_current_ticket_advances() {
        let mut queue = TicketQueue::default();
        let ticket = queue.draw();
        queue.abandon(ticket);
        assert_eq!(queue.now_serving, 1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_acquire_release() {
        let exclusive = ExclusiveGate::new();
        let writers = WriterGate::new();

        assert_eq!(writers.acquire(&exclusive, None), Some(0));
        assert!(exclusive.is_held());
        assert_eq!(writers.active(), 1);
        assert_eq!(writers.pending(), 1);

        writers.release(&exclusive);
        assert!(!exclusive.is_held());
        assert_eq!(writers.active(), 0);
        assert_eq!(writers.pending(), 0);
    }

    #[test]
    fn test_timeout_on_exclusive_gate_passes_turn() {
        let exclusive = ExclusiveGate::new();
        let writers = WriterGate::new();
        exclusive.acquire();

        let deadline = Instant::now() + Duration::from_millis(20);
        assert_eq!(writers.acquire(&exclusive, Some(deadline)), None);
        assert_eq!(writers.pending(), 0);
        assert_eq!(writers.active(), 0);

        exclusive.release();
        assert_eq!(writers.acquire(&exclusive, None), Some(1));
    }

    #[test]
    fn test_wait_idle_times_out_while_writer_active() {
        let exclusive = ExclusiveGate::new();
        let writers = WriterGate::new();
        writers.acquire(&exclusive, None);

        let deadline = Instant::now() + Duration::from_millis(20);
        assert!(!writers.wait_idle(Some(deadline)));

        writers.release(&exclusive);
        assert!(writers.wait_idle(Some(Instant::now())));
    }
}
