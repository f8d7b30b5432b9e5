//! Writer Ordering Tests
//!
//! Tests for writer admission:
//! - Writers are admitted in arrival order
//! - Every writer eventually completes
//! - Abandoned tickets never stall the queue
//! - Writers-first policy holds back new readers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use rwstore::gate::{AdmissionPolicy, Coordinator};

fn after(ms: u64) -> Option<Instant> {
    Some(Instant::now() + Duration::from_millis(ms))
}

/// Poll until `condition` holds, failing after five seconds.
fn wait_until(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

// =============================================================================
// FIFO Tests
// =============================================================================

/// Writers queued behind a reader are admitted in arrival order.
#[test]
fn test_writers_admitted_in_arrival_order() {
    const WRITERS: usize = 5;
    let coordinator = Coordinator::default();
    let order = Mutex::new(Vec::new());
    let reader = coordinator.acquire_read(None).unwrap();

    thread::scope(|s| {
        for i in 0..WRITERS {
            let coordinator = &coordinator;
            let order = &order;
            s.spawn(move || {
                let permit = coordinator.acquire_write(None).unwrap();
                order.lock().unwrap().push((i, permit.ticket()));
            });
            wait_until(|| coordinator.occupancy().writers_waiting == i + 1);
        }
        drop(reader);
    });

    let order = order.into_inner().unwrap();
    let expected: Vec<_> = (0..WRITERS).map(|i| (i, i as u64)).collect();
    assert_eq!(order, expected);
}

// =============================================================================
// Liveness Tests
// =============================================================================

/// A finite set of writers with no readers all complete.
#[test]
fn test_all_writers_complete() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 25;
    let coordinator = Coordinator::default();
    let completed = AtomicUsize::new(0);
    let tickets = Mutex::new(Vec::new());

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    let permit = coordinator.acquire_write(None).unwrap();
                    tickets.lock().unwrap().push(permit.ticket());
                    completed.fetch_add(1, Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(completed.load(Ordering::SeqCst), THREADS * ROUNDS);

    let mut tickets = tickets.into_inner().unwrap();
    tickets.sort_unstable();
    let expected: Vec<u64> = (0..(THREADS * ROUNDS) as u64).collect();
    assert_eq!(tickets, expected);
}

// =============================================================================
// Abandoned Ticket Tests
// =============================================================================

/// A writer that gives up while waiting for its turn is skipped.
#[test]
fn test_abandoned_ticket_is_skipped() {
    let coordinator = Coordinator::default();
    let first = coordinator.acquire_write(None).unwrap();
    assert_eq!(first.ticket(), 0);

    // Ticket 1 waits for its turn and gives up
    assert!(coordinator.acquire_write(after(30)).is_err());
    assert_eq!(coordinator.occupancy().writers_waiting, 0);

    drop(first);
    let third = coordinator.acquire_write(after(100)).unwrap();
    assert_eq!(third.ticket(), 2);
}

/// Timed-out writers between live ones do not reorder the live ones.
#[test]
fn test_abandoned_ticket_between_waiters() {
    let coordinator = Coordinator::default();
    let order = Mutex::new(Vec::new());
    let holder = coordinator.acquire_write(None).unwrap();

    thread::scope(|s| {
        let coordinator = &coordinator;
        let order = &order;

        s.spawn(move || {
            let permit = coordinator.acquire_write(None).unwrap();
            order.lock().unwrap().push(permit.ticket());
        });
        wait_until(|| coordinator.occupancy().writers_waiting == 1);

        // Ticket 2 gives up while ticket 1 is still waiting
        assert!(coordinator.acquire_write(after(20)).is_err());

        s.spawn(move || {
            let permit = coordinator.acquire_write(None).unwrap();
            order.lock().unwrap().push(permit.ticket());
        });
        wait_until(|| coordinator.occupancy().writers_waiting == 2);

        drop(holder);
    });

    assert_eq!(order.into_inner().unwrap(), vec![1, 3]);
}

// =============================================================================
// Policy Tests
// =============================================================================

/// Readers-first: a new reader joins the active batch past a waiting writer.
#[test]
fn test_readers_first_admits_reader_past_waiting_writer() {
    let coordinator = Coordinator::new(AdmissionPolicy::ReadersFirst);
    let reader = coordinator.acquire_read(None).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            let _permit = coordinator.acquire_write(None).unwrap();
        });
        wait_until(|| coordinator.occupancy().writers_waiting == 1);

        let late = coordinator.acquire_read(after(50)).unwrap();
        assert_eq!(coordinator.occupancy().readers, 2);

        drop(late);
        drop(reader);
    });
}

/// Writers-first: a new reader waits behind a waiting writer.
#[test]
fn test_writers_first_holds_back_new_readers() {
    let coordinator = Coordinator::new(AdmissionPolicy::WritersFirst);
    let reader = coordinator.acquire_read(None).unwrap();
    let writer_done = AtomicUsize::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            let _permit = coordinator.acquire_write(None).unwrap();
            writer_done.fetch_add(1, Ordering::SeqCst);
        });
        wait_until(|| coordinator.occupancy().writers_waiting == 1);

        assert!(coordinator.acquire_read(after(50)).is_err());
        assert_eq!(coordinator.occupancy().readers, 1);

        drop(reader);
    });

    assert_eq!(writer_done.load(Ordering::SeqCst), 1);
    assert!(coordinator.acquire_read(after(50)).is_ok());
}
