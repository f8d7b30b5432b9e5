//! Admission gates for the record store
//!
//! Implements the readers-writers protocol:
//! - Any number of readers may be admitted together
//! - At most one writer is admitted, and never alongside readers
//! - Writers are admitted in arrival order
//!
//! # Coordination state
//!
//! One `Coordinator` owns all of it: the exclusive-access gate, the reader
//! count and the writer ticket queue. It is constructed once and shared by
//! reference with every operation.
//!
//! # Usage
//!
//! ```ignore
//! let coordinator = Coordinator::new(AdmissionPolicy::ReadersFirst);
//!
//! {
//!     let _permit = coordinator.acquire_read(None)?;
//!     // ... read ...
//! } // released on drop
//! ```

mod errors;
mod exclusive;
mod reader;
mod writer;

pub use errors::{GateError, GateResult};
pub use exclusive::ExclusiveGate;

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use reader::ReaderGate;
use writer::WriterGate;

/// Access mode of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Shared access
    Read,
    /// Exclusive access
    Write,
}

impl AccessMode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "READ",
            AccessMode::Write => "WRITE",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side yields when readers and writers contend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionPolicy {
    /// Arriving readers join an active batch even while writers wait
    #[default]
    ReadersFirst,
    /// Arriving readers wait until no writer holds or waits for a turn
    WritersFirst,
}

/// Occupancy counts at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    /// Readers inside the critical section
    pub readers: usize,
    /// Writers inside the critical section
    pub writers: usize,
    /// Writers waiting for their turn or for the exclusive gate
    pub writers_waiting: usize,
}

/// Process-wide coordination state
#[derive(Debug, Default)]
pub struct Coordinator {
    exclusive: ExclusiveGate,
    readers: ReaderGate,
    writers: WriterGate,
    policy: AdmissionPolicy,
}

impl Coordinator {
    /// Create coordination state with all gates open
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            exclusive: ExclusiveGate::new(),
            readers: ReaderGate::new(),
            writers: WriterGate::new(),
            policy,
        }
    }

    /// Configured admission policy
    pub fn policy(&self) -> AdmissionPolicy {
        self.policy
    }

    /// Admit a reader, blocking until no writer holds the exclusive gate
    pub fn acquire_read(&self, deadline: Option<Instant>) -> GateResult<ReadPermit<'_>> {
        let started = Instant::now();

        if self.policy == AdmissionPolicy::WritersFirst && !self.writers.wait_idle(deadline) {
            return Err(timeout(AccessMode::Read, started));
        }

        if !self.readers.acquire(&self.exclusive, deadline) {
            return Err(timeout(AccessMode::Read, started));
        }

        Ok(ReadPermit { coordinator: self })
    }

    /// Admit a writer, blocking until its turn comes and no readers remain
    pub fn acquire_write(&self, deadline: Option<Instant>) -> GateResult<WritePermit<'_>> {
        let started = Instant::now();

        match self.writers.acquire(&self.exclusive, deadline) {
            Some(ticket) => Ok(WritePermit {
                coordinator: self,
                ticket,
            }),
            None => Err(timeout(AccessMode::Write, started)),
        }
    }

    /// Current occupancy
    ///
    /// Never blocks on the gates, so it is safe to call from inside a
    /// critical section.
    pub fn occupancy(&self) -> Occupancy {
        let writers = self.writers.active();
        Occupancy {
            readers: self.readers.active(),
            writers,
            writers_waiting: self.writers.pending().saturating_sub(writers),
        }
    }

    /// Number of times the exclusive gate has been taken
    pub fn exclusive_acquisitions(&self) -> u64 {
        self.exclusive.acquisitions()
    }

    /// Highest number of simultaneously admitted readers
    pub fn peak_readers(&self) -> usize {
        self.readers.peak()
    }
}

fn timeout(mode: AccessMode, started: Instant) -> GateError {
    GateError::AdmissionTimeout {
        mode,
        waited: started.elapsed(),
    }
}

/// Shared admission, released on drop
#[derive(Debug)]
#[must_use = "the reader is released as soon as the permit is dropped"]
pub struct ReadPermit<'a> {
    coordinator: &'a Coordinator,
}

impl Drop for ReadPermit<'_> {
    fn drop(&mut self) {
        self.coordinator.readers.release(&self.coordinator.exclusive);
    }
}

/// Exclusive admission, released on drop
#[derive(Debug)]
#[must_use = "the writer is released as soon as the permit is dropped"]
pub struct WritePermit<'a> {
    coordinator: &'a Coordinator,
    ticket: u64,
}

impl WritePermit<'_> {
    /// Position of this writer in admission order
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for WritePermit<'_> {
    fn drop(&mut self) {
        self.coordinator.writers.release(&self.coordinator.exclusive);
    }
}
