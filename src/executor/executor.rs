//! Operation executor
//!
//! Execution flow for a read:
//! 1. Look up the record (directory lock only); absent name fails here
//! 2. Pass the reader gate
//! 3. Snapshot the record and simulate I/O latency
//! 4. Release the reader gate
//!
//! Execution flow for a write:
//! 1. Validate the name
//! 2. Pass the writer gate
//! 3. Simulate I/O latency, then append, creating the record on first write
//! 4. Release the writer gate
//!
//! A write that fails never publishes its name.
//!
//! Every state transition is reported to the diagnostic sink.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::gate::{AccessMode, AdmissionPolicy, Coordinator, Occupancy};
use crate::observability::{DiagnosticSink, MetricsRegistry, MetricsSnapshot, OperationEvent};
use crate::store::{validate_name, RecordStore, StoreLimits};

use super::errors::{ExecutorError, ExecutorResult};
use super::result::{ReadOutcome, WriteOutcome};
use super::state::OperationState;

/// Default simulated I/O latency per operation
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_secs(1);

/// Configuration for the operation executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Simulated I/O latency inside each critical section
    pub processing_delay: Duration,
    /// Give up on admission after this long; wait forever when `None`
    pub admission_timeout: Option<Duration>,
    /// Reader/writer preference
    pub policy: AdmissionPolicy,
    /// Record store limits
    pub limits: StoreLimits,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            processing_delay: DEFAULT_PROCESSING_DELAY,
            admission_timeout: None,
            policy: AdmissionPolicy::default(),
            limits: StoreLimits::default(),
        }
    }
}

impl ExecutorConfig {
    /// Config with no simulated latency
    pub fn immediate() -> Self {
        Self {
            processing_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Set the simulated latency
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = delay;
        self
    }

    /// Set the admission timeout
    pub fn with_admission_timeout(mut self, timeout: Duration) -> Self {
        self.admission_timeout = Some(timeout);
        self
    }

    /// Set the admission policy
    pub fn with_policy(mut self, policy: AdmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the store limits
    pub fn with_limits(mut self, limits: StoreLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Runs reads and writes against the record store under the gates
pub struct OperationExecutor {
    config: ExecutorConfig,
    store: RecordStore,
    coordinator: Coordinator,
    metrics: MetricsRegistry,
    sink: Arc<dyn DiagnosticSink>,
}

impl OperationExecutor {
    /// Create an executor with an empty store and open gates
    pub fn new(config: ExecutorConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            store: RecordStore::with_limits(config.limits),
            coordinator: Coordinator::new(config.policy),
            metrics: MetricsRegistry::new(),
            sink,
            config,
        }
    }

    /// Read a record
    ///
    /// Fails with `NotFound` before admission if the name was never
    /// written.
    pub fn read(&self, name: &str) -> ExecutorResult<ReadOutcome> {
        let op_id = Uuid::new_v4();
        self.report(op_id, AccessMode::Read, name, OperationState::Requested, 0);

        let handle = match self.store.lookup(name) {
            Some(handle) => handle,
            None => {
                let err = ExecutorError::NotFound(name.to_string());
                return Err(self.fail(op_id, AccessMode::Read, name, err));
            }
        };

        let permit = self
            .coordinator
            .acquire_read(self.deadline())
            .map_err(|e| self.fail(op_id, AccessMode::Read, name, e.into()))?;
        self.report(op_id, AccessMode::Read, name, OperationState::Admitted, 0);

        let snapshot = self.store.snapshot(&handle);
        let occupancy = self.coordinator.occupancy();
        self.report(
            op_id,
            AccessMode::Read,
            name,
            OperationState::InCriticalSection,
            snapshot.size,
        );
        self.simulate_io();

        drop(permit);
        self.report(op_id, AccessMode::Read, name, OperationState::Released, snapshot.size);

        self.metrics.increment_reads_completed();
        self.report(op_id, AccessMode::Read, name, OperationState::Completed, snapshot.size);

        Ok(ReadOutcome {
            op_id,
            name: snapshot.name,
            content: snapshot.content,
            size: snapshot.size,
            occupancy,
        })
    }

    /// Append to a record, creating it on its first successful write
    pub fn write(&self, name: &str, payload: &[u8]) -> ExecutorResult<WriteOutcome> {
        let op_id = Uuid::new_v4();
        let bytes = payload.len();
        self.report(op_id, AccessMode::Write, name, OperationState::Requested, bytes);

        validate_name(name).map_err(|e| self.fail(op_id, AccessMode::Write, name, e.into()))?;

        let permit = self
            .coordinator
            .acquire_write(self.deadline())
            .map_err(|e| self.fail(op_id, AccessMode::Write, name, e.into()))?;
        let ticket = permit.ticket();
        self.report(op_id, AccessMode::Write, name, OperationState::Admitted, bytes);

        let occupancy = self.coordinator.occupancy();
        self.report(
            op_id,
            AccessMode::Write,
            name,
            OperationState::InCriticalSection,
            bytes,
        );
        self.simulate_io();
        let appended = self.store.append_or_create(name, payload);

        drop(permit);
        self.report(op_id, AccessMode::Write, name, OperationState::Released, bytes);

        let size = appended.map_err(|e| self.fail(op_id, AccessMode::Write, name, e.into()))?;

        self.metrics.record_write(bytes as u64);
        self.report(op_id, AccessMode::Write, name, OperationState::Completed, bytes);

        Ok(WriteOutcome {
            op_id,
            name: name.to_string(),
            bytes_appended: bytes,
            size,
            ticket,
            occupancy,
        })
    }

    /// Current gate occupancy
    pub fn occupancy(&self) -> Occupancy {
        self.coordinator.occupancy()
    }

    /// Snapshot of the operation counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(
            self.coordinator.exclusive_acquisitions(),
            self.coordinator.peak_readers(),
        )
    }

    /// Number of records in the store
    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    /// Active configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.admission_timeout.map(|t| Instant::now() + t)
    }

    fn simulate_io(&self) {
        if !self.config.processing_delay.is_zero() {
            thread::sleep(self.config.processing_delay);
        }
    }

    fn fail(&self, op_id: Uuid, mode: AccessMode, name: &str, err: ExecutorError) -> ExecutorError {
        match &err {
            ExecutorError::NotFound(_) => self.metrics.increment_reads_not_found(),
            ExecutorError::Admission(_) => self.metrics.increment_admission_timeouts(),
            ExecutorError::Store(_) => self.metrics.increment_writes_rejected(),
        }
        self.report(op_id, mode, name, OperationState::Failed(err.code()), 0);
        err
    }

    fn report(&self, op_id: Uuid, mode: AccessMode, name: &str, state: OperationState, bytes: usize) {
        self.sink.record(&OperationEvent {
            op_id,
            mode,
            name: name.to_string(),
            state,
            occupancy: self.coordinator.occupancy(),
            bytes,
        });
    }
}
