//! Operation results

use serde::Serialize;
use uuid::Uuid;

use crate::gate::Occupancy;

/// Result of a completed read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOutcome {
    /// Operation id, as reported to the diagnostic sink
    pub op_id: Uuid,
    /// Record name
    pub name: String,
    /// Content snapshot taken inside the critical section
    pub content: Vec<u8>,
    /// Content length in bytes
    pub size: usize,
    /// Occupancy at the time of the read
    pub occupancy: Occupancy,
}

impl ReadOutcome {
    /// Content as text, replacing invalid UTF-8
    pub fn content_lossy(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Result of a completed write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    /// Operation id, as reported to the diagnostic sink
    pub op_id: Uuid,
    /// Record name
    pub name: String,
    /// Bytes appended by this write
    pub bytes_appended: usize,
    /// Record size after the append
    pub size: usize,
    /// Admission order among writers
    pub ticket: u64,
    /// Occupancy at the time of the write
    pub occupancy: Occupancy,
}
