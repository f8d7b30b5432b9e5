//! Admission gate errors
//!
//! Blocking waits are transparent to callers. The only failure is an
//! expired deadline, which leaves the coordination state as it was before
//! the attempt.

use std::time::Duration;

use thiserror::Error;

use super::AccessMode;

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;

/// Admission gate errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// Deadline passed before the gate admitted the caller
    #[error("{mode} admission timed out after {waited:?}")]
    AdmissionTimeout {
        /// Requested access mode
        mode: AccessMode,
        /// Time spent waiting
        waited: Duration,
    },
}

impl GateError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            GateError::AdmissionTimeout { .. } => "RWSTORE_ADMISSION_TIMEOUT",
        }
    }
}
