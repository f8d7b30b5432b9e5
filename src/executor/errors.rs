//! Operation executor errors
//!
//! Error codes:
//! - RWSTORE_NOT_FOUND: read against a name that was never written
//! - RWSTORE_ADMISSION_TIMEOUT: gate deadline expired
//! - RWSTORE_INVALID_NAME, RWSTORE_CAPACITY_EXCEEDED, RWSTORE_RECORD_TOO_LARGE:
//!   rejected by the record store
//!
//! None of them leave coordination state changed.

use thiserror::Error;

use crate::gate::GateError;
use crate::store::StoreError;

/// Result type for executor operations
pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Operation executor errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    /// No record with this name exists
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Admission deadline expired
    #[error(transparent)]
    Admission(#[from] GateError),

    /// Record store refused the operation
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExecutorError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            ExecutorError::NotFound(_) => "RWSTORE_NOT_FOUND",
            ExecutorError::Admission(e) => e.code(),
            ExecutorError::Store(e) => e.code(),
        }
    }
}
