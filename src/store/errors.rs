//! Record store error types
//!
//! Error codes:
//! - RWSTORE_INVALID_NAME
//! - RWSTORE_CAPACITY_EXCEEDED
//! - RWSTORE_RECORD_TOO_LARGE
//!
//! A missing record is not an error at this layer: `lookup` returns `None`
//! and callers decide what absence means.

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Name is empty or contains whitespace
    #[error("Invalid record name: {0:?}")]
    InvalidName(String),

    /// Directory already holds the maximum number of records
    #[error("Record store is full ({limit} records)")]
    CapacityExceeded {
        /// Configured maximum record count
        limit: usize,
    },

    /// Append would grow the record past the configured size
    #[error("Record {name} would grow to {attempted} bytes (limit {limit})")]
    RecordTooLarge {
        /// Record name
        name: String,
        /// Size the record would have reached
        attempted: usize,
        /// Configured maximum record size
        limit: usize,
    },
}

impl StoreError {
    /// Returns the stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidName(_) => "RWSTORE_INVALID_NAME",
            StoreError::CapacityExceeded { .. } => "RWSTORE_CAPACITY_EXCEEDED",
            StoreError::RecordTooLarge { .. } => "RWSTORE_RECORD_TOO_LARGE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::InvalidName(String::new()).code(), "RWSTORE_INVALID_NAME");
        assert_eq!(
            StoreError::CapacityExceeded { limit: 1 }.code(),
            "RWSTORE_CAPACITY_EXCEEDED"
        );
    }

    #[test]
    fn test_too_large_display() {
        let err = StoreError::RecordTooLarge {
            name: "f".into(),
            attempted: 12,
            limit: 10,
        };
        let display = err.to_string();
        assert!(display.contains("12"));
        assert!(display.contains("limit 10"));
    }
}
