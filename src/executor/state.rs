//! Operation lifecycle
//!
//! Requested -> Admitted -> InCriticalSection -> Released -> Completed
//!
//! `Failed` follows `Requested` for an absent name, a rejected name or an
//! admission timeout. A write whose append exceeds the record size limit
//! fails after `Released`.

/// State of one read or write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Received, not yet admitted
    Requested,
    /// Passed the admission gate
    Admitted,
    /// Touching the record
    InCriticalSection,
    /// Gate released
    Released,
    /// Finished successfully
    Completed,
    /// Finished with the given error code
    Failed(&'static str),
}

impl OperationState {
    /// Returns the state name string
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationState::Requested => "REQUESTED",
            OperationState::Admitted => "ADMITTED",
            OperationState::InCriticalSection => "IN_CRITICAL_SECTION",
            OperationState::Released => "RELEASED",
            OperationState::Completed => "COMPLETED",
            OperationState::Failed(_) => "FAILED",
        }
    }

    /// Whether no further transition follows
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Completed | OperationState::Failed(_))
    }
}
