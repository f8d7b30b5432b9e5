//! Operation executor
//!
//! Performs reads and appends against the record store between gate
//! acquisition and release, and reports each operation's progress.

mod errors;
mod executor;
mod result;
mod state;

pub use errors::{ExecutorError, ExecutorResult};
pub use executor::{ExecutorConfig, OperationExecutor, DEFAULT_PROCESSING_DELAY};
pub use result::{ReadOutcome, WriteOutcome};
pub use state::OperationState;
