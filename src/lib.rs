//! rwstore - concurrent readers-writers record store
//!
//! Many readers or one writer at a time over an in-memory store of named,
//! append-only records. Writers are admitted in arrival order.
//!
//! ```ignore
//! use std::sync::Arc;
//! use rwstore::executor::{ExecutorConfig, OperationExecutor};
//! use rwstore::observability::NullSink;
//!
//! let executor = OperationExecutor::new(ExecutorConfig::immediate(), Arc::new(NullSink));
//! executor.write("notes", b"ab")?;
//! executor.write("notes", b"cd")?;
//! assert_eq!(executor.read("notes")?.content, b"abcd");
//! ```

pub mod cli;
pub mod config;
pub mod executor;
pub mod gate;
pub mod observability;
pub mod store;
