//! Record representation
//!
//! A record is created empty on the first write to its name and only ever
//! grows by appending. Records are never deleted.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

/// A named, append-only byte record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    name: String,
    content: Vec<u8>,
}

impl Record {
    /// Create an empty record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Vec::new(),
        }
    }

    /// Record name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record content
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content length in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Append payload bytes, returning the new size
    pub fn append(&mut self, payload: &[u8]) -> usize {
        self.content.extend_from_slice(payload);
        self.content.len()
    }
}

/// Shared reference to a record in the directory
///
/// Content sits behind a per-record `RwLock`. Access through the admission
/// gates never contends on it.
#[derive(Debug, Clone)]
pub struct RecordHandle {
    inner: Arc<RwLock<Record>>,
}

impl RecordHandle {
    pub(crate) fn new(record: Record) -> Self {
        Self {
            inner: Arc::new(RwLock::new(record)),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Record> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Record> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether two handles point at the same record
    pub fn same_record(&self, other: &RecordHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Point-in-time copy of a record taken inside a critical section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSnapshot {
    /// Record name
    pub name: String,
    /// Content at the time of the snapshot
    pub content: Vec<u8>,
    /// Content length in bytes
    pub size: usize,
}

impl From<&Record> for RecordSnapshot {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            content: record.content.clone(),
            size: record.size(),
        }
    }
}
