//! Record store
//!
//! Maps record names to append-only records. The directory has its own
//! lock, separate from the reader and writer gates: readers look names up before
//! admission while a writer may be inserting from its critical section.
//!
//! The store performs no admission control. Record content must only be
//! touched while holding a permit from `crate::gate::Coordinator`.

mod errors;
mod record;

pub use errors::{StoreError, StoreResult};
pub use record::{Record, RecordHandle, RecordSnapshot};

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Optional size limits for the store
///
/// Unlimited by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreLimits {
    /// Maximum number of records in the directory
    pub max_records: Option<usize>,
    /// Maximum content length of a single record
    pub max_record_bytes: Option<usize>,
}

/// In-memory directory of named records
#[derive(Debug, Default)]
pub struct RecordStore {
    directory: Mutex<HashMap<String, RecordHandle>>,
    limits: StoreLimits,
}

impl RecordStore {
    /// Create an empty, unlimited store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with limits
    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            directory: Mutex::new(HashMap::new()),
            limits,
        }
    }

    /// Configured limits
    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    fn directory(&self) -> MutexGuard<'_, HashMap<String, RecordHandle>> {
        self.directory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find a record by name
    pub fn lookup(&self, name: &str) -> Option<RecordHandle> {
        self.directory().get(name).cloned()
    }

    /// Find a record by name, creating an empty one if absent
    pub fn get_or_create(&self, name: &str) -> StoreResult<RecordHandle> {
        validate_name(name)?;

        let mut directory = self.directory();
        if let Some(handle) = directory.get(name) {
            return Ok(handle.clone());
        }

        if let Some(limit) = self.limits.max_records {
            if directory.len() >= limit {
                return Err(StoreError::CapacityExceeded { limit });
            }
        }

        let handle = RecordHandle::new(Record::new(name));
        directory.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Append payload bytes to a record, returning its new size
    ///
    /// On `RecordTooLarge` the record is left unchanged.
    pub fn append(&self, handle: &RecordHandle, payload: &[u8]) -> StoreResult<usize> {
        let mut record = handle.write();
        self.check_size(record.name(), record.size() + payload.len())?;
        Ok(record.append(payload))
    }

    /// Append to `name`, creating the record only if the payload fits
    ///
    /// A name becomes present on its first successful write. A write that
    /// fails leaves the directory exactly as it was.
    pub fn append_or_create(&self, name: &str, payload: &[u8]) -> StoreResult<usize> {
        let handle = match self.lookup(name) {
            Some(handle) => handle,
            None => {
                self.check_size(name, payload.len())?;
                self.get_or_create(name)?
            }
        };
        self.append(&handle, payload)
    }

    fn check_size(&self, name: &str, attempted: usize) -> StoreResult<()> {
        match self.limits.max_record_bytes {
            Some(limit) if attempted > limit => Err(StoreError::RecordTooLarge {
                name: name.to_string(),
                attempted,
                limit,
            }),
            _ => Ok(()),
        }
    }

    /// Copy a record's current name, content and size
    pub fn snapshot(&self, handle: &RecordHandle) -> RecordSnapshot {
        RecordSnapshot::from(&*handle.read())
    }

    /// Number of records in the directory
    pub fn len(&self) -> usize {
        self.directory().len()
    }

    /// Whether the directory is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Names are whitespace-free tokens
pub fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}
