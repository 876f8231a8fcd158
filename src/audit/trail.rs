//! In-memory audit sink.
//!
//! This module provides a simple in-memory audit recorder for tests and
//! local development.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{AuditRecord, AuditSink};
use crate::error::AuditSinkError;

/// In-memory recorder for audit records.
///
/// Stores records in a vector in the order they were written. In production
/// you would use [`JsonLinesAuditSink`](super::JsonLinesAuditSink) or
/// [`TracingAuditSink`](super::TracingAuditSink) instead.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use access_guard::{Accessor, AuditedSecretStore, InMemoryBackend};
/// use access_guard::audit::MemoryAuditSink;
///
/// let trail = Arc::new(MemoryAuditSink::new());
/// let store = AuditedSecretStore::connect(InMemoryBackend::new(), Arc::clone(&trail));
///
/// let _ = store.get("myapp/database", &Accessor::new("automation_user"));
///
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AuditRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of all recorded entries.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.lock().clone()
    }

    /// Returns the number of recorded entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Clears all recorded entries.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn write(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        self.lock().push(record.clone());
        Ok(())
    }
}
