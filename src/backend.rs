//! Capability interface to an external secret store.
//!
//! [`AuditedSecretStore`](crate::AuditedSecretStore) talks to its backend only
//! through [`SecretBackend`], so it has no compile-time dependency on any
//! vendor SDK. Supporting a new store means writing an adapter; the audit
//! logic is untouched.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::BackendFault;
use crate::SecretData;

/// Minimal set of primitives an external secret store must provide.
///
/// Adapters own their connection and may serialize requests internally.
pub trait SecretBackend: Send + Sync {
    /// Validates the session credentials.
    ///
    /// Called exactly once, when the store is constructed.
    fn authenticate(&self) -> Result<(), BackendFault>;

    /// Reads the current value at `path`.
    fn read_secret(&self, path: &str) -> Result<SecretData, BackendFault>;

    /// Creates or replaces the value at `path`.
    fn write_secret(&self, path: &str, data: &SecretData) -> Result<(), BackendFault>;

    /// Deletes the value at `path` with all its history.
    fn delete_secret(&self, path: &str) -> Result<(), BackendFault>;
}

impl<B: SecretBackend + ?Sized> SecretBackend for Arc<B> {
    fn authenticate(&self) -> Result<(), BackendFault> {
        (**self).authenticate()
    }

    fn read_secret(&self, path: &str) -> Result<SecretData, BackendFault> {
        (**self).read_secret(path)
    }

    fn write_secret(&self, path: &str, data: &SecretData) -> Result<(), BackendFault> {
        (**self).write_secret(path, data)
    }

    fn delete_secret(&self, path: &str) -> Result<(), BackendFault> {
        (**self).delete_secret(path)
    }
}

/// Process-local backend keeping secrets in a map.
///
/// Useful for development and tests. Authentication always succeeds.
///
/// # Example
///
/// ```
/// use access_guard::{InMemoryBackend, SecretBackend, SecretData};
///
/// let backend = InMemoryBackend::new();
/// let mut data = SecretData::new();
/// data.insert("password".to_string(), "s3cr3t".to_string());
///
/// backend.write_secret("myapp/database", &data).unwrap();
/// assert_eq!(backend.read_secret("myapp/database").unwrap(), data);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    secrets: RwLock<HashMap<String, SecretData>>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored secrets.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no secrets are stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SecretData>> {
        self.secrets.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SecretData>> {
        self.secrets.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecretBackend for InMemoryBackend {
    fn authenticate(&self) -> Result<(), BackendFault> {
        Ok(())
    }

    fn read_secret(&self, path: &str) -> Result<SecretData, BackendFault> {
        self.read().get(path).cloned().ok_or(BackendFault::NotFound)
    }

    fn write_secret(&self, path: &str, data: &SecretData) -> Result<(), BackendFault> {
        self.write().insert(path.to_string(), data.clone());
        Ok(())
    }

    fn delete_secret(&self, path: &str) -> Result<(), BackendFault> {
        self.write()
            .remove(path)
            .map(|_| ())
            .ok_or(BackendFault::NotFound)
    }
}
