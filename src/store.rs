//! Audited access to a secret backend.
//!
//! Every `get`, `put` and `delete` on [`AuditedSecretStore`] writes exactly
//! one [`AuditRecord`] before it returns, whatever the outcome:
//!
//! ```text
//! disabled?  ── yes ──> record(failure) ──> Err(BackendUnavailable)
//!     │ no
//!     ▼
//! backend call ── ok ──> record(success) ──> Ok(value)
//!     │ err
//!     ▼
//! record(failure) ──> Err(translated StoreError)
//! ```

use std::fmt;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::audit::{AuditClock, AuditOutcome, AuditRecord, AuditSink, SecretAction};
use crate::backend::SecretBackend;
use crate::error::{BackendFault, StoreError};
use crate::{Secret, SecretData};

/// Who is attempting a secret access, and from where.
///
/// # Example
///
/// ```
/// use access_guard::Accessor;
///
/// let accessor = Accessor::new("admin_user").with_origin("192.168.1.101".parse().unwrap());
/// assert_eq!(accessor.actor(), "admin_user");
/// assert!(accessor.origin().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    actor: String,
    origin: Option<IpAddr>,
}

impl Accessor {
    /// Creates an accessor with no known origin.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            origin: None,
        }
    }

    /// Sets the caller's network origin.
    pub fn with_origin(mut self, origin: IpAddr) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Returns the actor identity.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Returns the caller's network origin, if known.
    pub fn origin(&self) -> Option<IpAddr> {
        self.origin
    }
}

/// Wraps a [`SecretBackend`] and audits every access attempt to an [`AuditSink`].
///
/// The backend is authenticated once in [`connect`](Self::connect). If that
/// fails the store is permanently disabled: every call is audited as a
/// failure and returns [`StoreError::BackendUnavailable`] without touching
/// the backend again.
///
/// The store is `Send + Sync` when its backend and sink are; share it behind
/// an `Arc`. Availability never changes after construction, so operations
/// take no lock besides the short one that orders audit records.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use access_guard::{Accessor, AuditedSecretStore, InMemoryBackend, Secret, SecretData};
/// use access_guard::audit::{AuditOutcome, MemoryAuditSink};
///
/// let trail = Arc::new(MemoryAuditSink::new());
/// let store = AuditedSecretStore::connect(InMemoryBackend::new(), Arc::clone(&trail));
/// let admin = Accessor::new("admin_user");
///
/// let mut data = SecretData::new();
/// data.insert("api_key".to_string(), "secret-api-key-123".to_string());
/// store.put("myapp/api", Secret::new(data), &admin).unwrap();
///
/// let value = store.get("myapp/api", &admin).unwrap();
/// assert_eq!(value.expose_secret()["api_key"], "secret-api-key-123");
///
/// let records = trail.records();
/// assert_eq!(records.len(), 2);
/// assert!(records.iter().all(|r| r.outcome() == AuditOutcome::Success));
/// ```
pub struct AuditedSecretStore<B, S> {
    backend: B,
    available: bool,
    sink: S,
    clock: AuditClock,
    audit_failures: AtomicU64,
}

impl<B: SecretBackend, S: AuditSink> AuditedSecretStore<B, S> {
    /// Authenticates `backend` once and builds the store.
    ///
    /// Never fails: an authentication failure yields a disabled store, which
    /// can be detected with [`is_available`](Self::is_available).
    pub fn connect(backend: B, sink: S) -> Self {
        let available = match backend.authenticate() {
            Ok(()) => {
                tracing::info!("secret backend authenticated");
                true
            }
            Err(fault) => {
                tracing::warn!(error = %fault, "secret backend authentication failed; store disabled");
                false
            }
        };

        Self {
            backend,
            available,
            sink,
            clock: AuditClock::new(),
            audit_failures: AtomicU64::new(0),
        }
    }

    /// Returns whether the backend authenticated at construction.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Number of audit records the sink failed to accept.
    pub fn audit_failures(&self) -> u64 {
        self.audit_failures.load(Ordering::Relaxed)
    }

    /// Reads the secret at `path`.
    ///
    /// # Errors
    ///
    /// [`StoreError::BackendUnavailable`], [`StoreError::NotFound`] or
    /// [`StoreError::BackendError`].
    pub fn get(&self, path: &str, accessor: &Accessor) -> Result<Secret<SecretData>, StoreError> {
        self.attempt(path, accessor, SecretAction::Read, |backend| {
            backend.read_secret(path)
        })
        .map(Secret::new)
    }

    /// Creates or replaces the secret at `path`.
    ///
    /// The value is never audited or logged.
    ///
    /// # Errors
    ///
    /// [`StoreError::BackendUnavailable`] or [`StoreError::BackendError`].
    pub fn put(
        &self,
        path: &str,
        value: Secret<SecretData>,
        accessor: &Accessor,
    ) -> Result<(), StoreError> {
        self.attempt(path, accessor, SecretAction::Write, |backend| {
            backend.write_secret(path, value.expose_secret())
        })
    }

    /// Deletes the secret at `path` with all its versions.
    ///
    /// # Errors
    ///
    /// [`StoreError::BackendUnavailable`], [`StoreError::NotFound`] or
    /// [`StoreError::BackendError`].
    pub fn delete(&self, path: &str, accessor: &Accessor) -> Result<(), StoreError> {
        self.attempt(path, accessor, SecretAction::Delete, |backend| {
            backend.delete_secret(path)
        })
    }

    fn attempt<T>(
        &self,
        path: &str,
        accessor: &Accessor,
        action: SecretAction,
        call: impl FnOnce(&B) -> Result<T, BackendFault>,
    ) -> Result<T, StoreError> {
        let result = if self.available {
            call(&self.backend).map_err(|fault| translate(action, path, fault))
        } else {
            Err(StoreError::BackendUnavailable)
        };

        let outcome = match result {
            Ok(_) => AuditOutcome::Success,
            Err(_) => AuditOutcome::Failure,
        };
        self.audit(path, accessor, action, outcome);

        result
    }

    /// Writes one record; a sink failure is reported and counted, never returned.
    fn audit(&self, path: &str, accessor: &Accessor, action: SecretAction, outcome: AuditOutcome) {
        let written = self.clock.issue(
            |sequence, timestamp| {
                AuditRecord::new(
                    sequence,
                    timestamp,
                    accessor.actor(),
                    path,
                    action,
                    outcome,
                    accessor.origin(),
                )
            },
            |record| {
                self.sink
                    .write(record)
                    .map_err(|error| (record.sequence(), error))
            },
        );

        if let Err((sequence, error)) = written {
            self.audit_failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                sequence,
                secret_path = %path,
                action = %action,
                outcome = %outcome,
                error = %error,
                "failed to write audit record"
            );
        }
    }
}

fn translate(action: SecretAction, path: &str, fault: BackendFault) -> StoreError {
    match (action, fault) {
        (SecretAction::Read | SecretAction::Delete, BackendFault::NotFound) => {
            StoreError::NotFound {
                path: path.to_string(),
            }
        }
        (_, fault) => StoreError::BackendError {
            path: path.to_string(),
            reason: fault.to_string(),
        },
    }
}

impl<B, S> fmt::Debug for AuditedSecretStore<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditedSecretStore")
            .field("available", &self.available)
            .field("audit_failures", &self.audit_failures.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
