//! Path containment for untrusted file names and audited access to secret backends.
//!
//! This crate provides two independent utilities:
//! - **[`PathGuard`]**: resolves an untrusted file name against a fixed root,
//!   rejecting `..` traversal, absolute-path injection and symlink escapes
//! - **[`AuditedSecretStore`]**: wraps a key-value secret backend and writes
//!   exactly one audit record for every access attempt, success or failure
//!
//! # Core Types
//!
//! - [`Tainted<T>`]: Wrapper for untrusted input that must go through a guard
//! - [`ResolvedPath`]: Canonical path proven to be inside a guard's root
//! - [`Secret<T>`]: Wrapper that redacts secret values in logs and output
//! - [`SecretBackend`]: Capability interface adapters implement for a store
//! - [`audit::AuditSink`]: Append-only destination for [`audit::AuditRecord`]s
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use access_guard::{Accessor, AuditedSecretStore, InMemoryBackend, StoreError};
//! use access_guard::audit::{AuditOutcome, MemoryAuditSink};
//!
//! let trail = Arc::new(MemoryAuditSink::new());
//! let store = AuditedSecretStore::connect(InMemoryBackend::new(), Arc::clone(&trail));
//!
//! let err = store
//!     .get("myapp/database", &Accessor::new("automation_user"))
//!     .unwrap_err();
//! assert!(matches!(err, StoreError::NotFound { .. }));
//!
//! // The failed read was still audited.
//! assert_eq!(trail.records()[0].outcome(), AuditOutcome::Failure);
//! ```
//!
//! # Feature Flags
//!
//! - `vault`: [`VaultKvBackend`], a HashiCorp Vault KV v2 adapter

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod audit;
mod backend;
pub mod config;
pub mod demo;
mod error;
pub mod logging;
mod path_guard;
mod secret;
mod store;
mod tainted;
#[cfg(test)]
pub(crate) mod test_utils;
#[cfg(feature = "vault")]
mod vault;

pub use backend::{InMemoryBackend, SecretBackend};
pub use config::{AuditConfig, LogFormat, VaultConfig};
pub use error::{
    AuditSinkError, BackendFault, ConfigError, Error, LoggingError, PathError, Result, StoreError,
};
pub use path_guard::{PathGuard, ResolvedPath};
pub use secret::{Secret, SecretData};
pub use store::{Accessor, AuditedSecretStore};
pub use tainted::Tainted;
#[cfg(feature = "vault")]
#[cfg_attr(docsrs, doc(cfg(feature = "vault")))]
pub use vault::VaultKvBackend;
