//! Error taxonomy for path resolution, secret access and the ambient layers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`PathGuard`](crate::PathGuard).
///
/// `AccessDenied` deliberately carries no detail: a caller cannot tell whether
/// the name pointed outside the root or simply does not exist.
#[derive(Debug, Error)]
pub enum PathError {
    /// The requested name is malformed (empty, `.`, `..`, or contains NUL).
    #[error("invalid file name")]
    InvalidName,

    /// The requested name does not resolve to a file inside the root.
    #[error("access denied")]
    AccessDenied,

    /// The root directory could not be canonicalized or is not a directory.
    #[error("root directory unavailable: {}", .path.display())]
    RootUnavailable {
        /// The root as supplied by the caller.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}

/// Errors returned by [`AuditedSecretStore`](crate::AuditedSecretStore).
///
/// This is the stable taxonomy callers match on; backend-specific failures are
/// translated into it and never surface directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend failed authentication at construction; the store is disabled.
    #[error("secret backend unavailable")]
    BackendUnavailable,

    /// No secret exists at the given path.
    #[error("secret not found: {path}")]
    NotFound {
        /// The secret path that was requested.
        path: String,
    },

    /// The backend rejected or failed the operation.
    #[error("secret backend error at {path}: {reason}")]
    BackendError {
        /// The secret path the operation targeted.
        path: String,
        /// Backend-independent description of the failure.
        reason: String,
    },
}

/// Failure reported by a [`SecretBackend`](crate::SecretBackend) adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendFault {
    /// The backend has no secret at the path.
    #[error("not found")]
    NotFound,

    /// Credentials were rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The secret path cannot be addressed by this backend, e.g. it has an
    /// empty, `.` or `..` segment.
    #[error("invalid secret path")]
    InvalidPath,

    /// Any other transport or protocol failure.
    #[error("transport failure: {reason}")]
    Transport {
        /// Description of the failure.
        reason: String,
    },
}

impl BackendFault {
    /// Creates a transport fault from any displayable reason.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }
}

/// Errors raised while writing an audit record to a sink.
#[derive(Debug, Error)]
pub enum AuditSinkError {
    /// The underlying writer failed.
    #[error("audit sink I/O error: {0}")]
    Io(#[from] io::Error),

    /// The record could not be encoded.
    #[error("audit record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {name}")]
    MissingVar {
        /// Variable name.
        name: &'static str,
    },

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// The global tracing subscriber could not be installed.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {reason}")]
pub struct LoggingError {
    pub(crate) reason: String,
}

/// Crate-level error wrapping every component error.
#[derive(Debug, Error)]
pub enum Error {
    /// Path resolution failed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Secret access failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An audit sink could not be opened.
    #[error(transparent)]
    AuditSink(#[from] AuditSinkError),

    /// The tracing subscriber could not be installed.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Reading a resolved file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
