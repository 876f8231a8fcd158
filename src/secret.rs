use std::collections::BTreeMap;
use std::fmt;

/// Key/value payload stored at one secret path (e.g. `{"api_key": "..."}`).
pub type SecretData = BTreeMap<String, String>;

/// A wrapper that keeps secret material out of logs and error messages.
///
/// Values read from or written to the secret backend travel as `Secret<T>`.
/// Formatting always prints `[REDACTED]`, so a secret that ends up in a
/// `tracing` field or a `{:?}` by mistake stays hidden. The wrapped value is
/// reachable only through [`expose_secret`](Self::expose_secret).
///
/// # Examples
///
/// ```
/// use access_guard::{Secret, SecretData};
///
/// let mut data = SecretData::new();
/// data.insert("api_key".to_string(), "secret-api-key-123".to_string());
/// let value = Secret::new(data);
///
/// assert_eq!(format!("{:?}", value), "[REDACTED]");
/// assert_eq!(value.expose_secret()["api_key"], "secret-api-key-123");
/// ```
// BREAKING CHANGE WARNING: Do NOT add Clone, Copy, or Default derives.
// Secrets should move, not multiply.
pub struct Secret<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private (CWE-532).
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// The name is intentionally loud; never pass the result to a logger.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }

    /// Consumes the wrapper and returns the secret value.
    pub fn into_exposed(self) -> T {
        self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    /// BREAKING CHANGE WARNING: This MUST unconditionally return "[REDACTED]".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    /// BREAKING CHANGE WARNING: This MUST unconditionally return "[REDACTED]".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}
