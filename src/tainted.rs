use std::fmt;

/// A wrapper for untrusted input that must pass through a guard before use.
///
/// `Tainted<T>` marks data from untrusted sources (request parameters, form
/// fields, archive entries) and keeps it from being used as a path or key by
/// accident. The value is only reachable from inside this crate, so the only
/// way to turn a tainted file name into something usable is
/// [`PathGuard::resolve`](crate::PathGuard::resolve).
///
/// # Security Properties
///
/// - Does NOT implement `Deref`, `AsRef`, or any implicit conversion
/// - Inner value is inaccessible to external code
///
/// # Examples
///
/// ```
/// use access_guard::Tainted;
///
/// let filename = Tainted::new("../../etc/passwd");
///
/// // Debug output shows it's tainted (for development)
/// println!("{:?}", filename);
///
/// // But it cannot be joined onto a path directly:
/// // std::path::Path::new("/app/uploads").join(filename); // Won't compile!
/// ```
// BREAKING CHANGE WARNING: Do NOT remove Clone - callers retry resolution with the same input.
#[derive(Clone)]
pub struct Tainted<T> {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // Making it public lets callers build paths from unvalidated names (CWE-22).
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an untrusted value in `Tainted`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the inner value for validation.
    ///
    /// `pub(crate)` so that only guards in this crate can inspect the raw
    /// value before producing a proven result.
    pub(crate) fn peek(&self) -> &T {
        &self.inner
    }
}

// BREAKING CHANGE WARNING: Do NOT add Deref, AsRef, Borrow, From<T>, Into<T>, or any other
// implicit conversion traits to Tainted<T>. They would let untrusted names reach the
// filesystem without going through PathGuard.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}
