//! Containment of untrusted file names inside a fixed root directory.
//!
//! [`PathGuard`] turns a [`Tainted`] file name into a [`ResolvedPath`], a
//! canonical path proven to live strictly below the guard's root. The proof
//! rests on two steps that are never skipped:
//!
//! 1. Only the last path segment of the request is kept, which removes `../`
//!    sequences and absolute prefixes without any substring blacklist.
//! 2. The joined candidate is canonicalized and compared component-wise with
//!    the canonical root, which catches symlinks that point elsewhere.
//!
//! # Example
//!
//! ```
//! use access_guard::{PathError, PathGuard, Tainted};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let uploads = tempfile::tempdir()?;
//! std::fs::write(uploads.path().join("report.pdf"), b"%PDF")?;
//!
//! let guard = PathGuard::new(uploads.path())?;
//!
//! let resolved = guard.resolve(Tainted::new("report.pdf"))?;
//! assert!(resolved.as_path().starts_with(guard.root()));
//!
//! // Traversal collapses to "passwd", which does not exist under the root.
//! let err = guard.resolve(Tainted::new("../../etc/passwd")).unwrap_err();
//! assert!(matches!(err, PathError::AccessDenied));
//! # Ok(()) }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::PathError;
use crate::Tainted;

/// Resolves untrusted file names against a canonical root directory.
///
/// The guard holds no mutable state and is `Send + Sync`; share one instance
/// across threads freely.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Creates a guard rooted at `root`.
    ///
    /// The root is canonicalized once here and must be an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::RootUnavailable`] if the root cannot be
    /// canonicalized or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, PathError> {
        let supplied = root.as_ref();
        let canonical =
            std::fs::canonicalize(supplied).map_err(|source| PathError::RootUnavailable {
                path: supplied.to_path_buf(),
                source,
            })?;

        if !canonical.is_dir() {
            return Err(PathError::RootUnavailable {
                path: supplied.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "root is not a directory",
                ),
            });
        }

        tracing::debug!(root = %canonical.display(), "path guard initialised");
        Ok(Self { root: canonical })
    }

    /// Returns the canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an untrusted file name to a path inside the root.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidName`] if the last segment of the name is empty,
    ///   `.`, `..`, or contains a NUL byte.
    /// - [`PathError::AccessDenied`] if the candidate cannot be canonicalized
    ///   (missing, unreadable, symlink loop) or lands outside the root or on
    ///   the root itself.
    pub fn resolve<S: AsRef<str>>(&self, requested: Tainted<S>) -> Result<ResolvedPath, PathError> {
        let segment = final_segment(requested.peek().as_ref());

        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\0') {
            return Err(PathError::InvalidName);
        }

        let candidate = self.root.join(segment);

        // Mandatory even for a single segment: it may be a symlink.
        let canonical = match std::fs::canonicalize(&candidate) {
            Ok(path) => path,
            Err(err) => {
                tracing::debug!(
                    candidate = %candidate.display(),
                    error = %err,
                    "rejecting name that does not canonicalize"
                );
                return Err(PathError::AccessDenied);
            }
        };

        if !self.contains(&canonical) {
            tracing::debug!(
                root = %self.root.display(),
                resolved = %canonical.display(),
                "rejecting name that resolves outside root"
            );
            return Err(PathError::AccessDenied);
        }

        Ok(ResolvedPath { inner: canonical })
    }

    /// Component-wise strict descendant check against the canonical root.
    fn contains(&self, canonical: &Path) -> bool {
        canonical != self.root && canonical.starts_with(&self.root)
    }
}

/// Returns the text after the last `/` or `\`.
///
/// Both separators count on every platform so that Windows-style traversal
/// sent to a Unix host collapses the same way.
fn final_segment(requested: &str) -> &str {
    match requested.rfind(['/', '\\']) {
        Some(idx) => &requested[idx + 1..],
        None => requested,
    }
}

/// A canonical path proven to be strictly inside a [`PathGuard`] root.
///
/// There is no public constructor; the only source of a `ResolvedPath` is
/// [`PathGuard::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    // BREAKING CHANGE WARNING: This field MUST remain private.
    // A public field allows forging a "resolved" path that was never checked (CWE-22).
    inner: PathBuf,
}

impl ResolvedPath {
    /// Borrows the resolved path.
    pub fn as_path(&self) -> &Path {
        &self.inner
    }

    /// Consumes the wrapper and returns the owned path.
    pub fn into_path_buf(self) -> PathBuf {
        self.inner
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.inner
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn uploads() -> (tempfile::TempDir, PathGuard) {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("report.pdf"), b"%PDF-1.7").expect("write fixture");
        let guard = PathGuard::new(dir.path()).expect("guard");
        (dir, guard)
    }

    #[test]
    fn final_segment_takes_last_component() {
        assert_eq!(final_segment("report.pdf"), "report.pdf");
        assert_eq!(final_segment("../../etc/passwd"), "passwd");
        assert_eq!(final_segment("/etc/passwd"), "passwd");
        assert_eq!(final_segment("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(final_segment("dir/"), "");
        assert_eq!(final_segment("a/.."), "..");
    }

    #[test]
    fn resolves_existing_file() {
        let (dir, guard) = uploads();

        let resolved = guard.resolve(Tainted::new("report.pdf")).expect("should resolve");

        let expected = fs::canonicalize(dir.path().join("report.pdf")).unwrap();
        assert_eq!(resolved.as_path(), expected);
        assert_eq!(resolved.to_string(), expected.display().to_string());
    }

    #[test]
    fn traversal_collapses_to_last_segment() {
        let (_dir, guard) = uploads();

        let resolved = guard
            .resolve(Tainted::new("../../report.pdf"))
            .expect("collapses to report.pdf");
        assert!(resolved.as_path().ends_with("report.pdf"));

        let err = guard.resolve(Tainted::new("../../etc/passwd")).unwrap_err();
        assert!(matches!(err, PathError::AccessDenied));
    }

    #[test]
    fn absolute_prefix_is_stripped() {
        let (_dir, guard) = uploads();

        let resolved = guard
            .resolve(Tainted::new("/var/www/report.pdf"))
            .expect("absolute prefix stripped");
        assert!(resolved.as_path().starts_with(guard.root()));
    }

    #[test]
    fn sentinel_and_empty_names_are_invalid() {
        let (_dir, guard) = uploads();

        for name in ["", ".", "..", "uploads/", "a/..", "../", "x\\.", "bad\0name"] {
            let err = guard.resolve(Tainted::new(name)).unwrap_err();
            assert!(
                matches!(err, PathError::InvalidName),
                "expected InvalidName for {name:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn missing_file_is_access_denied() {
        let (_dir, guard) = uploads();

        let err = guard.resolve(Tainted::new("missing.txt")).unwrap_err();
        assert!(matches!(err, PathError::AccessDenied));
    }

    #[test]
    fn subdirectory_is_a_descendant() {
        let (dir, guard) = uploads();
        fs::create_dir(dir.path().join("archive")).unwrap();

        let resolved = guard.resolve(Tainted::new("archive")).expect("directory entry");
        assert!(resolved.as_path().starts_with(guard.root()));
        assert_ne!(resolved.as_path(), guard.root());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_outside_root_is_denied() {
        let (dir, guard) = uploads();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("passwd"), b"root:x:0:0").unwrap();
        std::os::unix::fs::symlink(outside.path().join("passwd"), dir.path().join("link"))
            .unwrap();

        let err = guard.resolve(Tainted::new("link")).unwrap_err();
        assert!(matches!(err, PathError::AccessDenied));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_root_itself_is_denied() {
        let (dir, guard) = uploads();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("self")).unwrap();

        let err = guard.resolve(Tainted::new("self")).unwrap_err();
        assert!(matches!(err, PathError::AccessDenied));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_inside_root_is_allowed() {
        let (dir, guard) = uploads();
        std::os::unix::fs::symlink(dir.path().join("report.pdf"), dir.path().join("latest"))
            .unwrap();

        let resolved = guard.resolve(Tainted::new("latest")).expect("internal link");
        assert!(resolved.as_path().ends_with("report.pdf"));
    }

    #[cfg(unix)]
    #[test]
    fn sibling_directory_with_shared_prefix_is_denied() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("uploads");
        let evil = parent.path().join("uploads-evil");
        fs::create_dir(&root).unwrap();
        fs::create_dir(&evil).unwrap();
        fs::write(evil.join("payload"), b"x").unwrap();
        std::os::unix::fs::symlink(evil.join("payload"), root.join("payload")).unwrap();

        let guard = PathGuard::new(&root).unwrap();
        let err = guard.resolve(Tainted::new("payload")).unwrap_err();
        assert!(matches!(err, PathError::AccessDenied));
    }

    #[test]
    fn root_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = PathGuard::new(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, PathError::RootUnavailable { .. }));
    }

    #[test]
    fn root_must_be_a_directory() {
        let (dir, _guard) = uploads();
        let err = PathGuard::new(dir.path().join("report.pdf")).unwrap_err();
        assert!(matches!(err, PathError::RootUnavailable { .. }));
    }

    #[test]
    fn resolution_is_idempotent() {
        let (_dir, guard) = uploads();

        let first = guard.resolve(Tainted::new("report.pdf")).unwrap();
        let second = guard.resolve(Tainted::new("report.pdf")).unwrap();
        assert_eq!(first, second);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_hostile_name() -> impl Strategy<Value = String> {
            (
                prop::collection::vec(prop_oneof![Just(".."), Just("."), Just("etc"), Just("")], 0..5),
                prop_oneof![Just("/"), Just("\\"), Just("")],
                "[a-zA-Z0-9._-]{0,12}",
            )
                .prop_map(|(parts, lead, last)| format!("{lead}{}/{last}", parts.join("/")))
        }

        proptest! {
            /// Property: hostile names never resolve outside the root.
            #[test]
            fn proptest_resolution_stays_inside_root(name in arb_hostile_name()) {
                let (_dir, guard) = uploads();

                match guard.resolve(Tainted::new(name)) {
                    Ok(resolved) => {
                        prop_assert!(resolved.as_path().starts_with(guard.root()));
                        prop_assert_ne!(resolved.as_path(), guard.root());
                    }
                    Err(PathError::AccessDenied | PathError::InvalidName) => {}
                    Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                }
            }
        }
    }
}
