//! End-to-end guarded file read.
//!
//! The unguarded version of this function interpolates the caller's file
//! name straight into a path:
//!
//! ```text
//! read("/app/uploads/" + filename)      // filename = "../../etc/passwd"
//! ```
//!
//! [`read_user_file`] routes the name through [`PathGuard`] first, so the
//! only files it can open are ones proven to sit inside the upload root.
//!
//! # Compile-Time Rejection Example
//!
//! A tainted name cannot be joined onto a path without the guard:
//!
//! ```compile_fail
//! use access_guard::Tainted;
//!
//! let name = Tainted::new("../../etc/passwd".to_string());
//! let path = std::path::Path::new("/app/uploads").join(name);
//! ```

use crate::error::Result;
use crate::{PathGuard, Tainted};

/// Reads an uploaded file named by an untrusted caller.
///
/// # Errors
///
/// - [`PathError`](crate::PathError) wrapped in [`Error::Path`](crate::Error::Path)
///   if the name is malformed or escapes the root.
/// - [`Error::Io`](crate::Error::Io) if the resolved file cannot be read as UTF-8.
///
/// # Example
///
/// ```
/// use access_guard::{demo::read_user_file, PathGuard};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let uploads = tempfile::tempdir()?;
/// std::fs::write(uploads.path().join("notes.txt"), "hello")?;
/// let guard = PathGuard::new(uploads.path())?;
///
/// assert_eq!(read_user_file(&guard, "notes.txt")?, "hello");
/// assert!(read_user_file(&guard, "../../etc/passwd").is_err());
/// # Ok(()) }
/// ```
pub fn read_user_file(guard: &PathGuard, filename: &str) -> Result<String> {
    let resolved = guard.resolve(Tainted::new(filename))?;
    let contents = std::fs::read_to_string(resolved.as_path())?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, PathError};
    use std::fs;

    #[test]
    fn reads_file_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.txt"), "quarterly numbers").unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();

        assert_eq!(read_user_file(&guard, "report.txt").unwrap(), "quarterly numbers");
    }

    #[test]
    fn traversal_is_rejected_before_any_read() {
        let dir = tempfile::tempdir().unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();

        let err = read_user_file(&guard, "../../etc/passwd").unwrap_err();
        assert!(matches!(err, Error::Path(PathError::AccessDenied)));
    }

    #[test]
    fn directory_entry_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();

        let err = read_user_file(&guard, "nested").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escape_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("/etc/passwd", dir.path().join("link")).unwrap();
        let guard = PathGuard::new(dir.path()).unwrap();

        let err = read_user_file(&guard, "link").unwrap_err();
        assert!(matches!(err, Error::Path(PathError::AccessDenied)));
    }
}
