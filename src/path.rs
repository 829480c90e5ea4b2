//! Path normalization into a platform-native representation
//!
//! User-supplied path strings are validated and normalized exactly once, at
//! the boundary of each operation. The normalized form is what appears in
//! [`FileStat::path`](crate::FileStat) and in error messages.

use std::ffi::OsStr;
use std::path::{Path, MAIN_SEPARATOR};

use crate::error::{invalid_path, Result};

/// A normalized, platform-native path
///
/// Constructed once per operation from a user string and discarded after
/// use; never shared across calls. Normalization rejects empty strings and
/// interior NUL bytes, converts forward slashes to backslashes on Windows,
/// and strips redundant trailing separators (the filesystem root keeps its
/// separator).
///
/// Two paths compare equal exactly when their native representations are
/// byte-identical; no symlink resolution or case folding is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformPath {
    text: String,
}

impl PlatformPath {
    /// Normalize a user-supplied path string
    ///
    /// # Errors
    ///
    /// Returns `FsError::InvalidPath` if the string is empty or contains an
    /// interior NUL byte.
    pub fn new(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(invalid_path(path, "empty path"));
        }
        if path.contains('\0') {
            return Err(invalid_path(path.replace('\0', "\\0"), "embedded NUL byte"));
        }
        Ok(Self {
            text: normalize(path),
        })
    }

    /// The normalized path as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The normalized path as a borrowed `Path`
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.text)
    }

    /// Join a child entry name found during directory listing
    ///
    /// # Errors
    ///
    /// Returns `FsError::InvalidPath` if the name is not valid UTF-8. Paths
    /// in this crate are surfaced as strings, so names the OS reports in a
    /// non-UTF-8 encoding cannot be represented.
    pub fn join(&self, name: &OsStr) -> Result<Self> {
        let name = name.to_str().ok_or_else(|| {
            invalid_path(
                name.to_string_lossy(),
                "entry name is not valid UTF-8",
            )
        })?;
        let mut text = self.text.clone();
        if !text.ends_with(MAIN_SEPARATOR) {
            text.push(MAIN_SEPARATOR);
        }
        text.push_str(name);
        Ok(Self { text })
    }
}

#[cfg(not(windows))]
fn normalize(path: &str) -> String {
    let mut text = path.to_string();
    while text.len() > 1 && text.ends_with('/') {
        text.pop();
    }
    text
}

#[cfg(windows)]
fn normalize(path: &str) -> String {
    let mut text = path.replace('/', "\\");
    // Keep the separator on drive roots such as "C:\"
    while text.len() > 1 && text.ends_with('\\') && !text[..text.len() - 1].ends_with(':') {
        text.pop();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn rejects_empty_path() {
        assert!(PlatformPath::new("").is_err());
    }

    #[test]
    fn rejects_embedded_nul() {
        assert!(PlatformPath::new("a\0b").is_err());
    }

    #[cfg(not(windows))]
    #[test]
    fn strips_trailing_separators() {
        let p = PlatformPath::new("/tmp/dir///").unwrap();
        assert_eq!(p.as_str(), "/tmp/dir");
    }

    #[cfg(not(windows))]
    #[test]
    fn root_keeps_its_separator() {
        let p = PlatformPath::new("/").unwrap();
        assert_eq!(p.as_str(), "/");
    }

    #[cfg(windows)]
    #[test]
    fn converts_forward_slashes() {
        let p = PlatformPath::new("C:/data/file.txt").unwrap();
        assert_eq!(p.as_str(), "C:\\data\\file.txt");
    }

    #[cfg(windows)]
    #[test]
    fn drive_root_keeps_its_separator() {
        let p = PlatformPath::new("C:/").unwrap();
        assert_eq!(p.as_str(), "C:\\");
    }

    #[cfg(not(windows))]
    #[test]
    fn join_appends_one_separator() {
        let base = PlatformPath::new("/tmp/dir").unwrap();
        let child = base.join(&OsString::from("a.txt")).unwrap();
        assert_eq!(child.as_str(), "/tmp/dir/a.txt");
    }

    #[cfg(windows)]
    #[test]
    fn join_appends_one_separator() {
        let base = PlatformPath::new("C:\\data").unwrap();
        let child = base.join(&OsString::from("a.txt")).unwrap();
        assert_eq!(child.as_str(), "C:\\data\\a.txt");
    }

    #[test]
    fn equality_is_native_text_equality() {
        let a = PlatformPath::new("/tmp/x/").unwrap();
        let b = PlatformPath::new("/tmp/x").unwrap();
        assert_eq!(a, b);
        let c = PlatformPath::new("/tmp/y").unwrap();
        assert_ne!(a, c);
    }
}
