//! Value types shared by every filesystem operation
//!
//! [`FileStat`] and [`Selector`] are immutable value objects constructed
//! per call and discarded after use; the facade retains no state beyond its
//! read-only options.

use std::ffi::OsStr;
use std::path::Path;
use std::time::SystemTime;

/// What kind of entry a path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Nothing exists at the path (also covers dangling path components and
    /// symlink loops)
    NonExistent,
    /// Entry that is neither a regular file nor a directory, e.g. a device
    /// node, socket, or FIFO; detection is platform-dependent
    Unknown,
}

/// A snapshot of one filesystem entry's type, size, and modification time
///
/// Invariants: `kind == NonExistent` implies `size` and `mtime` are both
/// `None`; `kind == Directory` implies `size` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// The normalized path the stat was taken for, regardless of kind
    pub path: String,
    /// Entry kind
    pub kind: FileKind,
    /// Size in bytes; only set for regular files
    pub size: Option<u64>,
    /// Last modification time; unset for non-existent entries
    pub mtime: Option<SystemTime>,
}

impl FileStat {
    /// Stat for a path with nothing behind it
    pub(crate) fn non_existent(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::NonExistent,
            size: None,
            mtime: None,
        }
    }

    /// True if the entry is a regular file
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    /// True if the entry is a directory
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// Final component of the path, if it has one
    #[must_use]
    pub fn base_name(&self) -> Option<&str> {
        Path::new(&self.path).file_name().and_then(OsStr::to_str)
    }

    /// Extension of the final component, without the dot
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.path).extension().and_then(OsStr::to_str)
    }
}

/// A query describing which directory to list and how deep to recurse
///
/// `max_recursion` bounds the descent: the walk never recurses into a
/// subdirectory once the current depth reaches it, even when `recursive`
/// is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Directory whose entries are listed
    pub base_dir: String,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Maximum recursion depth; `0` lists only direct children
    pub max_recursion: i32,
    /// Return an empty result instead of an error when `base_dir` is absent
    pub allow_non_existent: bool,
}

impl Selector {
    /// Selector for the direct children of `base_dir`
    pub fn new(base_dir: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            recursive: false,
            max_recursion: i32::MAX,
            allow_non_existent: false,
        }
    }

    /// Enable or disable descent into subdirectories
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Bound the recursion depth
    #[must_use]
    pub fn with_max_recursion(mut self, max_recursion: i32) -> Self {
        self.max_recursion = max_recursion;
        self
    }

    /// Tolerate a missing base directory
    #[must_use]
    pub fn with_allow_non_existent(mut self, allow: bool) -> Self {
        self.allow_non_existent = allow;
        self
    }
}
