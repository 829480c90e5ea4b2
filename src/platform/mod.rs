//! Platform capability layer
//!
//! Everything the rest of the crate needs from the host OS sits behind the
//! [`PlatformLayer`] trait, with two independent implementations: POSIX
//! (`posix.rs`, compiled on Unix targets) and native Windows (`windows.rs`).
//! The `Native` alias selects the implementation at build time, keeping
//! platform-specific code fully isolated behind this boundary.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::types::FileStat;

#[cfg(unix)]
pub(crate) mod posix;
#[cfg(windows)]
pub(crate) mod windows;

#[cfg(unix)]
pub(crate) use posix::{MappedRegion, Posix as Native};
#[cfg(windows)]
pub(crate) use windows::{MappedRegion, Windows as Native};

/// OS capabilities the portable layer is built on
///
/// Implementations translate OS error codes at this boundary; callers above
/// it never inspect `errno` or `GetLastError` themselves.
pub(crate) trait PlatformLayer {
    /// Stat a single path, following symlinks
    ///
    /// Non-existence is not an error: "no such file", "not a directory
    /// component", and "too many symlinks" all fold into a
    /// `FileKind::NonExistent` stat with unset size and mtime. Every other
    /// OS error surfaces as `FsError::Io` carrying the OS message text.
    /// The returned `path` field is always `original`, regardless of kind.
    fn stat(path: &Path, original: &str) -> Result<FileStat>;

    /// True when the error means the entry (or a path component) is absent
    fn is_nonexistent(err: &io::Error) -> bool;

    /// Atomic rename, replacing `dest` when it already exists
    fn rename_replace(src: &Path, dest: &Path) -> io::Result<()>;

    /// Whole-file copy primitive, when the OS provides one
    ///
    /// Returns `Ok(true)` when the primitive performed the copy, `Ok(false)`
    /// when no primitive applies (caller falls back to a streamed copy), and
    /// `Err` for real failures.
    fn copy_native(src: &Path, dest: &Path) -> io::Result<bool>;

    /// Map an open file read-only; `len` must be non-zero
    ///
    /// The mapping stays valid after `file` is closed. Reading through the
    /// mapping while another process truncates the file is undefined at the
    /// OS level; the caller who enabled memory-mapped reads accepts that.
    fn map_readonly(file: &File, len: usize) -> io::Result<MappedRegion>;
}
