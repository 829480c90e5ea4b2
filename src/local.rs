//! The local filesystem facade
//!
//! [`LocalFileSystem`] is the entry point callers use. It is stateless aside
//! from read-only [`LocalFileSystemOptions`], so one instance can be shared
//! freely across threads; concurrent calls targeting different paths are
//! independent. Every operation is a blocking, synchronous OS call with no
//! cancellation or timeout; callers wanting bounded latency enforce it
//! externally.

use tracing::debug;

use crate::error::Result;
use crate::ops;
use crate::path::PlatformPath;
use crate::platform::{Native, PlatformLayer};
use crate::stream::{self, InputStream, OutputStream, WriteMode};
use crate::types::{FileStat, Selector};
use crate::walker;

/// Construction-time configuration for [`LocalFileSystem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalFileSystemOptions {
    /// Serve input streams from memory-mapped views instead of buffered
    /// read handles
    ///
    /// Mapping trades page-fault-driven I/O for avoiding explicit copies,
    /// but is unsafe on files another process may truncate concurrently.
    pub use_mmap: bool,
}

impl LocalFileSystemOptions {
    /// The default configuration: buffered reads
    #[must_use]
    pub fn defaults() -> Self {
        Self::default()
    }
}

/// Uniform, platform-independent interface over local-disk storage
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    options: LocalFileSystemOptions,
}

impl LocalFileSystem {
    /// Facade with default options
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: LocalFileSystemOptions::defaults(),
        }
    }

    /// Facade with explicit options
    #[must_use]
    pub fn with_options(options: LocalFileSystemOptions) -> Self {
        Self { options }
    }

    /// The configuration this facade was constructed with
    #[must_use]
    pub fn options(&self) -> &LocalFileSystemOptions {
        &self.options
    }

    /// Stat a single path
    ///
    /// Non-existence is not an error: the result carries
    /// `FileKind::NonExistent` with unset size and mtime.
    ///
    /// # Errors
    ///
    /// Returns `FsError::InvalidPath` for unrepresentable path strings and
    /// `FsError::Io` for OS failures other than non-existence.
    pub fn get_stat(&self, path: &str) -> Result<FileStat> {
        let path = PlatformPath::new(path)?;
        Native::stat(path.as_path(), path.as_str())
    }

    /// Stat every entry a selector describes
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` if listing fails (unless downgraded by
    /// `allow_non_existent`) and `FsError::InvalidPath` for entry names that
    /// cannot be represented as strings.
    pub fn get_stats(&self, select: &Selector) -> Result<Vec<FileStat>> {
        debug!(
            base_dir = select.base_dir.as_str(),
            recursive = select.recursive,
            "get_stats"
        );
        walker::stat_selector(select)
    }

    /// Create a directory, optionally with all missing ancestors
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` when a non-recursive create finds a missing
    /// ancestor, or for any other OS failure.
    pub fn create_dir(&self, path: &str, recursive: bool) -> Result<()> {
        debug!(path, recursive, "create_dir");
        ops::create_dir(&PlatformPath::new(path)?, recursive)
    }

    /// Recursively remove a directory and its contents
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotFound` if the directory was never present,
    /// `FsError::Io` for other failures.
    pub fn delete_dir(&self, path: &str) -> Result<()> {
        debug!(path, "delete_dir");
        ops::delete_dir(&PlatformPath::new(path)?)
    }

    /// Remove all children of a directory, keeping the directory itself
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotFound` if the directory was never present,
    /// `FsError::Io` for other failures.
    pub fn delete_dir_contents(&self, path: &str) -> Result<()> {
        debug!(path, "delete_dir_contents");
        ops::delete_dir_contents(&PlatformPath::new(path)?)
    }

    /// Remove a single file
    ///
    /// # Errors
    ///
    /// Returns `FsError::NotFound` if the file was absent, `FsError::Io`
    /// for other failures.
    pub fn delete_file(&self, path: &str) -> Result<()> {
        debug!(path, "delete_file");
        ops::delete_file(&PlatformPath::new(path)?)
    }

    /// Atomically rename `src` to `dest`, replacing `dest` if present
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` when the OS rename fails (for example across
    /// filesystems).
    pub fn rename(&self, src: &str, dest: &str) -> Result<()> {
        debug!(src, dest, "rename");
        ops::rename(&PlatformPath::new(src)?, &PlatformPath::new(dest)?)
    }

    /// Copy a file's content to another path
    ///
    /// A source and destination that normalize to the same native path are
    /// a no-op success.
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` when the copy or either stream close fails.
    pub fn copy_file(&self, src: &str, dest: &str) -> Result<()> {
        debug!(src, dest, "copy_file");
        ops::copy_file(
            &PlatformPath::new(src)?,
            &PlatformPath::new(dest)?,
            self.options.use_mmap,
        )
    }

    /// Open a file for sequential reads
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` if the file cannot be opened or mapped.
    pub fn open_input_stream(&self, path: &str) -> Result<InputStream> {
        stream::open_input(&PlatformPath::new(path)?, self.options.use_mmap)
    }

    /// Open a file for random-access reads
    ///
    /// Same contract as [`LocalFileSystem::open_input_stream`]; the returned
    /// handle additionally supports seeking from the end of the file.
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` if the file cannot be opened or mapped.
    pub fn open_input_file(&self, path: &str) -> Result<InputStream> {
        stream::open_input(&PlatformPath::new(path)?, self.options.use_mmap)
    }

    /// Open a file for writing, discarding existing content
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` if the file cannot be opened.
    pub fn open_output_stream(&self, path: &str) -> Result<OutputStream> {
        stream::open_output(&PlatformPath::new(path)?, WriteMode::Truncate)
    }

    /// Open a file for writing at end-of-file, preserving content
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` if the file cannot be opened.
    pub fn open_append_stream(&self, path: &str) -> Result<OutputStream> {
        stream::open_output(&PlatformPath::new(path)?, WriteMode::Append)
    }
}
