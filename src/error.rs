//! Error types for filesystem operations
//!
//! OS-level error codes are translated at the platform layer into one of the
//! variants below and propagated upward unmodified. No retries are performed
//! anywhere in this crate; transient failures are the caller's responsibility.
//!
//! Non-existence reported by stat or list operations is NOT an error: it is a
//! valid [`FileKind::NonExistent`](crate::FileKind::NonExistent) result.
//! `NotFound` is reserved for delete operations whose target was absent, so
//! callers can treat "already gone" specially.

use std::io;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors surfaced by filesystem operations
#[derive(Debug, Error)]
pub enum FsError {
    /// Unexpected OS failure, carrying the OS error code and message text
    #[error("{context}: {source}")]
    Io {
        /// What the operation was doing when the OS call failed
        context: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// Delete target was never present
    #[error("{kind} does not exist: '{path}'")]
    NotFound {
        /// Kind of entry expected at the path ("File" or "Directory")
        kind: &'static str,
        /// Path the operation targeted
        path: String,
    },

    /// Path string that cannot be normalized into a native path
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        /// Offending path string
        path: String,
        /// Why normalization rejected it
        reason: String,
    },
}

impl FsError {
    /// True for the `NotFound` variant
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }

    /// True for the `Io` variant
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, FsError::Io { .. })
    }
}

/// Build an `Io` error with context
pub(crate) fn io_error(context: impl Into<String>, source: io::Error) -> FsError {
    FsError::Io {
        context: context.into(),
        source,
    }
}

/// Build a `NotFound` error for a delete operation
pub(crate) fn not_found(kind: &'static str, path: impl Into<String>) -> FsError {
    FsError::NotFound {
        kind,
        path: path.into(),
    }
}

/// Build an `InvalidPath` error
pub(crate) fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> FsError {
    FsError::InvalidPath {
        path: path.into(),
        reason: reason.into(),
    }
}
