//! # localfs
//!
//! A uniform, platform-independent interface over local-disk storage:
//!
//! - path-based stat queries where non-existence is data, not an error
//! - recursive directory listing with depth limits ([`Selector`])
//! - directory/file creation, deletion, move, and copy
//! - stream-based open for read/write/append, with an optional
//!   memory-mapped read strategy
//!
//! Divergent OS semantics (POSIX vs. native Windows) are reconciled behind
//! one contract by a build-time-selected platform capability layer; no
//! platform-conditional code exists above it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use localfs::{LocalFileSystem, Selector};
//!
//! fn main() -> localfs::Result<()> {
//!     let fs = LocalFileSystem::new();
//!
//!     let st = fs.get_stat("/data/input.csv")?;
//!     if st.is_file() {
//!         println!("{} bytes", st.size.unwrap_or(0));
//!     }
//!
//!     let select = Selector::new("/data").with_recursive(true);
//!     for entry in fs.get_stats(&select)? {
//!         println!("{} ({:?})", entry.path, entry.kind);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod local;
mod ops;
pub mod path;
mod platform;
pub mod stream;
pub mod types;
mod walker;

pub use error::{FsError, Result};
pub use local::{LocalFileSystem, LocalFileSystemOptions};
pub use path::PlatformPath;
pub use stream::{InputStream, OutputStream};
pub use types::{FileKind, FileStat, Selector};
