//! POSIX implementation of the platform capability layer
//!
//! Stat and rename go through the standard library (which wraps `stat(2)`
//! and `rename(2)` directly); the whole-file copy primitive and memory
//! mapping use raw syscalls via `libc`.

use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::error::{io_error, Result};
use crate::types::{FileKind, FileStat};

use super::PlatformLayer;

/// POSIX capability implementation, selected on Unix targets
pub(crate) struct Posix;

impl PlatformLayer for Posix {
    fn stat(path: &Path, original: &str) -> Result<FileStat> {
        match std::fs::metadata(path) {
            Ok(meta) => {
                let file_type = meta.file_type();
                let (kind, size) = if file_type.is_file() {
                    (FileKind::File, Some(meta.len()))
                } else if file_type.is_dir() {
                    (FileKind::Directory, None)
                } else {
                    (FileKind::Unknown, None)
                };
                Ok(FileStat {
                    path: original.to_string(),
                    kind,
                    size,
                    mtime: meta.modified().ok(),
                })
            }
            Err(err) if Self::is_nonexistent(&err) => Ok(FileStat::non_existent(original)),
            Err(err) => Err(io_error(
                format!("Failed to stat path '{original}'"),
                err,
            )),
        }
    }

    fn is_nonexistent(err: &io::Error) -> bool {
        matches!(
            err.raw_os_error(),
            Some(libc::ENOENT | libc::ENOTDIR | libc::ELOOP)
        )
    }

    fn rename_replace(src: &Path, dest: &Path) -> io::Result<()> {
        // rename(2) replaces an existing destination atomically
        std::fs::rename(src, dest)
    }

    #[cfg(target_os = "linux")]
    fn copy_native(src: &Path, dest: &Path) -> io::Result<bool> {
        copy_file_range_all(src, dest)
    }

    #[cfg(not(target_os = "linux"))]
    fn copy_native(_src: &Path, _dest: &Path) -> io::Result<bool> {
        Ok(false)
    }

    fn map_readonly(file: &File, len: usize) -> io::Result<MappedRegion> {
        // SAFETY: fd is valid for the duration of the call; the region is
        // unmapped exactly once, in MappedRegion::drop.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        Ok(MappedRegion { ptr, len })
    }
}

/// Copy a whole file in-kernel with `copy_file_range(2)`
///
/// Returns `Ok(false)` when the very first call reports the syscall or the
/// filesystem combination is unsupported, so the caller can fall back to a
/// streamed copy. Errors after data has started flowing are real failures.
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &Path, dest: &Path) -> io::Result<bool> {
    let src_file = File::open(src)?;
    let mut remaining = src_file.metadata()?.len();
    let dest_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)?;

    let src_fd = src_file.as_raw_fd();
    let dest_fd = dest_file.as_raw_fd();
    let mut first_call = true;

    while remaining > 0 {
        let chunk = usize::try_from(remaining).unwrap_or(usize::MAX);
        // SAFETY: both fds are valid; null offsets use and advance the file
        // positions of the open descriptions.
        let copied = unsafe {
            libc::copy_file_range(
                src_fd,
                std::ptr::null_mut(),
                dest_fd,
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };
        if copied < 0 {
            let err = io::Error::last_os_error();
            let unsupported = matches!(
                err.raw_os_error(),
                Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
            );
            if first_call && unsupported {
                return Ok(false);
            }
            return Err(err);
        }
        if copied == 0 {
            // Source shrank under us; the copy is as complete as it can be
            break;
        }
        first_call = false;
        remaining = remaining.saturating_sub(copied as u64);
    }
    Ok(true)
}

/// A read-only memory-mapped region, unmapped on drop
pub(crate) struct MappedRegion {
    ptr: *mut libc::c_void,
    len: usize,
}

// SAFETY: the region is read-only and the pointer is never handed out
// mutably; moving it between threads is sound.
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

impl MappedRegion {
    /// The mapped bytes
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr/len describe a live PROT_READ mapping owned by self
        unsafe { std::slice::from_raw_parts(self.ptr.cast::<u8>(), self.len) }
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: ptr/len came from a successful mmap and are unmapped once
        unsafe {
            libc::munmap(self.ptr, self.len);
        }
    }
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion").field("len", &self.len).finish()
    }
}
