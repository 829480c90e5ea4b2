//! Native Windows implementation of the platform capability layer
//!
//! Stat goes through the standard library (which opens the entry with
//! `FILE_FLAG_BACKUP_SEMANTICS` so directories can be queried by handle);
//! rename, whole-file copy, and memory mapping call the Win32 API directly
//! via `windows-sys`.

use std::fs::File;
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::io::AsRawHandle;
use std::path::Path;

use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_CANT_RESOLVE_FILENAME, ERROR_DIRECTORY, ERROR_FILE_NOT_FOUND,
    ERROR_PATH_NOT_FOUND,
};
use windows_sys::Win32::Storage::FileSystem::{
    CopyFileW, MoveFileExW, MOVEFILE_REPLACE_EXISTING,
};
use windows_sys::Win32::System::Memory::{
    CreateFileMappingW, MapViewOfFile, UnmapViewOfFile, FILE_MAP_READ,
    MEMORY_MAPPED_VIEW_ADDRESS, PAGE_READONLY,
};

use crate::error::{io_error, Result};
use crate::types::{FileKind, FileStat};

use super::PlatformLayer;

/// Native Windows capability implementation, selected on Windows targets
pub(crate) struct Windows;

impl PlatformLayer for Windows {
    fn stat(path: &Path, original: &str) -> Result<FileStat> {
        match std::fs::metadata(path) {
            Ok(meta) => {
                let file_type = meta.file_type();
                let (kind, size) = if file_type.is_dir() {
                    (FileKind::Directory, None)
                } else if file_type.is_file() {
                    (FileKind::File, Some(meta.len()))
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
                format!("Failed querying information for path '{original}'"),
                err,
            )),
        }
    }

    fn is_nonexistent(err: &io::Error) -> bool {
        matches!(
            err.raw_os_error().map(|code| code as u32),
            Some(
                ERROR_FILE_NOT_FOUND
                    | ERROR_PATH_NOT_FOUND
                    | ERROR_DIRECTORY
                    | ERROR_CANT_RESOLVE_FILENAME
            )
        )
    }

    fn rename_replace(src: &Path, dest: &Path) -> io::Result<()> {
        let src_w = to_wide(src);
        let dest_w = to_wide(dest);
        // SAFETY: both buffers are NUL-terminated and outlive the call
        let ok = unsafe { MoveFileExW(src_w.as_ptr(), dest_w.as_ptr(), MOVEFILE_REPLACE_EXISTING) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn copy_native(src: &Path, dest: &Path) -> io::Result<bool> {
        let src_w = to_wide(src);
        let dest_w = to_wide(dest);
        // bFailIfExists = FALSE: an existing destination is overwritten
        // SAFETY: both buffers are NUL-terminated and outlive the call
        let ok = unsafe { CopyFileW(src_w.as_ptr(), dest_w.as_ptr(), 0) };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(true)
    }

    fn map_readonly(file: &File, len: usize) -> io::Result<MappedRegion> {
        // SAFETY: the file handle is valid; the view outlives the mapping
        // handle, which Win32 permits once MapViewOfFile has succeeded.
        let mapping = unsafe {
            CreateFileMappingW(
                file.as_raw_handle(),
                std::ptr::null(),
                PAGE_READONLY,
                0,
                0,
                std::ptr::null(),
            )
        };
        if mapping.is_null() {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: mapping is a valid file-mapping handle; 0/0/0 maps the view
        // over the whole file.
        let view = unsafe { MapViewOfFile(mapping, FILE_MAP_READ, 0, 0, 0) };
        // SAFETY: mapping is owned here and closed exactly once
        unsafe { CloseHandle(mapping) };
        if view.Value.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(MappedRegion {
            view: view.Value,
            len,
        })
    }
}

fn to_wide(path: &Path) -> Vec<u16> {
    path.as_os_str().encode_wide().chain(Some(0)).collect()
}

/// A read-only mapped view of a file, unmapped on drop
pub(crate) struct MappedRegion {
    view: *mut core::ffi::c_void,
    len: usize,
}

// SAFETY: the view is read-only and the pointer is never handed out mutably
unsafe impl Send for MappedRegion {}
unsafe impl Sync for MappedRegion {}

impl MappedRegion {
    /// The mapped bytes
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: view/len describe a live FILE_MAP_READ view owned by self
        unsafe { std::slice::from_raw_parts(self.view.cast::<u8>(), self.len) }
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: the view came from a successful MapViewOfFile
        unsafe {
            UnmapViewOfFile(MEMORY_MAPPED_VIEW_ADDRESS { Value: self.view });
        }
    }
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes_are_nonexistent() {
        for code in [ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND] {
            let err = io::Error::from_raw_os_error(code as i32);
            assert!(Windows::is_nonexistent(&err));
        }
    }

    #[test]
    fn access_denied_is_not_nonexistent() {
        // ERROR_ACCESS_DENIED
        let err = io::Error::from_raw_os_error(5);
        assert!(!Windows::is_nonexistent(&err));
    }
}
