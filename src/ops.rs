//! Create, delete, move, and copy operations
//!
//! Delete operations distinguish "the target was never present"
//! (`FsError::NotFound`) from every other OS failure, so callers can treat
//! "already gone" specially. No operation here retries.

use std::fs;
use std::io::{self, Read, Write};

use tracing::debug;

use crate::error::{io_error, not_found, Result};
use crate::path::PlatformPath;
use crate::platform::{Native, PlatformLayer};
use crate::stream::{self, WriteMode};

/// Chunk size for the streamed copy fallback
const COPY_CHUNK_SIZE: usize = 1024 * 1024;

/// Create a directory
///
/// With `recursive`, all missing ancestors are created and directories that
/// already exist along the path are not an error. Without it, a missing
/// ancestor fails; an already existing target directory does not.
pub(crate) fn create_dir(path: &PlatformPath, recursive: bool) -> Result<()> {
    let outcome = if recursive {
        fs::create_dir_all(path.as_path())
    } else {
        fs::create_dir(path.as_path())
    };
    match outcome {
        Ok(()) => Ok(()),
        Err(err)
            if err.kind() == io::ErrorKind::AlreadyExists && path.as_path().is_dir() =>
        {
            Ok(())
        }
        Err(err) => Err(io_error(
            format!("Failed creating directory '{}'", path.as_str()),
            err,
        )),
    }
}

/// Remove a directory and everything under it
pub(crate) fn delete_dir(path: &PlatformPath) -> Result<()> {
    match fs::remove_dir_all(path.as_path()) {
        Ok(()) => Ok(()),
        Err(err) if Native::is_nonexistent(&err) => Err(not_found("Directory", path.as_str())),
        Err(err) => Err(io_error(
            format!("Failed deleting directory '{}'", path.as_str()),
            err,
        )),
    }
}

/// Remove all children of a directory, keeping the directory itself
pub(crate) fn delete_dir_contents(path: &PlatformPath) -> Result<()> {
    let entries = match fs::read_dir(path.as_path()) {
        Ok(entries) => entries,
        Err(err) if Native::is_nonexistent(&err) => {
            return Err(not_found("Directory", path.as_str()))
        }
        Err(err) => {
            return Err(io_error(
                format!("Failed listing directory '{}'", path.as_str()),
                err,
            ))
        }
    };
    for entry in entries {
        let entry = entry.map_err(|err| {
            io_error(
                format!("Failed listing directory '{}'", path.as_str()),
                err,
            )
        })?;
        let child = entry.path();
        let file_type = entry.file_type().map_err(|err| {
            io_error(format!("Failed to stat path '{}'", child.display()), err)
        })?;
        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&child)
        } else {
            // Symlinks are removed without following them
            fs::remove_file(&child)
        };
        removed.map_err(|err| io_error(format!("Failed deleting '{}'", child.display()), err))?;
    }
    Ok(())
}

/// Remove a single file
pub(crate) fn delete_file(path: &PlatformPath) -> Result<()> {
    match fs::remove_file(path.as_path()) {
        Ok(()) => Ok(()),
        Err(err) if Native::is_nonexistent(&err) => Err(not_found("File", path.as_str())),
        Err(err) => Err(io_error(
            format!("Failed deleting file '{}'", path.as_str()),
            err,
        )),
    }
}

/// Atomic rename, replacing `dest` when it already exists
pub(crate) fn rename(src: &PlatformPath, dest: &PlatformPath) -> Result<()> {
    Native::rename_replace(src.as_path(), dest.as_path()).map_err(|err| {
        io_error(
            format!("Failed renaming '{}' to '{}'", src.as_str(), dest.as_str()),
            err,
        )
    })
}

/// Copy one file's content to another path
///
/// Identical normalized paths are a no-op success. Otherwise the platform's
/// whole-file copy primitive is used where available, with a streamed
/// 1 MiB-chunk copy as fallback; both streams are closed explicitly and the
/// first close error propagates.
pub(crate) fn copy_file(src: &PlatformPath, dest: &PlatformPath, use_mmap: bool) -> Result<()> {
    if src == dest {
        debug!(path = src.as_str(), "copy onto itself, nothing to do");
        return Ok(());
    }
    match Native::copy_native(src.as_path(), dest.as_path()) {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(err) => {
            return Err(io_error(
                format!("Failed copying '{}' to '{}'", src.as_str(), dest.as_str()),
                err,
            ))
        }
    }
    copy_streamed(src, dest, use_mmap)
}

fn copy_streamed(src: &PlatformPath, dest: &PlatformPath, use_mmap: bool) -> Result<()> {
    let mut input = stream::open_input(src, use_mmap)?;
    let mut output = stream::open_output(dest, WriteMode::Truncate)?;
    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    loop {
        let n = input.read(&mut buf).map_err(|err| {
            io_error(format!("Failed reading from '{}'", src.as_str()), err)
        })?;
        if n == 0 {
            break;
        }
        output.write_all(&buf[..n]).map_err(|err| {
            io_error(format!("Failed writing to '{}'", dest.as_str()), err)
        })?;
    }
    output.close()?;
    input.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileKind;

    fn path_in(dir: &tempfile::TempDir, name: &str) -> PlatformPath {
        let joined = dir.path().join(name);
        PlatformPath::new(joined.to_str().unwrap()).unwrap()
    }

    #[test]
    fn create_dir_recursive_builds_missing_ancestors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let leaf = path_in(&dir, "a/b/c");
        create_dir(&leaf, true)?;
        assert!(dir.path().join("a").is_dir());
        assert!(dir.path().join("a/b").is_dir());
        assert!(leaf.as_path().is_dir());

        // Idempotent over partially existing ancestry
        create_dir(&leaf, true)?;
        Ok(())
    }

    #[test]
    fn create_dir_non_recursive_needs_existing_parent() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let leaf = path_in(&dir, "missing/child");
        assert!(create_dir(&leaf, false).is_err());

        let direct = path_in(&dir, "child");
        create_dir(&direct, false)?;
        // Existing target directory is not an error
        create_dir(&direct, false)?;
        Ok(())
    }

    #[test]
    fn create_dir_over_existing_file_fails() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let target = path_in(&dir, "occupied");
        std::fs::write(target.as_path(), b"file")?;
        assert!(create_dir(&target, false).is_err());
        Ok(())
    }

    #[test]
    fn delete_dir_on_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = path_in(&dir, "never-created");
        let err = delete_dir(&missing).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_dir_removes_tree() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let root = path_in(&dir, "tree");
        std::fs::create_dir_all(root.as_path().join("sub"))?;
        std::fs::write(root.as_path().join("sub/f.txt"), b"x")?;

        delete_dir(&root)?;
        assert_eq!(
            Native::stat(root.as_path(), root.as_str())?.kind,
            FileKind::NonExistent
        );
        Ok(())
    }

    #[test]
    fn delete_dir_contents_keeps_the_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let root = path_in(&dir, "tree");
        std::fs::create_dir_all(root.as_path().join("sub"))?;
        std::fs::write(root.as_path().join("f.txt"), b"x")?;

        delete_dir_contents(&root)?;
        assert!(root.as_path().is_dir());
        assert_eq!(std::fs::read_dir(root.as_path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn delete_dir_contents_on_missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = path_in(&dir, "never-created");
        let err = delete_dir_contents(&missing).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_file_distinguishes_missing_target() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = path_in(&dir, "f.txt");
        std::fs::write(file.as_path(), b"x")?;
        delete_file(&file)?;

        let err = delete_file(&file).unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }

    #[test]
    fn rename_replaces_existing_destination() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = path_in(&dir, "src.txt");
        let dest = path_in(&dir, "dest.txt");
        std::fs::write(src.as_path(), b"fresh")?;
        std::fs::write(dest.as_path(), b"stale")?;

        rename(&src, &dest)?;
        assert!(!src.as_path().exists());
        assert_eq!(std::fs::read(dest.as_path())?, b"fresh");
        Ok(())
    }

    #[test]
    fn copy_file_onto_itself_is_a_noop() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = path_in(&dir, "f.txt");
        std::fs::write(file.as_path(), b"unchanged")?;

        // Trailing separator normalizes away, so the paths compare equal
        let alias = PlatformPath::new(&format!("{}/", file.as_str()))?;
        copy_file(&file, &alias, false)?;
        assert_eq!(std::fs::read(file.as_path())?, b"unchanged");
        Ok(())
    }

    #[test]
    fn copy_file_copies_content() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = path_in(&dir, "src.bin");
        let dest = path_in(&dir, "dest.bin");
        let payload: Vec<u8> = (0..=255u8).cycle().take(3 * 1024 * 1024 + 17).collect();
        std::fs::write(src.as_path(), &payload)?;

        copy_file(&src, &dest, false)?;
        assert_eq!(std::fs::read(dest.as_path())?, payload);
        Ok(())
    }

    #[test]
    fn streamed_copy_matches_source() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = path_in(&dir, "src.bin");
        let dest = path_in(&dir, "dest.bin");
        std::fs::write(src.as_path(), b"streamed bytes")?;

        copy_streamed(&src, &dest, false)?;
        assert_eq!(std::fs::read(dest.as_path())?, b"streamed bytes");
        Ok(())
    }
}
