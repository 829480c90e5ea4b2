//! Stream-based open for read, write, and append
//!
//! Input handles come in two flavors, selected by the facade's
//! `use_mmap` option: a conventional buffered read handle, or a
//! memory-mapped view exposing the file's bytes directly. Both satisfy the
//! same `Read + Seek` contract. Memory-mapped reads avoid explicit copies
//! but are unsafe against concurrent truncation by another process; that
//! risk is accepted by the caller who enables the option.
//!
//! Every handle exclusively owns its OS resource and releases it on drop.
//! When an open fails after the descriptor has been obtained (for example
//! the mapping step fails), the descriptor is released before the error
//! propagates.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use crate::error::{io_error, Result};
use crate::path::PlatformPath;
use crate::platform::{MappedRegion, Native, PlatformLayer};

/// How an output stream positions itself in an existing file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Discard existing content
    Truncate,
    /// Keep existing content, write at end-of-file
    Append,
}

/// A readable handle over one file, sequential or random-access
#[derive(Debug)]
pub struct InputStream {
    inner: InputKind,
}

#[derive(Debug)]
enum InputKind {
    Buffered(BufReader<File>),
    Mapped(MappedReader),
}

#[derive(Debug)]
struct MappedReader {
    /// `None` for empty files; a zero-length map is never attempted
    region: Option<MappedRegion>,
    pos: u64,
}

impl MappedReader {
    fn bytes(&self) -> &[u8] {
        self.region.as_ref().map_or(&[], MappedRegion::as_slice)
    }
}

impl InputStream {
    /// Total length of the underlying file, as seen at open (mapped) or
    /// now (buffered)
    ///
    /// # Errors
    ///
    /// Returns the OS error if querying a buffered handle's metadata fails.
    pub fn len(&self) -> io::Result<u64> {
        match &self.inner {
            InputKind::Buffered(reader) => Ok(reader.get_ref().metadata()?.len()),
            InputKind::Mapped(mapped) => Ok(mapped.bytes().len() as u64),
        }
    }

    /// True when the file had no bytes
    ///
    /// # Errors
    ///
    /// Same failure modes as [`InputStream::len`].
    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The mapped bytes, when this handle is memory-mapped
    #[must_use]
    pub fn mapped_bytes(&self) -> Option<&[u8]> {
        match &self.inner {
            InputKind::Buffered(_) => None,
            InputKind::Mapped(mapped) => Some(mapped.bytes()),
        }
    }

    /// Release the handle or mapped region
    ///
    /// Dropping the stream has the same effect; this form exists so a copy
    /// loop can close both of its streams explicitly.
    #[allow(clippy::unnecessary_wraps)]
    pub fn close(self) -> Result<()> {
        Ok(())
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            InputKind::Buffered(reader) => reader.read(buf),
            InputKind::Mapped(mapped) => {
                let bytes = mapped.bytes();
                let start = usize::try_from(mapped.pos.min(bytes.len() as u64))
                    .unwrap_or(bytes.len());
                let n = (bytes.len() - start).min(buf.len());
                buf[..n].copy_from_slice(&bytes[start..start + n]);
                mapped.pos += n as u64;
                Ok(n)
            }
        }
    }
}

impl Seek for InputStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.inner {
            InputKind::Buffered(reader) => reader.seek(pos),
            InputKind::Mapped(mapped) => {
                let len = mapped.bytes().len() as i64;
                let target = match pos {
                    SeekFrom::Start(offset) => i64::try_from(offset)
                        .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?,
                    SeekFrom::End(delta) => len
                        .checked_add(delta)
                        .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?,
                    SeekFrom::Current(delta) => i64::try_from(mapped.pos)
                        .ok()
                        .and_then(|cur| cur.checked_add(delta))
                        .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidInput))?,
                };
                if target < 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "seek before start of file",
                    ));
                }
                mapped.pos = target as u64;
                Ok(mapped.pos)
            }
        }
    }
}

/// A writable handle over one file
#[derive(Debug)]
pub struct OutputStream {
    inner: BufWriter<File>,
    path: String,
}

impl OutputStream {
    /// Flush buffered bytes and release the handle
    ///
    /// # Errors
    ///
    /// Returns `FsError::Io` if the final flush fails; the handle is
    /// released either way.
    pub fn close(mut self) -> Result<()> {
        self.inner
            .flush()
            .map_err(|err| io_error(format!("Failed closing '{}'", self.path), err))
    }
}

impl Write for OutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Open a file for reading, memory-mapped or buffered
pub(crate) fn open_input(path: &PlatformPath, use_mmap: bool) -> Result<InputStream> {
    let file = File::open(path.as_path())
        .map_err(|err| io_error(format!("Failed opening '{}' for reading", path.as_str()), err))?;
    if !use_mmap {
        return Ok(InputStream {
            inner: InputKind::Buffered(BufReader::new(file)),
        });
    }

    let len = file
        .metadata()
        .map_err(|err| io_error(format!("Failed to stat path '{}'", path.as_str()), err))?
        .len();
    let region = if len == 0 {
        None
    } else {
        let len = usize::try_from(len).map_err(|_| {
            io_error(
                format!("Failed to memory-map '{}'", path.as_str()),
                io::Error::new(io::ErrorKind::InvalidInput, "file too large to map"),
            )
        })?;
        // On failure `file` drops here, releasing the descriptor before the
        // error propagates
        Some(Native::map_readonly(&file, len).map_err(|err| {
            io_error(format!("Failed to memory-map '{}'", path.as_str()), err)
        })?)
    };
    // The descriptor is no longer needed; the mapping outlives it
    drop(file);
    Ok(InputStream {
        inner: InputKind::Mapped(MappedReader { region, pos: 0 }),
    })
}

/// Open a file for writing, truncating or appending
pub(crate) fn open_output(path: &PlatformPath, mode: WriteMode) -> Result<OutputStream> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    match mode {
        WriteMode::Truncate => options.truncate(true),
        WriteMode::Append => options.append(true),
    };
    let file = options
        .open(path.as_path())
        .map_err(|err| io_error(format!("Failed opening '{}' for writing", path.as_str()), err))?;
    Ok(OutputStream {
        inner: BufWriter::new(file),
        path: path.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn path_in(dir: &tempfile::TempDir, name: &str) -> PlatformPath {
        let joined = dir.path().join(name);
        PlatformPath::new(joined.to_str().unwrap()).unwrap()
    }

    #[rstest]
    #[case::buffered(false)]
    #[case::mapped(true)]
    fn read_matches_written_bytes(#[case] use_mmap: bool) -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = path_in(&dir, "data.bin");

        let mut out = open_output(&path, WriteMode::Truncate)?;
        out.write_all(b"hello stream")?;
        out.close()?;

        let mut input = open_input(&path, use_mmap)?;
        let mut contents = Vec::new();
        input.read_to_end(&mut contents)?;
        assert_eq!(contents, b"hello stream");
        Ok(())
    }

    #[rstest]
    #[case::buffered(false)]
    #[case::mapped(true)]
    fn seek_then_read(#[case] use_mmap: bool) -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = path_in(&dir, "data.bin");
        std::fs::write(path.as_path(), b"0123456789")?;

        let mut input = open_input(&path, use_mmap)?;
        input.seek(SeekFrom::Start(4))?;
        let mut tail = String::new();
        input.read_to_string(&mut tail)?;
        assert_eq!(tail, "456789");

        input = open_input(&path, use_mmap)?;
        input.seek(SeekFrom::End(-2))?;
        let mut end = String::new();
        input.read_to_string(&mut end)?;
        assert_eq!(end, "89");
        Ok(())
    }

    #[rstest]
    #[case::buffered(false)]
    #[case::mapped(true)]
    fn empty_file_reads_empty(#[case] use_mmap: bool) -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = path_in(&dir, "empty.bin");
        std::fs::write(path.as_path(), b"")?;

        let mut input = open_input(&path, use_mmap)?;
        assert!(input.is_empty()?);
        let mut contents = Vec::new();
        input.read_to_end(&mut contents)?;
        assert!(contents.is_empty());
        Ok(())
    }

    #[test]
    fn mapped_bytes_only_for_mapped_handles() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = path_in(&dir, "data.bin");
        std::fs::write(path.as_path(), b"abc")?;

        let mapped = open_input(&path, true)?;
        assert_eq!(mapped.mapped_bytes(), Some(&b"abc"[..]));

        let buffered = open_input(&path, false)?;
        assert!(buffered.mapped_bytes().is_none());
        Ok(())
    }

    #[test]
    fn truncate_discards_existing_content() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = path_in(&dir, "data.txt");
        std::fs::write(path.as_path(), b"old content")?;

        let mut out = open_output(&path, WriteMode::Truncate)?;
        out.write_all(b"new")?;
        out.close()?;

        assert_eq!(std::fs::read(path.as_path())?, b"new");
        Ok(())
    }

    #[test]
    fn append_preserves_existing_content() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = path_in(&dir, "data.txt");
        std::fs::write(path.as_path(), b"head:")?;

        let mut out = open_output(&path, WriteMode::Append)?;
        out.write_all(b"tail")?;
        out.close()?;

        assert_eq!(std::fs::read(path.as_path())?, b"head:tail");
        Ok(())
    }

    #[test]
    fn open_input_on_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = path_in(&dir, "missing.bin");
        let err = open_input(&path, false).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn seek_before_start_fails_on_mapped_handle() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = path_in(&dir, "data.bin");
        std::fs::write(path.as_path(), b"xyz")?;

        let mut input = open_input(&path, true)?;
        assert!(input.seek(SeekFrom::End(-10)).is_err());
        Ok(())
    }
}
