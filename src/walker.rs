//! Recursive directory listing driven by a [`Selector`]
//!
//! Depth-first descent accumulating into one output vector: a parent always
//! precedes its children; sibling order is whatever the OS reports. Entries
//! that vanish between listing and stating are silently dropped (the walk
//! tolerates races with concurrent deletion).

use std::ffi::OsString;
use std::fs;

use tracing::trace;

use crate::error::{io_error, Result};
use crate::path::PlatformPath;
use crate::platform::{Native, PlatformLayer};
use crate::types::{FileKind, FileStat, Selector};

/// Produce a `FileStat` for every entry selected under `base_dir`
pub(crate) fn stat_selector(select: &Selector) -> Result<Vec<FileStat>> {
    let base = PlatformPath::new(&select.base_dir)?;
    let mut out = Vec::new();
    walk(&base, select, 0, &mut out)?;
    Ok(out)
}

fn walk(
    dir: &PlatformPath,
    select: &Selector,
    depth: i32,
    out: &mut Vec<FileStat>,
) -> Result<()> {
    trace!(dir = dir.as_str(), depth, "listing directory");
    let names = match list_dir(dir) {
        Ok(names) => names,
        Err(err) => {
            // A missing base downgrades to an empty result, but only when
            // the listing failure was an I/O error and a direct existence
            // check confirms the directory is truly absent. Failures below
            // the base propagate immediately.
            if depth == 0 && select.allow_non_existent && err.is_io() {
                let probe = Native::stat(dir.as_path(), dir.as_str())?;
                if probe.kind == FileKind::NonExistent {
                    return Ok(());
                }
            }
            return Err(err);
        }
    };

    for name in names {
        let child = dir.join(&name)?;
        let stat = Native::stat(child.as_path(), child.as_str())?;
        let kind = stat.kind;
        if kind != FileKind::NonExistent {
            out.push(stat);
        }
        if depth < select.max_recursion && select.recursive && kind == FileKind::Directory {
            walk(&child, select, depth + 1, out)?;
        }
    }
    Ok(())
}

fn list_dir(dir: &PlatformPath) -> Result<Vec<OsString>> {
    let entries = fs::read_dir(dir.as_path()).map_err(|err| {
        io_error(format!("Failed listing directory '{}'", dir.as_str()), err)
    })?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            io_error(format!("Failed listing directory '{}'", dir.as_str()), err)
        })?;
        names.push(entry.file_name());
    }
    Ok(names)
}
