//! Best-effort clearing of a directory's immediate children.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::primitives::{EntryKind, remove_entry};
use crate::{Error, Result};

#[derive(Debug)]
pub struct Removed {
    pub path: PathBuf,
    pub kind: EntryKind,
}

#[derive(Debug)]
pub struct ClearFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Per-item outcome of [`clear_dir`].
#[derive(Debug, Default)]
pub struct ClearReport {
    pub removed: Vec<Removed>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<ClearFailure>,
}

impl ClearReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Delete every child of `dir` whose name is not in `keep`.
///
/// Only failing to list `dir` is an error. Failures on single entries are
/// logged and collected into the report while the remaining entries are
/// still processed.
pub fn clear_dir<S: AsRef<OsStr>>(dir: impl AsRef<Path>, keep: &[S]) -> Result<ClearReport> {
    let dir = dir.as_ref();
    let keep: Vec<&OsStr> = keep.iter().map(AsRef::as_ref).collect();

    let mut names: Vec<OsString> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::Read {
        path: dir.to_path_buf(),
        source: e,
    })? {
        match entry {
            Ok(entry) => names.push(entry.file_name()),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "unreadable directory entry"),
        }
    }
    names.sort();

    let mut report = ClearReport::default();
    for name in names {
        let path = dir.join(&name);
        if keep.contains(&name.as_os_str()) {
            tracing::info!(entry = %name.to_string_lossy(), "skipping");
            report.skipped.push(path);
            continue;
        }

        match remove_entry(&path) {
            Ok(kind) => {
                tracing::info!(entry = %name.to_string_lossy(), ?kind, "removed");
                report.removed.push(Removed { path, kind });
            }
            Err(error) => {
                tracing::warn!(entry = %name.to_string_lossy(), %error, "failed to remove");
                report.failed.push(ClearFailure { path, error });
            }
        }
    }

    Ok(report)
}
