use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// What kind of filesystem entry a path turned out to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Symlink,
    Directory,
}

impl EntryKind {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::symlink_metadata(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let ty = meta.file_type();
        Ok(if ty.is_symlink() {
            Self::Symlink
        } else if ty.is_dir() {
            Self::Directory
        } else {
            Self::File
        })
    }
}

/// Remove a single entry without following symlinks.
///
/// Directories are removed recursively; files and symlinks are unlinked.
pub fn remove_entry(path: impl AsRef<Path>) -> Result<EntryKind> {
    let path = path.as_ref();
    let kind = EntryKind::of(path)?;

    let removed = match kind {
        EntryKind::Directory => fs::remove_dir_all(path),
        EntryKind::File => fs::remove_file(path),
        #[cfg(windows)]
        EntryKind::Symlink if path.is_dir() => fs::remove_dir(path),
        EntryKind::Symlink => fs::remove_file(path),
    };

    removed.map_err(|e| Error::Remove {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(kind)
}
