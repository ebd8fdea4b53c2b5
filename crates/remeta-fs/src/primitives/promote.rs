use crate::primitives::copy_dir::{copy_dir_all, copy_symlink};
use crate::primitives::remove::{EntryKind, remove_entry};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Move `from` to `to`, copying across filesystems when a rename cannot.
pub fn move_entry(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
    let from = from.as_ref();
    let to = to.as_ref();

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::CrossesDevices => {
            tracing::debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            match EntryKind::of(from)? {
                EntryKind::Directory => copy_dir_all(from, to)?,
                EntryKind::Symlink => copy_symlink(from, to)?,
                EntryKind::File => {
                    fs::copy(from, to).map_err(|e| Error::Move {
                        from: from.to_path_buf(),
                        to: to.to_path_buf(),
                        source: e,
                    })?;
                }
            }
            remove_entry(from)?;
            Ok(())
        }
        Err(e) => Err(Error::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        }),
    }
}

/// Move every immediate child of `src` into `dest`.
///
/// Fails with [`Error::Collision`] before moving anything if a child name
/// already exists in `dest`. Returns the new paths in name order.
pub fn promote_children(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if !src.is_dir() {
        return Err(Error::NotADirectory {
            path: src.to_path_buf(),
        });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(src).map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })? {
        let entry = entry.map_err(|e| Error::Read {
            path: src.to_path_buf(),
            source: e,
        })?;
        names.push(entry.file_name());
    }
    names.sort();

    for name in &names {
        let target = dest.join(name);
        if fs::symlink_metadata(&target).is_ok() {
            return Err(Error::Collision { path: target });
        }
    }

    let mut moved = Vec::with_capacity(names.len());
    for name in names {
        let target = dest.join(&name);
        tracing::debug!(entry = %name.to_string_lossy(), "moving to root");
        move_entry(src.join(&name), &target)?;
        moved.push(target);
    }
    Ok(moved)
}
