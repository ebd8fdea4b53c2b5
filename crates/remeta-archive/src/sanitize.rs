use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Result of sanitizing an archive entry path.
#[derive(Clone, Debug)]
pub struct SanitizedPath {
    pub original: PathBuf,
    /// Normalized path relative to the extraction base.
    pub relative: PathBuf,
    pub resolved: PathBuf,
}

/// Lexically normalize `path`, returning `None` if `..` climbs above its start.
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    return None;
                }
            }
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Resolve an entry path against `base`, rejecting anything that would land
/// outside of it.
pub fn sanitize_path(entry_path: impl AsRef<Path>, base: impl AsRef<Path>) -> Result<SanitizedPath> {
    let entry_path = entry_path.as_ref();
    let base = base.as_ref();

    if entry_path.as_os_str().as_encoded_bytes().contains(&0) {
        return Err(Error::InvalidPath);
    }

    let relative = normalize_relative(entry_path).ok_or_else(|| Error::ZipSlip {
        entry: entry_path.to_path_buf(),
        resolved: base.join(entry_path),
    })?;

    Ok(SanitizedPath {
        original: entry_path.to_path_buf(),
        resolved: base.join(&relative),
        relative,
    })
}

/// Validate a symlink target for a link at `link_relative` inside `base`.
///
/// The target is returned unchanged so the link stays relative on disk.
pub fn sanitize_symlink_target(
    target: impl AsRef<Path>,
    link_relative: impl AsRef<Path>,
    base: impl AsRef<Path>,
) -> Result<PathBuf> {
    let target = target.as_ref();
    let link_relative = link_relative.as_ref();
    let base = base.as_ref();

    if target.has_root() {
        return Err(Error::AbsoluteSymlinkTarget {
            target: target.to_path_buf(),
            symlink: base.join(link_relative),
        });
    }

    let link_dir = link_relative.parent().unwrap_or(Path::new(""));
    if normalize_relative(&link_dir.join(target)).is_none() {
        return Err(Error::SymlinkEscape {
            target: target.to_path_buf(),
            resolved: base.join(link_dir).join(target),
        });
    }

    Ok(target.to_path_buf())
}

/// Check that `path`, with symlinks already on disk resolved, stays inside
/// `base`.
///
/// Walks up to the deepest ancestor that exists and compares its canonical
/// form, so links planted by earlier entries cannot redirect later writes.
pub fn ensure_within(path: impl AsRef<Path>, base: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let base = base.as_ref();
    let root = base.canonicalize().map_err(|e| Error::ExtractionFailed {
        path: base.to_path_buf(),
        source: e,
    })?;

    let mut probe = path;
    loop {
        if let Ok(real) = probe.canonicalize() {
            if real.starts_with(&root) {
                return Ok(());
            }
            return Err(Error::EscapesDestination {
                path: path.to_path_buf(),
                resolved: real,
            });
        }
        match probe.parent() {
            Some(parent) => probe = parent,
            None => return Ok(()),
        }
    }
}
