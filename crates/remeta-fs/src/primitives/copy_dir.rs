use crate::{Error, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy `src` into `dest`, recreating symlinks instead of
/// following them.
pub fn copy_dir_all(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Read {
            path: e.path().unwrap_or(src).to_path_buf(),
            source: e.into(),
        })?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dest.join(relative);
        let kind = entry.file_type();

        let written = if kind.is_dir() {
            fs::create_dir_all(&target)
        } else if kind.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            continue;
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        written.map_err(|e| Error::Write {
            path: target,
            source: e,
        })?;
    }
    Ok(())
}

pub(crate) fn copy_symlink(src: &Path, dest: &Path) -> Result<()> {
    let target = fs::read_link(src).map_err(|e| Error::Read {
        path: src.to_path_buf(),
        source: e,
    })?;

    #[cfg(unix)]
    let linked = std::os::unix::fs::symlink(&target, dest);

    #[cfg(windows)]
    let linked = match src.metadata() {
        Ok(meta) if meta.is_dir() => std::os::windows::fs::symlink_dir(&target, dest),
        _ => std::os::windows::fs::symlink_file(&target, dest),
    };

    linked.map_err(|e| Error::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Mod");
        let dest = dir.path().join("copy");
        fs::create_dir_all(src.join("releases/empty")).unwrap();
        fs::write(src.join("Mod-1.0.ckan"), "one").unwrap();
        fs::write(src.join("releases/Mod-2.0.ckan"), "two").unwrap();

        copy_dir_all(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("Mod-1.0.ckan")).unwrap(), "one");
        assert_eq!(
            fs::read_to_string(dest.join("releases/Mod-2.0.ckan")).unwrap(),
            "two"
        );
        assert!(dest.join("releases/empty").is_dir());
        assert!(src.join("Mod-1.0.ckan").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn recreates_relative_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("real.txt"), "data").unwrap();
        std::os::unix::fs::symlink("real.txt", src.join("alias.txt")).unwrap();

        copy_dir_all(&src, &dest).unwrap();

        let link = dest.join("alias.txt");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("real.txt"));
        assert_eq!(fs::read_to_string(&link).unwrap(), "data");
    }
}
