use std::borrow::Cow;
use std::path::{Path, PathBuf};

use remeta_fetch::Mirror;
use remeta_fs::{AtomicWriteOptions, atomic_read, atomic_write};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::RewriteError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RewriteReport {
    pub scanned: usize,
    pub rewritten: usize,
}

/// Route every canonical reference in the files below `root` through `mirror`.
///
/// Files are visited deepest first and replaced atomically, keeping their
/// permissions. Files with nothing to rewrite are left untouched. The first
/// file that is not UTF-8, or cannot be read or written, aborts the pass.
pub fn rewrite_tree(root: &Path, mirror: &Mirror) -> Result<RewriteReport, RewriteError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).contents_first(true) {
        let entry = entry.map_err(|source| RewriteError::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    let options = AtomicWriteOptions::new().preserve_permissions(true);
    let mut report = RewriteReport::default();
    for path in files {
        report.scanned += 1;
        let bytes = atomic_read(&path)?;
        let text = std::str::from_utf8(&bytes).map_err(|source| RewriteError::NotUtf8 {
            path: path.clone(),
            source,
        })?;

        if let Cow::Owned(updated) = mirror.apply(text) {
            debug!(file = %path.display(), "rewriting");
            atomic_write(&path, updated.as_bytes(), options)?;
            report.rewritten += 1;
        }
    }

    info!(
        scanned = report.scanned,
        rewritten = report.rewritten,
        "references rewritten"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn mirror() -> Mirror {
        Mirror::new("https://ghproxy.net")
    }

    #[test]
    fn rewrites_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.ckan"), "https://github.com/x").unwrap();
        fs::write(dir.path().join("a/b/deep.ckan"), "url: https://github.com/y\n").unwrap();
        fs::write(dir.path().join("a/plain.txt"), "nothing here").unwrap();

        let report = rewrite_tree(dir.path(), &mirror()).unwrap();

        assert_eq!(report, RewriteReport { scanned: 3, rewritten: 2 });
        assert_eq!(
            fs::read_to_string(dir.path().join("top.ckan")).unwrap(),
            "https://ghproxy.net/https://github.com/x"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("a/b/deep.ckan")).unwrap(),
            "url: https://ghproxy.net/https://github.com/y\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("a/plain.txt")).unwrap(),
            "nothing here"
        );
    }

    #[test]
    fn second_pass_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("m.ckan"), "https://github.com/a https://github.com/b").unwrap();

        rewrite_tree(dir.path(), &mirror()).unwrap();
        let once = fs::read_to_string(dir.path().join("m.ckan")).unwrap();
        let report = rewrite_tree(dir.path(), &mirror()).unwrap();

        assert_eq!(report.rewritten, 0);
        assert_eq!(fs::read_to_string(dir.path().join("m.ckan")).unwrap(), once);
    }

    #[test]
    fn non_utf8_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("blob.bin");
        fs::write(&bad, b"\xff\xfe\x00\x80").unwrap();

        let err = rewrite_tree(dir.path(), &mirror()).unwrap_err();

        match err {
            RewriteError::NotUtf8 { path, .. } => assert_eq!(path, bad),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fs::read(&bad).unwrap(), b"\xff\xfe\x00\x80");
    }

    #[cfg(unix)]
    #[test]
    fn walk_error_names_the_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("a/locked");
        fs::create_dir_all(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // permission bits are not enforced for this user
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let err = rewrite_tree(dir.path(), &mirror()).unwrap_err();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        match err {
            RewriteError::Walk { path, .. } => assert_eq!(path, locked),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");

        let err = rewrite_tree(&root, &mirror()).unwrap_err();

        assert!(matches!(err, RewriteError::Walk { path, .. } if path == root));
    }

    #[cfg(unix)]
    #[test]
    fn keeps_permissions_and_skips_symlinks() {
        use std::os::unix::fs::{PermissionsExt, symlink};

        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("target.txt");
        fs::write(&target, "https://github.com/outside").unwrap();
        symlink(&target, dir.path().join("link.txt")).unwrap();

        let script = dir.path().join("run.sh");
        fs::write(&script, "curl https://github.com/z").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let report = rewrite_tree(dir.path(), &mirror()).unwrap();

        assert_eq!(report.scanned, 1);
        let mode = fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "https://github.com/outside"
        );
    }
}
