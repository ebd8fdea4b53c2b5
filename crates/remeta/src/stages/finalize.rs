use std::path::PathBuf;

use remeta_fs::{promote_children, remove_entry};
use tracing::info;

use crate::config::Config;
use crate::error::{RefreshError, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    /// New locations of the promoted entries, in name order.
    pub promoted: Vec<PathBuf>,
}

/// Hoist the nested root's children into the working directory, then drop
/// the archive and the extraction directory.
pub fn run(config: &Config) -> Result<FinalizeReport> {
    let nested = config.nested_root_path();
    if !nested.is_dir() {
        return Err(RefreshError::Layout {
            expected: nested,
            found: list_names(&config.extract_path()),
        });
    }

    let promoted = promote_children(&nested, &config.work_dir).map_err(RefreshError::Promote)?;
    info!(count = promoted.len(), "moved extracted entries to root");

    for path in [config.archive_path(), config.extract_path()] {
        if path.symlink_metadata().is_err() {
            continue;
        }
        remove_entry(&path).map_err(|source| RefreshError::Cleanup {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "removed");
    }

    Ok(FinalizeReport { promoted })
}

fn list_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
