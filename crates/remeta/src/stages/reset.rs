use remeta_fs::{ClearReport, clear_dir};
use tracing::info;

use crate::config::Config;
use crate::confirm::Confirm;
use crate::error::{RefreshError, Result};

/// Clear the working directory after confirmation.
///
/// Returns `None` when the user declines; nothing has been touched then.
pub fn run<K: Confirm>(config: &Config, confirm: &K) -> Result<Option<ClearReport>> {
    let protected = config.protected_names();
    let listed = protected
        .iter()
        .map(|n| n.to_string_lossy())
        .collect::<Vec<_>>()
        .join(", ");

    info!(dir = %config.work_dir.display(), "working directory");
    info!(protected = %listed, "everything else will be deleted");

    let prompt = format!(
        "Delete everything in {} except {listed}?",
        config.work_dir.display()
    );
    if !confirm.confirm(&prompt).map_err(RefreshError::Confirm)? {
        info!("cancelled");
        return Ok(None);
    }

    let report = clear_dir(&config.work_dir, &protected).map_err(RefreshError::Reset)?;
    info!(
        removed = report.removed_count(),
        failed = report.failed.len(),
        "reset complete"
    );
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;
    use std::io;

    struct Answer {
        accept: bool,
        asked: Cell<u32>,
    }

    impl Confirm for Answer {
        fn confirm(&self, _prompt: &str) -> io::Result<bool> {
            self.asked.set(self.asked.get() + 1);
            Ok(self.accept)
        }
    }

    fn populated() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("remeta"), "bin").unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("old.ckan"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("Mod/sub")).unwrap();
        dir
    }

    #[test]
    fn declined_keeps_everything() {
        let dir = populated();
        let config = Config::new(dir.path()).with_program_name("remeta");
        let answer = Answer {
            accept: false,
            asked: Cell::new(0),
        };

        assert!(run(&config, &answer).unwrap().is_none());

        assert_eq!(answer.asked.get(), 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn accepted_removes_unprotected() {
        let dir = populated();
        let config = Config::new(dir.path()).with_program_name("remeta");
        let answer = Answer {
            accept: true,
            asked: Cell::new(0),
        };

        let report = run(&config, &answer).unwrap().unwrap();

        assert_eq!(report.removed_count(), 2);
        assert_eq!(report.skipped.len(), 2);
        assert!(dir.path().join("remeta").is_file());
        assert!(dir.path().join(".git").is_dir());
        assert!(!dir.path().join("old.ckan").exists());
        assert!(!dir.path().join("Mod").exists());
    }
}
