use remeta_archive::{ArchiveReport, ExtractOptions, extract_file};
use tracing::info;

use crate::config::Config;
use crate::error::{RefreshError, Result};

pub fn run(config: &Config) -> Result<ArchiveReport> {
    let archive = config.archive_path();
    let destination = config.extract_path();
    info!(archive = %archive.display(), dest = %destination.display(), "extracting");

    let report = extract_file(&archive, &destination, &ExtractOptions::default()).map_err(
        |source| RefreshError::Extract {
            archive: archive.clone(),
            source,
        },
    )?;

    info!(
        format = %report.format,
        entries = report.entry_count,
        bytes = report.total_bytes,
        "extracted"
    );
    Ok(report)
}
