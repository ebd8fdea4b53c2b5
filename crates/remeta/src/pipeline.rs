use std::time::Instant;

use remeta_archive::ArchiveReport;
use remeta_fetch::{FetchOptions, FetchOutcome, Fetcher, HttpClient};
use remeta_fs::ClearReport;
use tracing::{info, info_span, warn};

use crate::config::Config;
use crate::confirm::Confirm;
use crate::error::Result;
use crate::stages::{self, FinalizeReport, RewriteReport};

#[derive(Debug)]
pub struct RunSummary {
    pub cleared: ClearReport,
    pub fetched: FetchOutcome,
    pub extracted: ArchiveReport,
    /// `None` when mirroring is disabled.
    pub rewritten: Option<RewriteReport>,
    pub finalized: FinalizeReport,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Confirmation was declined; the directory is untouched.
    Cancelled,
    Completed(RunSummary),
}

/// Runs reset, fetch, extract, rewrite and finalize against one directory.
pub struct Refresher<C, K> {
    config: Config,
    fetcher: Fetcher<C>,
    confirm: K,
}

impl<C: HttpClient, K: Confirm> Refresher<C, K> {
    pub fn new(config: Config, client: C, confirm: K) -> Result<Self> {
        config.validate()?;
        let options = FetchOptions {
            mirror: config.mirror(),
            skip_download: config.skip_download,
        };
        Ok(Self {
            fetcher: Fetcher::new(client, options),
            config,
            confirm,
        })
    }

    pub fn run(&self) -> Result<RunOutcome> {
        let config = &self.config;

        let Some(cleared) = timed("reset", || stages::reset::run(config, &self.confirm))? else {
            return Ok(RunOutcome::Cancelled);
        };
        let fetched = timed("fetch", || stages::fetch::run(config, &self.fetcher))?;
        let extracted = timed("extract", || stages::extract::run(config))?;
        let rewritten = match config.mirror() {
            Some(mirror) => Some(timed("rewrite", || {
                Ok(stages::rewrite::rewrite_tree(&config.extract_path(), &mirror)?)
            })?),
            None => {
                info!("mirroring disabled, leaving file contents as is");
                None
            }
        };
        let finalized = timed("finalize", || stages::finalize::run(config))?;

        Ok(RunOutcome::Completed(RunSummary {
            cleared,
            fetched,
            extracted,
            rewritten,
            finalized,
        }))
    }
}

fn timed<T>(stage: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let span = info_span!("stage", stage);
    let _enter = span.enter();

    info!("started");
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(elapsed = ?elapsed, "finished"),
        Err(error) => warn!(elapsed = ?elapsed, %error, "failed"),
    }
    result
}
