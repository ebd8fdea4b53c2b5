use remeta_fetch::{FetchOutcome, Fetcher, HttpClient};
use tracing::info;

use crate::config::Config;
use crate::error::Result;

pub fn run<C: HttpClient>(config: &Config, fetcher: &Fetcher<C>) -> Result<FetchOutcome> {
    let destination = config.archive_path();
    info!(
        url = %fetcher.resolve_url(&config.archive_url),
        dest = %destination.display(),
        "fetching archive"
    );
    Ok(fetcher.fetch(&config.archive_url, &destination)?)
}
