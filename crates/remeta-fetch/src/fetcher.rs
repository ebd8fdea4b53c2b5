use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::client::HttpClient;
use crate::error::{FetchError, Result};
use crate::mirror::Mirror;

#[derive(Clone, Debug, Default)]
pub struct FetchOptions {
    /// Route the download through this mirror.
    pub mirror: Option<Mirror>,
    /// Never touch the network.
    pub skip_download: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyPresent,
    Disabled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyPresent => f.write_str("archive already present"),
            Self::Disabled => f.write_str("downloads disabled"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded { url: String, bytes: u64 },
    Skipped { url: String, reason: SkipReason },
}

impl FetchOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Downloaded { url, .. } | Self::Skipped { url, .. } => url,
        }
    }
}

/// Places a remote archive at a local path, at most once.
pub struct Fetcher<C> {
    client: C,
    options: FetchOptions,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, options: FetchOptions) -> Self {
        Self { client, options }
    }

    /// The URL that will actually be requested for `url`.
    pub fn resolve_url<'a>(&self, url: &'a str) -> Cow<'a, str> {
        match &self.options.mirror {
            Some(mirror) => mirror.apply(url),
            None => Cow::Borrowed(url),
        }
    }

    /// Download `url` to `destination` unless it already exists or downloads
    /// are disabled.
    ///
    /// The body is streamed into a temporary file next to `destination` and
    /// renamed into place only once the transfer completes, so a failed
    /// download leaves nothing behind.
    pub fn fetch(&self, url: &str, destination: &Path) -> Result<FetchOutcome> {
        let url = self.resolve_url(url).into_owned();

        if exists(destination)? {
            info!(path = %destination.display(), "archive already present, skipping download");
            return Ok(FetchOutcome::Skipped {
                url,
                reason: SkipReason::AlreadyPresent,
            });
        }
        if self.options.skip_download {
            info!("downloads disabled, skipping");
            return Ok(FetchOutcome::Skipped {
                url,
                reason: SkipReason::Disabled,
            });
        }

        let dir = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut staged = tempfile::Builder::new()
            .prefix(".remeta-download-")
            .tempfile_in(dir)
            .map_err(|source| FetchError::Staging {
                path: dir.to_path_buf(),
                source,
            })?;
        debug!(staging = %staged.path().display(), "staging download");

        info!(%url, "downloading");
        let bytes = self
            .client
            .download(&url, staged.as_file_mut())
            .map_err(|e| FetchError::Download {
                url: url.clone(),
                source: Box::new(e),
            })?;

        staged
            .as_file()
            .sync_all()
            .map_err(|source| FetchError::Staging {
                path: staged.path().to_path_buf(),
                source,
            })?;
        staged
            .persist(destination)
            .map_err(|e| FetchError::Persist {
                path: destination.to_path_buf(),
                source: e.error,
            })?;

        info!(bytes, path = %destination.display(), "download complete");
        Ok(FetchOutcome::Downloaded { url, bytes })
    }
}

fn exists(path: &Path) -> Result<bool> {
    match path.symlink_metadata() {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(FetchError::Inspect {
            path: path.to_path_buf(),
            source,
        }),
    }
}
