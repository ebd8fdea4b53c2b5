//! Error types for remeta-fetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("download of {url} failed")]
    Download {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to stage download in {path}")]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to place download at {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to inspect {path}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    /// Whether the failure happened on the network side rather than locally.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Download { .. })
    }
}
