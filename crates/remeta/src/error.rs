use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, RefreshError>;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("confirmation prompt failed")]
    Confirm(#[source] io::Error),

    #[error("failed to list working directory")]
    Reset(#[source] remeta_fs::Error),

    #[error(transparent)]
    Fetch(#[from] remeta_fetch::FetchError),

    #[error("failed to extract {archive}")]
    Extract {
        archive: PathBuf,
        #[source]
        source: remeta_archive::Error,
    },

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error("expected {expected} after extraction, found {found:?}")]
    Layout {
        expected: PathBuf,
        found: Vec<String>,
    },

    #[error("failed to move extracted files into place")]
    Promote(#[source] remeta_fs::Error),

    #[error("failed to remove {path}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: remeta_fs::Error,
    },
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("{path} is not valid UTF-8")]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("failed to walk {path}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Fs(#[from] remeta_fs::Error),
}
