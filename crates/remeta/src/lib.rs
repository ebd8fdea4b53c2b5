//! Refresh a working directory from a remote archive.
//!
//! A run clears the directory (after confirmation), downloads the archive,
//! optionally through a mirror, extracts it, rewrites canonical references
//! to go through the mirror and promotes the archive's top-level folder into
//! the directory. See [`Refresher`].

pub mod cli;
pub mod config;
pub mod confirm;
pub mod error;
pub mod pipeline;
pub mod stages;

pub use config::{Config, ConfigError, FileConfig, Overrides};
pub use confirm::{AssumeYes, Confirm, StdinConfirm};
pub use error::{RefreshError, Result, RewriteError};
pub use pipeline::{Refresher, RunOutcome, RunSummary};
