//! Mirror-aware archive download.
//!
//! The [`Fetcher`] decides whether a download is needed at all, rewrites the
//! URL through an optional [`Mirror`] and streams the body through an
//! [`HttpClient`] into a staged file that is only renamed into place once
//! complete.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod mirror;
pub mod tracker;

pub use client::HttpClient;
#[cfg(feature = "reqwest")]
pub use client::{ClientError, ClientSetting, ReqwestClient};
#[cfg(feature = "reqwest")]
pub use reqwest::Url;
pub use error::{FetchError, Result};
pub use fetcher::{FetchOptions, FetchOutcome, Fetcher, SkipReason};
pub use mirror::{GITHUB_PREFIX, Mirror};
