//! Archive extraction with content-based format detection and path
//! sanitization.
//!
//! # Architecture
//!
//! - `format.rs` - Format detection and tar codecs
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract/` - Per-format implementations
//! - `entry.rs` - Report types

pub use entry::{ArchiveReport, Entry, EntryKind};
pub use error::{Error, Result};
pub use extract::{ExtractOptions, extract_file, extract_from_reader};
pub use format::{ArchiveFormat, TarCompress, detect_format, detect_from_reader};
pub use sanitize::{SanitizedPath, ensure_within, sanitize_path, sanitize_symlink_target};

mod entry;
mod error;
pub mod extract;
mod format;
mod sanitize;
