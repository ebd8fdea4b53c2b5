//! Filesystem primitives used to reset, rewrite and repopulate a working
//! directory.
//!
//! - [`clear_dir`] - best-effort removal of a directory's children
//! - [`atomic_write`] - in-place replacement through temp file and rename
//! - [`promote_children`] - hoist a nested folder's children one level up

mod clear;
mod error;
pub mod primitives;

pub use clear::{ClearFailure, ClearReport, Removed, clear_dir};
pub use error::{Error, Result};
pub use primitives::{
    AtomicWriteOptions, EntryKind, atomic_read, atomic_write, copy_dir_all, move_entry,
    promote_children, remove_entry,
};
