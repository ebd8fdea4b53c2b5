use std::path::{Path, PathBuf};

use crate::format::ArchiveFormat;

/// An archive entry as it was written to disk.
#[derive(Clone, Debug)]
pub struct Entry {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn symlink_target(&self) -> Option<&Path> {
        match &self.kind {
            EntryKind::Symlink { target } => Some(target),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink { target: PathBuf },
}

#[derive(Clone, Debug)]
pub struct ArchiveReport {
    pub format: ArchiveFormat,
    pub entry_count: usize,
    pub total_bytes: u64,
    pub entries: Vec<Entry>,
}

impl ArchiveReport {
    pub fn files(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.is_file())
    }

    /// Top-level names the archive produced, in first-seen order.
    pub fn top_level_names(&self) -> Vec<&std::ffi::OsStr> {
        let mut names = Vec::new();
        for entry in &self.entries {
            let first = entry
                .original_path
                .components()
                .find(|c| matches!(c, std::path::Component::Normal(_)));
            if let Some(std::path::Component::Normal(name)) = first
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }
}
