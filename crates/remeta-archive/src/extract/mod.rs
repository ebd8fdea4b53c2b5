//! Archive extraction for ZIP and TAR formats.
//!
//! Both formats funnel every entry through [`write_entry`], which sanitizes
//! the path, materializes the entry, and records it in the report.
//! Extracting over a previous extraction is safe: files are truncated,
//! stale symlinks are replaced and existing directories are reused.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use crate::entry::{ArchiveReport, Entry, EntryKind};
use crate::error::{Error, Result};
use crate::format::{self, ArchiveFormat};
use crate::sanitize::{ensure_within, sanitize_path, sanitize_symlink_target};

#[cfg(feature = "tar")]
mod tar;
#[cfg(feature = "zip")]
mod zip;

#[derive(Clone, Copy, Debug)]
pub struct ExtractOptions {
    /// Apply unix mode bits recorded in the archive to extracted files.
    pub preserve_permissions: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            preserve_permissions: true,
        }
    }
}

/// Running totals while entries are written.
#[derive(Default)]
pub(crate) struct Extracted {
    pub entries: Vec<Entry>,
    pub total_bytes: u64,
}

impl Extracted {
    fn into_report(self, format: ArchiveFormat) -> ArchiveReport {
        ArchiveReport {
            format,
            entry_count: self.entries.len(),
            total_bytes: self.total_bytes,
            entries: self.entries,
        }
    }
}

/// Extract the archive at `archive` into `destination`, creating it first.
pub fn extract_file(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let archive = archive.as_ref();
    let destination = destination.as_ref();

    ensure_directory(destination)?;
    let file = File::open(archive).map_err(|e| Error::Open {
        path: archive.to_path_buf(),
        source: e,
    })?;

    extract_from_reader(BufReader::new(file), destination, options)
}

/// Extract archive with automatic format detection.
///
/// The format is sniffed from the leading bytes, the reader is rewound, and
/// all entries are written below `destination`.
pub fn extract_from_reader<R: Read + Seek>(
    mut reader: R,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<ArchiveReport> {
    let format = format::detect_from_reader(&mut reader)?.ok_or(Error::UnsupportedFormat)?;
    ensure_directory(destination)?;
    tracing::debug!(%format, destination = %destination.display(), "detected archive format");

    let extracted = match format {
        #[cfg(feature = "zip")]
        ArchiveFormat::Zip => zip::extract(reader, destination, options)?,
        #[cfg(feature = "tar")]
        ArchiveFormat::Tar(codec) => tar::extract(reader, codec, destination, options)?,
        #[allow(unreachable_patterns)]
        _ => return Err(Error::UnsupportedFormat),
    };

    Ok(extracted.into_report(format))
}

/// Metadata of one entry read from an archive, before it hits the disk.
pub(crate) struct PendingEntry {
    pub original_path: std::path::PathBuf,
    pub size: u64,
    pub mode: Option<u32>,
    pub kind: EntryKind,
}

pub(crate) fn write_entry(
    pending: PendingEntry,
    contents: Option<&mut dyn Read>,
    destination: &Path,
    options: &ExtractOptions,
    extracted: &mut Extracted,
) -> Result<()> {
    let sanitized = sanitize_path(&pending.original_path, destination)?;
    if sanitized.relative.as_os_str().is_empty() {
        // the archive's "./" entry
        return Ok(());
    }
    let target = &sanitized.resolved;
    if let Some(parent) = target.parent() {
        ensure_within(parent, destination)?;
    }

    match &pending.kind {
        EntryKind::Directory => ensure_directory(target)?,
        EntryKind::File => {
            write_file(contents, target)?;
            if options.preserve_permissions {
                apply_mode(target, pending.mode)?;
            }
            extracted.total_bytes += pending.size;
        }
        EntryKind::Symlink { target: link_target } => {
            sanitize_symlink_target(link_target, &sanitized.relative, destination)?;
            if let Some(parent) = target.parent() {
                ensure_within(parent.join(link_target), destination)?;
            }
            write_symlink(link_target, target)?;
        }
    }

    tracing::trace!(entry = %pending.original_path.display(), "extracted");
    extracted.entries.push(Entry {
        original_path: pending.original_path,
        target_path: sanitized.resolved,
        size: pending.size,
        mode: pending.mode,
        kind: pending.kind,
    });
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => ensure_directory(parent),
        None => Ok(()),
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if let Ok(meta) = fs::symlink_metadata(path) {
        if meta.is_dir() {
            return Ok(());
        }
        remove_stale(path)?;
    }
    fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Remove a non-directory left by an earlier extraction so it is not
/// written through.
fn remove_stale(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() || meta.is_file() => {
            fs::remove_file(path).map_err(|e| Error::ExtractionFailed {
                path: path.to_path_buf(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

fn write_file(contents: Option<&mut dyn Read>, target: &Path) -> Result<()> {
    ensure_parent(target)?;
    if let Ok(meta) = fs::symlink_metadata(target)
        && meta.file_type().is_symlink()
    {
        remove_stale(target)?;
    }

    let mut file = File::create(target).map_err(|e| Error::ExtractionFailed {
        path: target.to_path_buf(),
        source: e,
    })?;
    if let Some(reader) = contents {
        io::copy(reader, &mut file).map_err(|e| Error::ExtractionFailed {
            path: target.to_path_buf(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(unix)]
fn apply_mode(target: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(target, fs::Permissions::from_mode(mode & 0o777)).map_err(|e| {
            Error::ExtractionFailed {
                path: target.to_path_buf(),
                source: e,
            }
        })?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_target: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    ensure_parent(link)?;
    remove_stale(link)?;
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::SymlinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })
}

#[cfg(windows)]
fn write_symlink(target: &Path, link: &Path) -> Result<()> {
    use std::os::windows::fs;
    ensure_parent(link)?;
    remove_stale(link)?;
    let is_dir_target = link.parent().map(|p| p.join(target).is_dir()).unwrap_or(false);
    let created = if is_dir_target {
        fs::symlink_dir(target, link)
    } else {
        fs::symlink_file(target, link)
    };
    created.map_err(|e| Error::SymlinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })
}
