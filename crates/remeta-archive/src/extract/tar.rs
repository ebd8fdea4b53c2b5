use std::io::Read;
use std::path::Path;

use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, Extracted, PendingEntry, write_entry};
use crate::format::TarCompress;

pub(crate) fn extract<R: Read>(
    reader: R,
    codec: TarCompress,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<Extracted> {
    let mut archive = tar::Archive::new(codec.decoder(reader)?);
    let mut extracted = Extracted::default();

    let entries = archive
        .entries()
        .map_err(|source| Error::Corrupted { source })?;

    for entry in entries {
        let mut entry = entry.map_err(|source| Error::Corrupted { source })?;

        let original_path = entry.path().map_err(|_| Error::InvalidPath)?.into_owned();
        let header = entry.header();
        let size = header.size().unwrap_or(0);
        let mode = header.mode().ok();
        let entry_type = header.entry_type();

        let kind = if entry_type.is_dir() {
            EntryKind::Directory
        } else if entry_type.is_symlink() {
            match entry.link_name() {
                Ok(Some(target)) => EntryKind::Symlink {
                    target: target.into_owned(),
                },
                _ => return Err(Error::InvalidPath),
            }
        } else if entry_type.is_file() {
            EntryKind::File
        } else if entry_type.is_pax_global_extensions() {
            tracing::debug!(entry = %original_path.display(), "skipping pax global header");
            continue;
        } else {
            tracing::warn!(
                entry = %original_path.display(),
                kind = ?entry_type,
                "skipping unsupported tar entry"
            );
            continue;
        };

        let pending = PendingEntry {
            original_path,
            size,
            mode,
            kind,
        };
        let contents: Option<&mut dyn Read> = match pending.kind {
            EntryKind::File => Some(&mut entry),
            _ => None,
        };
        write_entry(pending, contents, destination, options, &mut extracted)?;
    }

    Ok(extracted)
}
