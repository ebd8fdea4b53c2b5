use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use crate::entry::EntryKind;
use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, Extracted, PendingEntry, write_entry};

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

pub(crate) fn extract<R: Read + Seek>(
    reader: R,
    destination: &Path,
    options: &ExtractOptions,
) -> Result<Extracted> {
    let mut archive = zip::ZipArchive::new(reader).map_err(Error::CorruptedZip)?;
    let mut extracted = Extracted::default();

    for index in 0..archive.len() {
        let mut file = archive.by_index(index).map_err(Error::CorruptedZip)?;

        let original_path = PathBuf::from(file.name());
        let size = file.size();
        let mode = file.unix_mode();
        let is_symlink = mode.is_some_and(|m| m & S_IFMT == S_IFLNK);

        let kind = if file.is_dir() {
            EntryKind::Directory
        } else if is_symlink {
            let mut target = String::new();
            file.read_to_string(&mut target)
                .map_err(|_| Error::InvalidPath)?;
            EntryKind::Symlink {
                target: PathBuf::from(target),
            }
        } else {
            EntryKind::File
        };

        let pending = PendingEntry {
            original_path,
            size,
            mode,
            kind,
        };
        let contents: Option<&mut dyn Read> = match pending.kind {
            EntryKind::File => Some(&mut file),
            _ => None,
        };
        write_entry(pending, contents, destination, options, &mut extracted)?;
    }

    Ok(extracted)
}
