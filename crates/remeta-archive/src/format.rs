use std::fmt;
use std::io::{self, Read, Seek};

use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar(TarCompress),
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::Tar(TarCompress::None) => f.write_str("tar"),
            Self::Tar(TarCompress::Gzip) => f.write_str("tar.gz"),
            Self::Tar(TarCompress::Xz) => f.write_str("tar.xz"),
            Self::Tar(TarCompress::Zstd) => f.write_str("tar.zst"),
        }
    }
}

/// Compression codec for tar archives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarCompress {
    None,
    Gzip,
    Xz,
    Zstd,
}

/// Decompressed view of a tar stream.
#[cfg(feature = "tar")]
pub enum Decoder<R: Read> {
    Passthrough(R),
    Gzip(Box<flate2::read::GzDecoder<R>>),
    #[cfg(feature = "xz")]
    Xz(Box<xz2::read::XzDecoder<R>>),
    #[cfg(feature = "zstd")]
    Zstd(Box<zstd::stream::read::Decoder<'static, io::BufReader<R>>>),
}

#[cfg(feature = "tar")]
impl TarCompress {
    /// Wrap `reader` so that reads yield the raw tar bytes.
    pub fn decoder<R: Read>(self, reader: R) -> Result<Decoder<R>, Error> {
        let decoder = match self {
            Self::None => Decoder::Passthrough(reader),
            Self::Gzip => Decoder::Gzip(Box::new(flate2::read::GzDecoder::new(reader))),
            #[cfg(feature = "xz")]
            Self::Xz => Decoder::Xz(Box::new(xz2::read::XzDecoder::new(reader))),
            #[cfg(feature = "zstd")]
            Self::Zstd => Decoder::Zstd(Box::new(
                zstd::stream::read::Decoder::new(reader)
                    .map_err(|source| Error::Corrupted { source })?,
            )),
            #[allow(unreachable_patterns)]
            _ => return Err(Error::UnsupportedFormat),
        };
        Ok(decoder)
    }
}

#[cfg(feature = "tar")]
impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let inner: &mut dyn Read = match self {
            Self::Passthrough(r) => r,
            Self::Gzip(d) => d.as_mut(),
            #[cfg(feature = "xz")]
            Self::Xz(d) => d.as_mut(),
            #[cfg(feature = "zstd")]
            Self::Zstd(d) => d.as_mut(),
        };
        inner.read(buf)
    }
}

const TAR_BLOCK: usize = 512;

/// Byte offset of the ustar magic inside a tar header block.
const USTAR_MAGIC_AT: usize = 257;

const SIGNATURES: &[(&[u8], ArchiveFormat)] = &[
    (b"PK\x03\x04", ArchiveFormat::Zip),
    (b"PK\x05\x06", ArchiveFormat::Zip),
    (b"\x1f\x8b", ArchiveFormat::Tar(TarCompress::Gzip)),
    (b"\x28\xb5\x2f\xfd", ArchiveFormat::Tar(TarCompress::Zstd)),
    (b"\xfd7zXZ\x00", ArchiveFormat::Tar(TarCompress::Xz)),
];

/// Identify an archive from its leading bytes.
///
/// Compressed streams are assumed to wrap a tar. An uncompressed tar is
/// only recognised from a full header block carrying the ustar magic.
pub fn detect_format(data: &[u8]) -> Option<ArchiveFormat> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map(|(_, format)| *format)
        .or_else(|| {
            let magic = data.get(USTAR_MAGIC_AT..USTAR_MAGIC_AT + 5)?;
            (data.len() >= TAR_BLOCK && magic == b"ustar")
                .then_some(ArchiveFormat::Tar(TarCompress::None))
        })
}

/// Sniff the format from the first block of `reader`, then rewind it.
pub fn detect_from_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Option<ArchiveFormat>> {
    let mut head = Vec::with_capacity(TAR_BLOCK);
    reader.by_ref().take(TAR_BLOCK as u64).read_to_end(&mut head)?;
    reader.rewind()?;
    Ok(detect_format(&head))
}
