//! Container format detection.
//!
//! Detection looks at the file itself before any reader is built: TAR has no
//! reliable magic, so it is recognized from the extension plus a block-aligned
//! size, while ZIP is recognized from its leading signature.

use std::{
    fmt,
    fs::File,
    io::{ErrorKind, Read},
    path::Path,
};

use log::{debug, trace};
use tar_block::BLOCK_SIZE;

use crate::error::{ArchiveError, Result};

/// Leading signatures that identify a ZIP file.
const ZIP_SIGNATURES: [[u8; 4]; 3] = [
    // local file header
    [0x50, 0x4B, 0x03, 0x04],
    // end of central directory only (empty archive)
    [0x50, 0x4B, 0x05, 0x06],
    // data descriptor marker (spanned archive)
    [0x50, 0x4B, 0x07, 0x08],
];

/// The number of leading bytes needed to match any ZIP signature.
const ZIP_PROBE_LEN: usize = 4;

/// A supported archive container format.
///
/// Formats are tried in declaration order by [`Format::detect`]; the first
/// match wins. The checks are mutually exclusive, so the order only decides
/// which probe runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// POSIX/UStar/GNU tape archive.
    Tar,
    /// PKWARE ZIP.
    Zip,
}

impl Format {
    /// Every supported format, in detection order.
    pub const ALL: [Format; 2] = [Format::Tar, Format::Zip];

    /// Detect the format of the file at `path`.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::UnsupportedFileFormat`] if nothing matches, or
    /// [`ArchiveError::FailedToOpenArchive`] if the file cannot be probed.
    pub fn detect(path: &Path) -> Result<Format> {
        for format in Format::ALL {
            let matched = format
                .matches(path)
                .map_err(ArchiveError::FailedToOpenArchive.logged(path.display()))?;
            if matched {
                debug!("{}: detected {format}", path.display());
                return Ok(format);
            }
        }
        debug!("{}: no supported format", path.display());
        Err(ArchiveError::UnsupportedFileFormat)
    }

    /// Identify a format from the leading bytes of a file.
    ///
    /// Only ZIP carries a leading signature; TAR is never returned here.
    #[must_use]
    pub fn from_magic(bytes: &[u8]) -> Option<Format> {
        let prefix = bytes.get(..ZIP_PROBE_LEN)?;
        ZIP_SIGNATURES
            .iter()
            .any(|signature| prefix == signature)
            .then_some(Format::Zip)
    }

    /// The canonical file extension, without a dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Format::Tar => "tar",
            Format::Zip => "zip",
        }
    }

    fn matches(self, path: &Path) -> std::io::Result<bool> {
        match self {
            Format::Tar => {
                let is_tar_extension = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(self.extension()));
                let size = std::fs::metadata(path)?.len();
                trace!("{}: tar probe, size {size}", path.display());
                Ok(is_tar_extension && size > 0 && size % BLOCK_SIZE as u64 == 0)
            }
            Format::Zip => {
                let mut probe = [0u8; ZIP_PROBE_LEN];
                match File::open(path)?.read_exact(&mut probe) {
                    Ok(()) => Ok(Format::from_magic(&probe) == Some(Format::Zip)),
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
                    Err(e) => Err(e),
                }
            }
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Tar => "TAR",
            Format::Zip => "ZIP",
        })
    }
}
