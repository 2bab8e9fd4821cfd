//! The format-independent view of an archive entry.

use std::{fs, path::Path};

use log::debug;

use crate::{
    error::{ArchiveError, Result},
    format::Format,
    tar::TarEntry,
    zip::ZipEntry,
};

/// What kind of filesystem object an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Directory,
    File,
    SymbolicLink,
    /// Hard links, devices, FIFOs and anything unrecognized.
    Unknown,
}

/// An entry listed from an archive of either format.
///
/// Entries are snapshots: they never change after listing, and reading
/// their data always goes back to the archive they came from. They may be
/// cloned and shared across threads freely.
#[derive(Debug, Clone)]
pub enum Entry {
    Tar(TarEntry),
    Zip(ZipEntry),
}

impl Entry {
    /// The entry path as stored in the archive.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Entry::Tar(entry) => &entry.name,
            Entry::Zip(entry) => &entry.name,
        }
    }

    /// The logical (uncompressed) size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Entry::Tar(entry) => entry.size,
            Entry::Zip(entry) => entry.size,
        }
    }

    /// Byte offset of the entry's header within the archive.
    #[must_use]
    pub fn offset(&self) -> u64 {
        match self {
            Entry::Tar(entry) => entry.offset,
            Entry::Zip(entry) => entry.offset,
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        match self {
            Entry::Tar(entry) => entry.is_hidden(),
            Entry::Zip(entry) => entry.is_hidden(),
        }
    }

    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self {
            Entry::Tar(entry) => entry.content_type(),
            Entry::Zip(entry) => entry.content_type(),
        }
    }

    /// The format of the archive this entry came from.
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Entry::Tar(_) => Format::Tar,
            Entry::Zip(_) => Format::Zip,
        }
    }

    /// Read the entry's full content.
    ///
    /// Reading is idempotent: repeated calls return the same bytes.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToExtractArchive`] if the data cannot be read.
    pub fn data(&self) -> Result<Vec<u8>> {
        match self {
            Entry::Tar(entry) => entry.data(),
            Entry::Zip(entry) => entry.data(),
        }
    }

    /// Read at most `count` bytes from the start of the entry's content.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToExtractArchive`] if the data cannot be read.
    pub fn data_up_to(&self, count: u64) -> Result<Vec<u8>> {
        match self {
            Entry::Tar(entry) => entry.data_up_to(count),
            Entry::Zip(entry) => entry.data_up_to(count),
        }
    }

    /// Materialize the entry at `dest`.
    ///
    /// Directories are created (with any missing parents). Everything else
    /// has its content written to a file at `dest`, creating parent
    /// directories as needed; symbolic links are written as a file holding
    /// the link target. No ownership, permissions or timestamps are applied.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToExtractArchive`] if the data cannot be read or
    /// the destination cannot be written.
    pub fn write_to(&self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let failed = || ArchiveError::FailedToExtractArchive.logged(dest.display());

        if self.content_type() == ContentType::Directory {
            debug!("{}: creating directory for {}", dest.display(), self.name());
            return fs::create_dir_all(dest).map_err(failed());
        }

        let data = self.data()?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(failed())?;
        }
        debug!("{}: writing {} bytes of {}", dest.display(), data.len(), self.name());
        fs::write(dest, data).map_err(failed())
    }
}

impl From<TarEntry> for Entry {
    fn from(entry: TarEntry) -> Self {
        Entry::Tar(entry)
    }
}

impl From<ZipEntry> for Entry {
    fn from(entry: ZipEntry) -> Self {
        Entry::Zip(entry)
    }
}
