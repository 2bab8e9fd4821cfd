//! ZIP container access on top of the `zip` crate.
//!
//! The engine keeps a current position inside the archive, so every
//! operation that walks or opens an entry holds the handle's lock for its
//! full duration.

mod entry;

use std::{
    fmt,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use ::zip::ZipArchive;
use log::{debug, trace};

pub use self::entry::ZipEntry;
use crate::{
    entry::ContentType,
    error::{ArchiveError, Result},
    util::read_up_to,
};

/// Decoded bytes are pulled from the engine this many at a time.
const CHUNK_SIZE: usize = 64 * 1024;

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// An open ZIP archive shared by the reader and every entry listed from it.
pub(crate) struct ZipHandle {
    path: PathBuf,
    archive: Mutex<ZipArchive<File>>,
}

impl fmt::Debug for ZipHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipHandle")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ZipHandle {
    /// Open the file and read its central directory.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).map_err(ArchiveError::FailedToOpenArchive.logged(path.display()))?;
        let archive =
            ZipArchive::new(file).map_err(ArchiveError::FailedToOpenArchive.logged(path.display()))?;
        debug!("{}: {} zip entries", path.display(), archive.len());
        Ok(ZipHandle {
            path: path.to_path_buf(),
            archive: Mutex::new(archive),
        })
    }

    fn lock(&self, kind: ArchiveError) -> Result<MutexGuard<'_, ZipArchive<File>>> {
        self.archive.lock().map_err(kind.logged(self.path.display()))
    }

    /// List every entry in central directory order.
    ///
    /// `password` is recorded on each entry for later extraction; listing
    /// itself never decrypts anything.
    pub(crate) fn contents(self: &Arc<Self>, password: Option<&Arc<str>>) -> Result<Vec<ZipEntry>> {
        let mut archive = self.lock(ArchiveError::FailedToReadArchive)?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(ArchiveError::FailedToReadArchive.logged(self.path.display()))?;

            let content_type = if file.is_dir() {
                ContentType::Directory
            } else if file.unix_mode().is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
                ContentType::SymbolicLink
            } else {
                ContentType::File
            };
            trace!("{}: {} at {}", self.path.display(), file.name(), file.header_start());

            entries.push(ZipEntry {
                handle: Arc::clone(self),
                password: password.cloned(),
                content_type,
                index,
                offset: file.header_start(),
                name: file.name().to_owned(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                crc32: file.crc32(),
                encrypted: file.encrypted(),
                unix_mode: file.unix_mode(),
            });
        }

        Ok(entries)
    }

    /// Decompress up to `count` bytes of the entry at `index`.
    pub(crate) fn extract(&self, index: usize, password: Option<&str>, count: u64) -> Result<Vec<u8>> {
        trace!("{}: reading {count} bytes of entry {index}", self.path.display());
        let mut archive = self.lock(ArchiveError::FailedToExtractArchive)?;
        let file = match password {
            Some(password) => archive.by_index_decrypt(index, password.as_bytes()),
            None => archive.by_index(index),
        }
        .map_err(ArchiveError::FailedToExtractArchive.logged(self.path.display()))?;

        let mut reader = BufReader::with_capacity(CHUNK_SIZE, file);
        read_up_to(&mut reader, count)
            .map_err(ArchiveError::FailedToExtractArchive.logged(self.path.display()))
    }

    /// Index of the first entry with content, if any.
    ///
    /// Directories and empty files carry no encryption header worth
    /// inspecting, so the encryption checks look at this entry only.
    fn first_nonempty(&self, archive: &mut ZipArchive<File>) -> Result<Option<usize>> {
        for index in 0..archive.len() {
            let file = archive
                .by_index_raw(index)
                .map_err(ArchiveError::FailedToReadArchive.logged(self.path.display()))?;
            if file.size() > 0 {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Returns true if the first entry with content is encrypted.
    pub(crate) fn check_encrypted(&self) -> Result<bool> {
        let mut archive = self.lock(ArchiveError::FailedToReadArchive)?;
        let Some(index) = self.first_nonempty(&mut archive)? else {
            return Ok(false);
        };
        let encrypted = archive
            .by_index_raw(index)
            .map_err(ArchiveError::FailedToReadArchive.logged(self.path.display()))?
            .encrypted();
        debug!("{}: entry {index} encrypted: {encrypted}", self.path.display());
        Ok(encrypted)
    }

    /// Returns true if `candidate` opens the first entry with content.
    ///
    /// An archive whose first such entry is not encrypted accepts any
    /// candidate.
    pub(crate) fn validate_password(&self, candidate: &str) -> Result<bool> {
        let mut archive = self.lock(ArchiveError::FailedToReadArchive)?;
        let Some(index) = self.first_nonempty(&mut archive)? else {
            return Ok(false);
        };
        let valid = match archive.by_index_decrypt(index, candidate.as_bytes()) {
            Ok(_) => true,
            Err(e) => {
                debug!("{}: password rejected for entry {index}: {e}", self.path.display());
                false
            }
        };
        Ok(valid)
    }
}
