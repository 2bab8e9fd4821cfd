//! TAR container access.
//!
//! A TAR archive is a sequence of 512-byte header blocks, each followed by
//! the entry data padded to a whole number of blocks. There is no central
//! index, so listing walks the file block by block from the start:
//!
//! - a block that decodes as an entry advances the cursor past its data;
//! - a block that does not (padding, garbage, an empty regular file) advances
//!   the cursor by one block;
//! - PAX extended headers are skipped together with their payload and never
//!   listed;
//! - a trailing partial block ends the walk.

mod entry;

use std::{
    fs::File,
    io::{Seek, SeekFrom},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

use log::trace;
use tar_block::{Block, BLOCK_SIZE};

pub use self::entry::TarEntry;
use crate::{
    error::{ArchiveError, Result},
    util::{read_fully, read_up_to},
};

/// An open TAR file shared by the reader and every entry listed from it.
///
/// Each seek+read pair runs under the lock, so entries can be read from
/// several threads at once.
#[derive(Debug)]
pub(crate) struct TarHandle {
    path: PathBuf,
    file: Mutex<File>,
}

impl TarHandle {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).map_err(ArchiveError::FailedToOpenArchive.logged(path.display()))?;
        Ok(TarHandle {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    fn lock(&self, kind: ArchiveError) -> Result<MutexGuard<'_, File>> {
        self.file.lock().map_err(kind.logged(self.path.display()))
    }

    /// List every entry in archive order.
    pub(crate) fn contents(self: &Arc<Self>) -> Result<Vec<TarEntry>> {
        let failed = || ArchiveError::FailedToReadArchive.logged(self.path.display());

        let mut file = self.lock(ArchiveError::FailedToReadArchive)?;
        let file_size = file.metadata().map_err(failed())?.len();

        let mut entries = vec![];
        let mut buf = [0u8; BLOCK_SIZE];
        let mut offset = 0u64;

        while offset < file_size {
            file.seek(SeekFrom::Start(offset)).map_err(failed())?;
            let n = read_fully(&mut *file, &mut buf).map_err(failed())?;
            let Ok(block) = Block::from_bytes(&buf[..n]) else {
                trace!("{}: {n} trailing bytes at {offset}", self.path.display());
                break;
            };

            match TarEntry::decode(block, offset, self) {
                Some(entry) => {
                    offset = offset.saturating_add(entry.total_block_size());
                    if entry.type_flag.is_extended_header() {
                        trace!(
                            "{}: skipping extended header at {}",
                            self.path.display(),
                            entry.offset
                        );
                    } else {
                        trace!("{}: {} at {}", self.path.display(), entry.name, entry.offset);
                        entries.push(entry);
                    }
                }
                None => {
                    if !block.is_zero() {
                        trace!("{}: skipping undecodable block at {offset}", self.path.display());
                    }
                    offset += BLOCK_SIZE as u64;
                }
            }
        }

        Ok(entries)
    }

    /// Read up to `count` bytes starting at `offset`.
    pub(crate) fn extract(&self, offset: u64, count: u64) -> Result<Vec<u8>> {
        let failed = || ArchiveError::FailedToExtractArchive.logged(self.path.display());

        trace!("{}: reading {count} bytes at {offset}", self.path.display());
        let mut file = self.lock(ArchiveError::FailedToExtractArchive)?;
        file.seek(SeekFrom::Start(offset)).map_err(failed())?;
        read_up_to(&mut *file, count).map_err(failed())
    }
}
