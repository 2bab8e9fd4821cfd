use std::{fmt, sync::Arc};

use super::ZipHandle;
use crate::{entry::ContentType, error::Result, util::is_hidden_name};

/// One entry of a ZIP archive, as listed in the central directory.
///
/// The password the listing was made with travels with the entry and is
/// used for every later read.
#[derive(Clone)]
pub struct ZipEntry {
    pub(super) handle: Arc<ZipHandle>,
    pub(super) password: Option<Arc<str>>,
    pub(super) content_type: ContentType,

    /// Position of the entry in the central directory.
    pub index: usize,
    /// Byte offset of the entry's local header within the archive.
    pub offset: u64,
    /// Entry path as stored in the archive.
    pub name: String,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Compressed size in bytes.
    pub compressed_size: u64,
    /// CRC-32 of the uncompressed data.
    pub crc32: u32,
    /// Whether the entry data is encrypted.
    pub encrypted: bool,
    /// Unix mode bits, when the archive was written on a Unix host.
    pub unix_mode: Option<u32>,
}

impl fmt::Debug for ZipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipEntry")
            .field("index", &self.index)
            .field("offset", &self.offset)
            .field("name", &self.name)
            .field("size", &self.size)
            .field("compressed_size", &self.compressed_size)
            .field("crc32", &format_args!("{:08x}", self.crc32))
            .field("encrypted", &self.encrypted)
            .field("content_type", &self.content_type)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl ZipEntry {
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns true if the final path component starts with a dot.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }

    /// Returns true if a password was supplied when this entry was listed.
    #[must_use]
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Decompress (and decrypt) the entry's full content.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToExtractArchive`](crate::ArchiveError::FailedToExtractArchive)
    /// if the entry cannot be opened, for example because it is encrypted and
    /// the password is missing or wrong.
    pub fn data(&self) -> Result<Vec<u8>> {
        self.data_up_to(self.size)
    }

    /// Decompress at most `count` bytes of the entry's content.
    ///
    /// # Errors
    ///
    /// As for [`ZipEntry::data`].
    pub fn data_up_to(&self, count: u64) -> Result<Vec<u8>> {
        let password = self.password.as_deref();
        self.handle.extract(self.index, password, count.min(self.size))
    }
}
