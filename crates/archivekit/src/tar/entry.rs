//! Decoding of one header block into a [`TarEntry`].

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tar_block::{Block, Permissions, TypeFlag, BLOCK_SIZE};

use super::TarHandle;
use crate::{entry::ContentType, error::Result, util::is_hidden_name};

/// One entry of a TAR archive: the decoded header plus where its data lives.
///
/// Numeric fields that could not be decoded hold their defaults (zero, the
/// epoch, or an empty string). The checksum is reported as stored and is
/// never verified.
#[derive(Debug, Clone)]
pub struct TarEntry {
    handle: Arc<TarHandle>,
    /// Total span of header plus padded data, in bytes.
    block_size: u64,

    /// Byte offset of the header block within the archive.
    pub offset: u64,
    /// Entry path as stored in the header.
    pub name: String,
    /// Permission bits.
    pub mode: Permissions,
    /// Owner user ID.
    pub uid: u64,
    /// Owner group ID.
    pub gid: u64,
    /// Logical content size in bytes.
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: u64,
    /// Header checksum field, unverified.
    pub checksum: u64,
    /// Raw entry type.
    pub type_flag: TypeFlag,
    /// Link target for hard and symbolic links.
    pub link_name: String,
    /// Format magic ("ustar" for UStar and GNU archives, empty for V7).
    pub magic: String,
    /// Format version.
    pub version: String,
    /// Owner user name.
    pub user_name: String,
    /// Owner group name.
    pub group_name: String,
    /// Device major number for character and block devices.
    pub device_major: u32,
    /// Device minor number for character and block devices.
    pub device_minor: u32,
}

impl TarEntry {
    /// Decode a header block found at `offset`.
    ///
    /// Returns `None` if the block is not an entry header: the size or type
    /// cannot be decoded, the name is missing or empty, or it is a regular
    /// file of size zero. Empty regular files are therefore never listed.
    pub(crate) fn decode(block: &Block, offset: u64, handle: &Arc<TarHandle>) -> Option<Self> {
        let size = block.size()?;
        let type_flag = block.type_flag()?;
        if type_flag == TypeFlag::Regular && size == 0 {
            return None;
        }
        let name = block.name().filter(|name| !name.is_empty())?;
        let block_size = size
            .checked_next_multiple_of(BLOCK_SIZE as u64)?
            .checked_add(BLOCK_SIZE as u64)?;

        let text = |field: Option<&str>| field.unwrap_or_default().to_owned();

        Some(TarEntry {
            handle: Arc::clone(handle),
            block_size,
            offset,
            name: name.to_owned(),
            mode: block.mode().unwrap_or_default(),
            uid: block.uid().unwrap_or(0),
            gid: block.gid().unwrap_or(0),
            size,
            mtime: block.mtime().unwrap_or(0),
            checksum: block.checksum().unwrap_or(0),
            type_flag,
            link_name: text(block.link_name()),
            magic: text(block.magic()),
            version: text(block.version()),
            user_name: text(block.user_name()),
            group_name: text(block.group_name()),
            device_major: block.device_major().unwrap_or(0),
            device_minor: block.device_minor().unwrap_or(0),
        })
    }

    /// The unified content type for this entry's type flag.
    #[must_use]
    pub fn content_type(&self) -> ContentType {
        match self.type_flag {
            TypeFlag::Regular => ContentType::File,
            TypeFlag::Symlink => ContentType::SymbolicLink,
            TypeFlag::Directory => ContentType::Directory,
            _ => ContentType::Unknown,
        }
    }

    /// Returns true if the final path component starts with a dot.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }

    /// The modification time.
    #[must_use]
    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH
            .checked_add(Duration::from_secs(self.mtime))
            .unwrap_or(UNIX_EPOCH)
    }

    /// Byte offset of the entry's data within the archive.
    #[must_use]
    pub fn data_offset(&self) -> u64 {
        self.offset + BLOCK_SIZE as u64
    }

    /// The data size rounded up to whole blocks.
    #[must_use]
    pub fn data_block_size(&self) -> u64 {
        self.block_size - BLOCK_SIZE as u64
    }

    /// The header block plus the padded data: the distance to the next header.
    #[must_use]
    pub fn total_block_size(&self) -> u64 {
        self.block_size
    }

    /// Read the entry's full content.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToExtractArchive`](crate::ArchiveError::FailedToExtractArchive)
    /// if the data cannot be read.
    pub fn data(&self) -> Result<Vec<u8>> {
        self.handle.extract(self.data_offset(), self.size)
    }

    /// Read at most `count` bytes of the entry's content.
    ///
    /// The count is capped at the logical size, so block padding is never
    /// returned.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToExtractArchive`](crate::ArchiveError::FailedToExtractArchive)
    /// if the data cannot be read.
    pub fn data_up_to(&self, count: u64) -> Result<Vec<u8>> {
        self.handle.extract(self.data_offset(), count.min(self.size))
    }
}

#[cfg(test)]
mod test {
    use similar_asserts::assert_eq;

    use super::*;
    use crate::tar::test::{header_block, regular, TarImage};

    fn handle() -> (tempfile::TempDir, Arc<TarHandle>) {
        let image = TarImage::new();
        image.into_handle()
    }

    #[test]
    fn test_decode_regular_file() {
        let (_dir, handle) = handle();
        let block = regular("docs/readme.md", 600);
        let entry = TarEntry::decode(Block::from_bytes(&block).unwrap(), 1024, &handle).unwrap();

        assert_eq!(entry.name, "docs/readme.md");
        assert_eq!(entry.size, 600);
        assert_eq!(entry.type_flag, TypeFlag::Regular);
        assert_eq!(entry.content_type(), ContentType::File);
        assert_eq!(entry.mode, Permissions::from_bits(0o644));
        assert_eq!(entry.uid, 1000);
        assert_eq!(entry.gid, 1000);
        assert_eq!(entry.mtime, 1_234_567_890);
        assert_eq!(entry.magic, "ustar");
        assert_eq!(entry.user_name, "user");
        assert_eq!(entry.offset, 1024);
        assert_eq!(entry.data_offset(), 1536);
        assert_eq!(entry.data_block_size(), 1024);
        assert_eq!(entry.total_block_size(), 1536);
        assert!(!entry.is_hidden());
    }

    #[test]
    fn test_block_sizes() {
        let (_dir, handle) = handle();
        for (size, data_blocks) in [(1, 512), (511, 512), (512, 512), (513, 1024), (1024, 1024)] {
            let block = regular("f", size);
            let entry = TarEntry::decode(Block::from_bytes(&block).unwrap(), 0, &handle).unwrap();
            assert_eq!(entry.data_block_size(), data_blocks, "size {size}");
            assert_eq!(entry.total_block_size(), data_blocks + 512, "size {size}");
        }

        let block = header_block("d/", 0, b'5');
        let entry = TarEntry::decode(Block::from_bytes(&block).unwrap(), 0, &handle).unwrap();
        assert_eq!(entry.data_block_size(), 0);
        assert_eq!(entry.total_block_size(), 512);
    }

    #[test]
    fn test_content_types() {
        let (_dir, handle) = handle();
        let cases = [
            (b'0', ContentType::File),
            (b'\0', ContentType::File),
            (b'1', ContentType::Unknown),
            (b'2', ContentType::SymbolicLink),
            (b'3', ContentType::Unknown),
            (b'4', ContentType::Unknown),
            (b'5', ContentType::Directory),
            (b'6', ContentType::Unknown),
            (b'x', ContentType::Unknown),
            (b'g', ContentType::Unknown),
            (b'K', ContentType::Unknown),
        ];
        for (flag, content_type) in cases {
            let block = header_block("name", 1, flag);
            let entry = TarEntry::decode(Block::from_bytes(&block).unwrap(), 0, &handle).unwrap();
            assert_eq!(entry.content_type(), content_type, "flag {flag:#x}");
        }
    }

    #[test]
    fn test_rejections() {
        let (_dir, handle) = handle();
        let decode = |block: &[u8; BLOCK_SIZE]| {
            TarEntry::decode(Block::from_bytes(block).unwrap(), 0, &handle)
        };

        // zero padding
        assert!(decode(&[0u8; BLOCK_SIZE]).is_none());
        // empty regular file
        assert!(decode(&regular("empty.txt", 0)).is_none());
        // pre-POSIX empty regular file
        assert!(decode(&header_block("empty.txt", 0, b'\0')).is_none());
        // empty name
        assert!(decode(&header_block("", 10, b'0')).is_none());
        // non-octal size
        let mut block = regular("bad", 10);
        block[124..136].copy_from_slice(b"notanumber\0\0");
        assert!(decode(&block).is_none());
        // non-ASCII type flag
        let mut block = regular("bad", 10);
        block[156] = 0xff;
        assert!(decode(&block).is_none());
        // name that is not UTF-8
        let mut block = regular("bad", 10);
        block[0] = 0xff;
        assert!(decode(&block).is_none());
    }

    #[test]
    fn test_defaults_for_undecodable_fields() {
        let (_dir, handle) = handle();
        let mut block = regular("file", 5);
        block[100..108].copy_from_slice(b"zzzzzzz\0");
        block[108..116].fill(0);
        block[136..148].copy_from_slice(b"garbage!!!!\0");
        block[157..161].copy_from_slice(b"\xff\xfe\xfd\xfc");
        let entry = TarEntry::decode(Block::from_bytes(&block).unwrap(), 0, &handle).unwrap();

        assert_eq!(entry.mode, Permissions::from_bits(0));
        assert_eq!(entry.uid, 0);
        assert_eq!(entry.mtime, 0);
        assert_eq!(entry.modified(), UNIX_EPOCH);
        assert_eq!(entry.link_name, "");
    }

    #[test]
    fn test_zero_size_directory_and_hidden() {
        let (_dir, handle) = handle();
        let block = header_block("kr/.hidden.txt", 3, b'0');
        let entry = TarEntry::decode(Block::from_bytes(&block).unwrap(), 0, &handle).unwrap();
        assert!(entry.is_hidden());

        let block = header_block("kr/", 0, b'5');
        let entry = TarEntry::decode(Block::from_bytes(&block).unwrap(), 0, &handle).unwrap();
        assert_eq!(entry.content_type(), ContentType::Directory);
        assert!(!entry.is_hidden());
        assert_eq!(entry.data().unwrap(), b"");
    }
}
