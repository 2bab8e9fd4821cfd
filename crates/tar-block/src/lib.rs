//! Zerocopy layout of a 512-byte tar header block and its field decoders.
//!
//! Every tar entry starts with a fixed header block. The fields are stored as
//! NUL- or space-padded ASCII: strings are not length-prefixed and numeric
//! fields are octal digits, not binary integers.
//!
//! | Offset | Size | Field     | Encoding                                 |
//! |--------|------|-----------|------------------------------------------|
//! | 0      | 100  | name      | UTF-8, padded                            |
//! | 100    | 8    | mode      | octal ASCII                              |
//! | 108    | 8    | uid       | octal ASCII                              |
//! | 116    | 8    | gid       | octal ASCII                              |
//! | 124    | 12   | size      | octal ASCII                              |
//! | 136    | 12   | mtime     | octal ASCII, seconds since the epoch     |
//! | 148    | 8    | checksum  | octal ASCII (never verified here)        |
//! | 156    | 1    | typeflag  | single ASCII byte, see [`TypeFlag`]      |
//! | 157    | 100  | linkname  | UTF-8, padded                            |
//! | 257    | 6    | magic     | "ustar\0" or "ustar "                    |
//! | 263    | 2    | version   | "00" or " \0"                            |
//! | 265    | 32   | uname     | UTF-8, padded                            |
//! | 297    | 32   | gname     | UTF-8, padded                            |
//! | 329    | 8    | devmajor  | octal ASCII                              |
//! | 337    | 8    | devminor  | octal ASCII                              |
//!
//! Decoding is lenient: a field that cannot be decoded is reported as `None`
//! and the caller decides whether that is fatal or whether a default applies.
//!
//! # Example
//!
//! ```
//! use tar_block::{Block, TypeFlag, BLOCK_SIZE};
//!
//! let mut bytes = [0u8; BLOCK_SIZE];
//! bytes[..9].copy_from_slice(b"hello.txt");
//! bytes[124..135].copy_from_slice(b"00000000015");
//! bytes[156] = b'0';
//!
//! let block = Block::from_bytes(&bytes).unwrap();
//! assert_eq!(block.name(), Some("hello.txt"));
//! assert_eq!(block.size(), Some(13));
//! assert_eq!(block.type_flag(), Some(TypeFlag::Regular));
//! ```

use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of a tar header block, and the granularity of all tar data.
pub const BLOCK_SIZE: usize = 512;

/// Errors that can occur when interpreting a buffer as a header block.
#[derive(Debug, Error)]
pub enum BlockError {
    /// The buffer is not exactly one block long (typically EOF mid-block).
    #[error("invalid block length: expected {BLOCK_SIZE} bytes, got {0}")]
    InvalidLength(usize),
}

/// Result type for block operations.
pub type Result<T> = std::result::Result<T, BlockError>;

/// One 512-byte tar header block with named fields.
///
/// The layout covers the POSIX.1-1988 fields plus the UStar additions. GNU
/// headers share every field decoded here; the trailing area differs but is
/// never interpreted.
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct Block {
    /// Entry path.
    pub name: [u8; 100],
    /// Permission bits.
    pub mode: [u8; 8],
    /// Owner user ID.
    pub uid: [u8; 8],
    /// Owner group ID.
    pub gid: [u8; 8],
    /// Content size in bytes.
    pub size: [u8; 12],
    /// Modification time.
    pub mtime: [u8; 12],
    /// Header checksum.
    pub checksum: [u8; 8],
    /// Entry type flag.
    pub typeflag: u8,
    /// Link target for hard and symbolic links.
    pub linkname: [u8; 100],
    /// Format magic.
    pub magic: [u8; 6],
    /// Format version.
    pub version: [u8; 2],
    /// Owner user name.
    pub uname: [u8; 32],
    /// Owner group name.
    pub gname: [u8; 32],
    /// Device major number.
    pub devmajor: [u8; 8],
    /// Device minor number.
    pub devminor: [u8; 8],
    /// UStar path prefix (or GNU extension area); not decoded.
    pub prefix: [u8; 155],
    /// Padding to fill the block.
    pub pad: [u8; 12],
}

impl Block {
    /// Interpret a buffer as a header block.
    ///
    /// # Errors
    ///
    /// Returns [`BlockError::InvalidLength`] unless the buffer is exactly
    /// [`BLOCK_SIZE`] bytes long. Short reads must never be decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Block> {
        Block::ref_from_bytes(bytes).map_err(|_| BlockError::InvalidLength(bytes.len()))
    }

    /// The raw bytes of this block.
    #[must_use]
    pub fn raw_bytes(&self) -> &[u8; BLOCK_SIZE] {
        zerocopy::transmute_ref!(self)
    }

    /// Returns true if every byte of the block is zero (end-of-archive padding).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.raw_bytes().iter().all(|&b| b == 0)
    }

    /// The entry path, trimmed.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        read_str(&self.name)
    }

    /// The permission bits.
    #[must_use]
    pub fn mode(&self) -> Option<Permissions> {
        read_octal(&self.mode)
            .and_then(|v| u32::try_from(v).ok())
            .map(Permissions::from_bits)
    }

    /// The owner user ID.
    #[must_use]
    pub fn uid(&self) -> Option<u64> {
        read_octal(&self.uid)
    }

    /// The owner group ID.
    #[must_use]
    pub fn gid(&self) -> Option<u64> {
        read_octal(&self.gid)
    }

    /// The content size in bytes.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        read_octal(&self.size)
    }

    /// The modification time in seconds since the Unix epoch.
    #[must_use]
    pub fn mtime(&self) -> Option<u64> {
        read_octal(&self.mtime)
    }

    /// The modification time as a [`SystemTime`].
    #[must_use]
    pub fn modified(&self) -> Option<SystemTime> {
        self.mtime()
            .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs)))
    }

    /// The stored checksum. It is decoded for reporting only.
    #[must_use]
    pub fn checksum(&self) -> Option<u64> {
        read_octal(&self.checksum)
    }

    /// The entry type.
    #[must_use]
    pub fn type_flag(&self) -> Option<TypeFlag> {
        TypeFlag::from_byte(self.typeflag)
    }

    /// The link target name, trimmed.
    #[must_use]
    pub fn link_name(&self) -> Option<&str> {
        read_str(&self.linkname)
    }

    /// The format magic, trimmed ("ustar" for both UStar and GNU headers).
    #[must_use]
    pub fn magic(&self) -> Option<&str> {
        read_str(&self.magic)
    }

    /// The format version, trimmed.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        read_str(&self.version)
    }

    /// The owner user name, trimmed.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        read_str(&self.uname)
    }

    /// The owner group name, trimmed.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        read_str(&self.gname)
    }

    /// The device major number (character and block devices).
    #[must_use]
    pub fn device_major(&self) -> Option<u32> {
        read_octal(&self.devmajor).and_then(|v| u32::try_from(v).ok())
    }

    /// The device minor number (character and block devices).
    #[must_use]
    pub fn device_minor(&self) -> Option<u32> {
        read_octal(&self.devminor).and_then(|v| u32::try_from(v).ok())
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("name", &self.name())
            .field("type_flag", &self.type_flag())
            .field("size", &self.size())
            .field("mode", &self.mode())
            .field("magic", &self.magic())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Type flag
// ============================================================================

/// Tar entry type, stored as a single ASCII byte at offset 156.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeFlag {
    /// Regular file ('0', or NUL in pre-POSIX archives).
    Regular,
    /// Hard link ('1').
    HardLink,
    /// Symbolic link ('2').
    Symlink,
    /// Character device ('3').
    CharacterSpecial,
    /// Block device ('4').
    BlockSpecial,
    /// Directory ('5').
    Directory,
    /// FIFO ('6').
    Fifo,
    /// PAX extended header for the next entry ('x').
    PaxHeader,
    /// PAX global extended header ('g').
    GlobalExtendedHeader,
    /// Any other ASCII flag, including GNU and vendor extensions.
    Reserved(u8),
}

impl TypeFlag {
    /// Decode a type flag byte.
    ///
    /// Returns `None` for non-ASCII bytes, which cannot form a valid flag.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        if !byte.is_ascii() {
            return None;
        }
        Some(match byte {
            b'0' | b'\0' => TypeFlag::Regular,
            b'1' => TypeFlag::HardLink,
            b'2' => TypeFlag::Symlink,
            b'3' => TypeFlag::CharacterSpecial,
            b'4' => TypeFlag::BlockSpecial,
            b'5' => TypeFlag::Directory,
            b'6' => TypeFlag::Fifo,
            b'x' => TypeFlag::PaxHeader,
            b'g' => TypeFlag::GlobalExtendedHeader,
            other => TypeFlag::Reserved(other),
        })
    }

    /// Returns true for PAX per-entry and global headers, which describe
    /// other entries rather than being entries themselves.
    #[must_use]
    pub fn is_extended_header(self) -> bool {
        matches!(self, TypeFlag::PaxHeader | TypeFlag::GlobalExtendedHeader)
    }
}

// ============================================================================
// Permissions
// ============================================================================

/// Unix permission bits from the mode field.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Permissions(u32);

impl Permissions {
    pub const OWNER_READ: Permissions = Permissions(0o400);
    pub const OWNER_WRITE: Permissions = Permissions(0o200);
    pub const OWNER_EXECUTE: Permissions = Permissions(0o100);
    pub const GROUP_READ: Permissions = Permissions(0o40);
    pub const GROUP_WRITE: Permissions = Permissions(0o20);
    pub const GROUP_EXECUTE: Permissions = Permissions(0o10);
    pub const OTHER_READ: Permissions = Permissions(0o4);
    pub const OTHER_WRITE: Permissions = Permissions(0o2);
    pub const OTHER_EXECUTE: Permissions = Permissions(0o1);

    /// Wrap raw mode bits. Bits above the permission range are kept as-is.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Permissions(bits)
    }

    /// The raw mode bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permissions({:04o})", self.0)
    }
}

/// Formats as `ls`-style `rwxr-x---`.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const BITS: [(Permissions, char); 9] = [
            (Permissions::OWNER_READ, 'r'),
            (Permissions::OWNER_WRITE, 'w'),
            (Permissions::OWNER_EXECUTE, 'x'),
            (Permissions::GROUP_READ, 'r'),
            (Permissions::GROUP_WRITE, 'w'),
            (Permissions::GROUP_EXECUTE, 'x'),
            (Permissions::OTHER_READ, 'r'),
            (Permissions::OTHER_WRITE, 'w'),
            (Permissions::OTHER_EXECUTE, 'x'),
        ];
        BITS.iter().try_for_each(|&(bit, c)| {
            write!(f, "{}", if self.contains(bit) { c } else { '-' })
        })
    }
}

// ============================================================================
// Field decoders
// ============================================================================

/// Decode a padded string field.
///
/// The whole field is interpreted as UTF-8, then spaces, tabs and NUL bytes
/// are trimmed from both ends. Returns `None` if the bytes are not UTF-8.
///
/// ```
/// use tar_block::read_str;
///
/// assert_eq!(read_str(b"hello\0\0\0"), Some("hello"));
/// assert_eq!(read_str(b"  spaced  "), Some("spaced"));
/// assert_eq!(read_str(b"\0\0\0"), Some(""));
/// assert_eq!(read_str(b"\xff\xfe"), None);
/// ```
#[must_use]
pub fn read_str(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes)
        .ok()
        .map(|s| s.trim_matches(|c| c == ' ' || c == '\t' || c == '\0'))
}

/// Decode an octal ASCII numeric field.
///
/// The field is trimmed like [`read_str`] and the remainder must consist
/// solely of digits `0-7`. Empty fields, other characters and values that
/// overflow `u64` all yield `None`.
///
/// ```
/// use tar_block::read_octal;
///
/// assert_eq!(read_octal(b"0000644\0"), Some(0o644));
/// assert_eq!(read_octal(b"     123 "), Some(0o123));
/// assert_eq!(read_octal(b"\0\0\0\0"), None);
/// assert_eq!(read_octal(b"0000089\0"), None);
/// ```
#[must_use]
pub fn read_octal(bytes: &[u8]) -> Option<u64> {
    let digits = read_str(bytes)?;
    if digits.is_empty() {
        return None;
    }
    digits.bytes().try_fold(0u64, |acc, b| match b {
        b'0'..=b'7' => acc.checked_mul(8)?.checked_add(u64::from(b - b'0')),
        _ => None,
    })
}

/// Encode a value as a NUL-terminated, zero-padded octal field of `width` bytes.
///
/// Returns `None` if the value needs more than `width - 1` digits.
///
/// ```
/// use tar_block::encode_octal;
///
/// assert_eq!(encode_octal(0o644, 8).as_deref(), Some(&b"0000644\0"[..]));
/// assert_eq!(encode_octal(0o10000000, 8), None);
/// ```
#[must_use]
pub fn encode_octal(value: u64, width: usize) -> Option<Vec<u8>> {
    let digits = width.checked_sub(1)?;
    let text = format!("{value:0digits$o}");
    if text.len() > digits {
        return None;
    }
    let mut field = text.into_bytes();
    field.push(0);
    Some(field)
}
