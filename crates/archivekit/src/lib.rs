//! Read-only access to TAR and ZIP archives through one entry model.
//!
//! [`ArchiveReader::open`] detects the container format, after which every
//! archive looks the same: a flat list of [`Entry`] values in archive order,
//! each able to read back its own data. TAR archives are walked directly
//! block by block; ZIP archives go through the `zip` crate, which also
//! handles decompression and ZipCrypto/AES decryption.
//!
//! ```no_run
//! use archivekit::{ArchiveReader, ContentType};
//!
//! let reader = ArchiveReader::open("backup.tar")?;
//! for entry in reader.contents()? {
//!     if entry.content_type() == ContentType::File {
//!         let head = entry.data_up_to(16)?;
//!         println!("{}: {head:02x?}", entry.name());
//!     }
//! }
//! # Ok::<(), archivekit::ArchiveError>(())
//! ```
//!
//! Encrypted ZIP archives need a password when listing:
//!
//! ```no_run
//! use archivekit::ArchiveReader;
//!
//! let reader = ArchiveReader::open("secret.zip")?;
//! if reader.check_encrypted()? && reader.validate_password("1234")? {
//!     for entry in reader.contents_with_password("1234")? {
//!         entry.write_to(std::path::Path::new("out").join(entry.name()))?;
//!     }
//! }
//! # Ok::<(), archivekit::ArchiveError>(())
//! ```

pub mod entry;
pub mod error;
pub mod format;
pub mod reader;
pub mod tar;
pub mod util;
pub mod zip;

pub use entry::{ContentType, Entry};
pub use error::{ArchiveError, Result};
pub use format::Format;
pub use reader::ArchiveReader;
