//! Error types for archive operations.
//!
//! Every public operation reports exactly one of four kinds. The underlying
//! cause (an I/O error, a ZIP engine error, a malformed block) is logged at
//! debug level where it is mapped and never crosses the public boundary.
//!
//! | Kind                        | Raised by                                  |
//! |-----------------------------|--------------------------------------------|
//! | [`UnsupportedFileFormat`]   | format detection found no match            |
//! | [`FailedToOpenArchive`]     | probing or opening the container           |
//! | [`FailedToReadArchive`]     | listing entries                            |
//! | [`FailedToExtractArchive`]  | reading or writing one entry's data        |
//!
//! [`UnsupportedFileFormat`]: ArchiveError::UnsupportedFileFormat
//! [`FailedToOpenArchive`]: ArchiveError::FailedToOpenArchive
//! [`FailedToReadArchive`]: ArchiveError::FailedToReadArchive
//! [`FailedToExtractArchive`]: ArchiveError::FailedToExtractArchive

use std::fmt::Display;

use log::debug;

/// Result type alias for operations that may return an [`ArchiveError`].
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Error kinds for archive operations. None of them is retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArchiveError {
    /// No supported container format matched the file.
    #[error("unsupported file format")]
    UnsupportedFileFormat,

    /// The file could not be probed or the container could not be opened.
    #[error("failed to open archive")]
    FailedToOpenArchive,

    /// The entry listing could not be produced.
    #[error("failed to read archive")]
    FailedToReadArchive,

    /// An entry's data could not be retrieved.
    #[error("failed to extract archive")]
    FailedToExtractArchive,
}

impl ArchiveError {
    /// Returns a closure for `map_err` that logs `cause` with `context` and
    /// yields this kind.
    pub(crate) fn logged<E: Display>(self, context: impl Display) -> impl FnOnce(E) -> Self {
        move |cause| {
            debug!("{context}: {cause} ({self})");
            self
        }
    }
}
