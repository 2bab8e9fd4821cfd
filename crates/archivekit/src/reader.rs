//! The entry point: open any supported archive and list what it holds.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, info};

use crate::{
    entry::Entry,
    error::Result,
    format::Format,
    tar::TarHandle,
    zip::ZipHandle,
};

#[derive(Debug)]
enum Container {
    Tar(Arc<TarHandle>),
    Zip(Arc<ZipHandle>),
}

/// An open archive of any supported format.
///
/// The file stays open until the reader and every entry listed from it have
/// been dropped. All methods take `&self`; a reader may be shared between
/// threads and queried concurrently.
///
/// ```no_run
/// use archivekit::ArchiveReader;
///
/// let reader = ArchiveReader::open("bundle.zip")?;
/// for entry in reader.contents()? {
///     if !entry.is_hidden() {
///         println!("{} ({} bytes)", entry.name(), entry.size());
///     }
/// }
/// # Ok::<(), archivekit::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct ArchiveReader {
    path: PathBuf,
    container: Container,
    password: Option<Arc<str>>,
}

impl ArchiveReader {
    /// Detect the format of the file at `path` and open it.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::UnsupportedFileFormat`](crate::ArchiveError::UnsupportedFileFormat)
    /// if the file is neither TAR nor ZIP, or
    /// [`ArchiveError::FailedToOpenArchive`](crate::ArchiveError::FailedToOpenArchive)
    /// if it cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let container = match Format::detect(path)? {
            Format::Tar => Container::Tar(Arc::new(TarHandle::open(path)?)),
            Format::Zip => Container::Zip(Arc::new(ZipHandle::open(path)?)),
        };
        let reader = ArchiveReader {
            path: path.to_path_buf(),
            container,
            password: None,
        };
        info!("opened {} archive {}", reader.format(), path.display());
        Ok(reader)
    }

    /// Like [`ArchiveReader::open`], with a password used by
    /// [`ArchiveReader::contents`] for encrypted ZIP entries.
    ///
    /// # Errors
    ///
    /// As for [`ArchiveReader::open`].
    pub fn open_with_password(path: impl AsRef<Path>, password: &str) -> Result<Self> {
        Ok(ArchiveReader {
            password: Some(Arc::from(password)),
            ..ArchiveReader::open(path)?
        })
    }

    /// The detected container format.
    #[must_use]
    pub fn format(&self) -> Format {
        match self.container {
            Container::Tar(_) => Format::Tar,
            Container::Zip(_) => Format::Zip,
        }
    }

    /// The path the archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List every entry in archive order, including hidden entries and
    /// directories.
    ///
    /// ZIP entries carry the reader's password, if one was given at open.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToReadArchive`](crate::ArchiveError::FailedToReadArchive)
    /// if the archive cannot be walked.
    pub fn contents(&self) -> Result<Vec<Entry>> {
        self.list(self.password.as_ref())
    }

    /// List every entry, recording `password` on ZIP entries for extraction.
    ///
    /// TAR archives have no encryption and ignore the password.
    ///
    /// # Errors
    ///
    /// As for [`ArchiveReader::contents`].
    pub fn contents_with_password(&self, password: &str) -> Result<Vec<Entry>> {
        self.list(Some(&Arc::from(password)))
    }

    fn list(&self, password: Option<&Arc<str>>) -> Result<Vec<Entry>> {
        let entries: Vec<Entry> = match &self.container {
            Container::Tar(handle) => handle.contents()?.into_iter().map(Entry::from).collect(),
            Container::Zip(handle) => handle
                .contents(password)?
                .into_iter()
                .map(Entry::from)
                .collect(),
        };
        debug!("{}: {} entries", self.path.display(), entries.len());
        Ok(entries)
    }

    /// Find the first entry named exactly `name`.
    ///
    /// # Errors
    ///
    /// As for [`ArchiveReader::contents`].
    pub fn entry(&self, name: &str) -> Result<Option<Entry>> {
        Ok(self.contents()?.into_iter().find(|entry| entry.name() == name))
    }

    /// Returns true if the archive's first entry with content is encrypted.
    ///
    /// Always false for TAR.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToReadArchive`](crate::ArchiveError::FailedToReadArchive)
    /// if the entries cannot be walked.
    pub fn check_encrypted(&self) -> Result<bool> {
        match &self.container {
            Container::Tar(_) => Ok(false),
            Container::Zip(handle) => handle.check_encrypted(),
        }
    }

    /// Returns true if `candidate` decrypts the archive's first entry with
    /// content.
    ///
    /// Always false for TAR. A wrong password is `Ok(false)`, never an error.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::FailedToReadArchive`](crate::ArchiveError::FailedToReadArchive)
    /// if the entries cannot be walked.
    pub fn validate_password(&self, candidate: &str) -> Result<bool> {
        match &self.container {
            Container::Tar(_) => Ok(false),
            Container::Zip(handle) => handle.validate_password(candidate),
        }
    }
}
