//! The snapshot archive: a `.tar.gz` holding the original bytes of every file
//! a substitution run changed, keyed by path relative to the tree root.

use crate::errors::{Error, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{File, Metadata, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type TarGzBuilder = tar::Builder<GzEncoder<File>>;

/// Append-only archive of original file contents.
///
/// Workers share it by reference; each `add_entry` takes the lock for the
/// duration of one tar append so entries never interleave in the stream.
/// A disabled archive accepts entries and discards them.
pub struct SnapshotArchive {
    inner: Option<Writer>,
    entries: AtomicUsize,
}

struct Writer {
    path: PathBuf,
    builder: Mutex<TarGzBuilder>,
}

impl SnapshotArchive {
    /// Creates a new archive at `path`.
    ///
    /// Fails with `BackupExists` if anything is already there; an existing
    /// backup is never overwritten.
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => Error::BackupExists(path.to_path_buf()),
                _ => Error::file_io(path, e),
            })?;

        let builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

        tracing::debug!("Opened snapshot archive {}", path.display());
        Ok(Self {
            inner: Some(Writer {
                path: path.to_path_buf(),
                builder: Mutex::new(builder),
            }),
            entries: AtomicUsize::new(0),
        })
    }

    /// An archive that records nothing.
    pub fn disabled() -> Self {
        Self {
            inner: None,
            entries: AtomicUsize::new(0),
        }
    }

    /// Opens an archive at `path` if one was requested, otherwise a disabled one.
    pub fn for_backup_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::create(path),
            None => Ok(Self::disabled()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.as_ref().map(|w| w.path.as_path())
    }

    /// Number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends one file's original contents under `relpath`.
    ///
    /// `metadata` is the original file's metadata; mode and mtime are kept so
    /// restoring brings permissions back along with the bytes.
    pub fn add_entry(&self, relpath: &Path, contents: &[u8], metadata: &Metadata) -> Result<()> {
        let Some(writer) = &self.inner else {
            return Ok(());
        };

        let mut header = tar::Header::new_gnu();
        header.set_metadata_in_mode(metadata, tar::HeaderMode::Complete);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(contents.len() as u64);

        let mut builder = writer.builder.lock().map_err(|_| Error::ArchivePoisoned)?;
        builder
            .append_data(&mut header, relpath, contents)
            .map_err(|e| Error::file_io(&writer.path, e))?;
        drop(builder);

        self.entries.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Archived original of {}", relpath.display());
        Ok(())
    }

    /// Writes the tar trailer, finishes the gzip stream and flushes the file.
    ///
    /// Returns the number of entries written.
    pub fn finish(self) -> Result<usize> {
        let count = self.len();
        let Some(writer) = self.inner else {
            return Ok(count);
        };

        let builder = writer.builder.into_inner().map_err(|_| Error::ArchivePoisoned)?;
        let encoder = builder
            .into_inner()
            .map_err(|e| Error::file_io(&writer.path, e))?;
        let mut file = encoder
            .finish()
            .map_err(|e| Error::file_io(&writer.path, e))?;
        file.flush().map_err(|e| Error::file_io(&writer.path, e))?;
        file.sync_all().map_err(|e| Error::file_io(&writer.path, e))?;

        tracing::info!(
            "Wrote {} original files to {}",
            count,
            writer.path.display()
        );
        Ok(count)
    }
}
