use crate::archive::SnapshotArchive;
use crate::errors::{Error, Result};
use crate::rules::RuleSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Options for transforming a single file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// If `true`, changes are detected but neither archived nor written.
    pub dry_run: bool,
}

/// What happened to one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutcome {
    /// The rules left the content as it was.
    Unchanged,
    /// The content changed (and was written unless this was a dry run).
    Rewritten { relative: PathBuf },
}

impl TransformOutcome {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, TransformOutcome::Rewritten { .. })
    }
}

/// Applies a rule set to files under one tree root.
pub struct FileTransformer<'a> {
    root: &'a Path,
    rules: &'a RuleSet,
    options: TransformOptions,
}

impl<'a> FileTransformer<'a> {
    pub fn new(root: &'a Path, rules: &'a RuleSet, options: TransformOptions) -> Self {
        Self {
            root,
            rules,
            options,
        }
    }

    /// Rewrites one file in place.
    ///
    /// The original bytes go into `archive` before the file is overwritten.
    /// Content that is not valid UTF-8 is an error; files are never skipped.
    pub fn transform(&self, path: &Path, archive: &SnapshotArchive) -> Result<TransformOutcome> {
        let relative = path.strip_prefix(self.root).unwrap_or(path).to_path_buf();

        let original = fs::read(path).map_err(|e| Error::file_io(path, e))?;
        let text = std::str::from_utf8(&original).map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let replaced = self.rules.apply(text);
        if replaced == text {
            return Ok(TransformOutcome::Unchanged);
        }

        if self.options.dry_run {
            tracing::info!("Would replace strings in {}", relative.display());
            return Ok(TransformOutcome::Rewritten { relative });
        }

        tracing::info!("Replaced strings in {}", relative.display());

        let metadata = fs::metadata(path).map_err(|e| Error::file_io(path, e))?;
        archive.add_entry(&relative, &original, &metadata)?;
        write_atomically(path, replaced.as_bytes(), &metadata)?;

        Ok(TransformOutcome::Rewritten { relative })
    }
}

/// Replaces `path` with `contents` via a temp file in the same directory,
/// keeping the original permissions.
fn write_atomically(path: &Path, contents: &[u8], metadata: &fs::Metadata) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Err(format!("Could not get parent directory for {}", path.display()).into());
    };

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| Error::file_io(parent, e))?;
    temp_file
        .write_all(contents)
        .map_err(|e| Error::file_io(temp_file.path(), e))?;
    fs::set_permissions(temp_file.path(), metadata.permissions())
        .map_err(|e| Error::file_io(temp_file.path(), e))?;
    temp_file.persist(path)?;
    Ok(())
}
