use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in `namesub`.
///
/// Every variant is fatal to the run that produced it. Nothing in the library
/// downgrades one of these to a warning; the binary reports it and exits
/// non-zero.
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error with no more specific context.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An I/O error while reading or writing a specific file.
    #[error("IO error on {path}: {source}")]
    FileIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A candidate file was not valid UTF-8.
    #[error("Failed to decode {path} as UTF-8: {source}")]
    Decode {
        path: PathBuf,
        source: std::str::Utf8Error,
    },

    /// An error that occurred during regex compilation.
    #[error("Pattern compilation failed for rule '{rule}': {source}")]
    Regex {
        rule: String,
        source: regex::Error,
    },

    /// The rule set produced an unexpected result for one of its fixed examples.
    #[error("Rule self-check failed: {input:?} became {actual:?}, expected {expected:?}")]
    SelfCheck {
        input: String,
        expected: String,
        actual: String,
    },

    /// The target tree does not carry the sentinel marker.
    #[error("Wrong source tree: {sentinel} not found in {root}")]
    WrongTree { root: PathBuf, sentinel: String },

    /// Substitution refuses to overwrite an existing backup archive.
    #[error("Backup archive {0} already exists, aborting")]
    BackupExists(PathBuf),

    /// Restoration was asked for but the archive is not there.
    #[error("Backup archive {0} does not exist")]
    MissingArchive(PathBuf),

    /// Extraction of the snapshot archive failed partway.
    #[error("Restore from {archive} failed: {source}")]
    Restore {
        archive: PathBuf,
        source: std::io::Error,
    },

    /// Another worker panicked while holding the archive lock.
    #[error("Snapshot archive lock poisoned")]
    ArchivePoisoned,

    /// An error that occurred while parsing a YAML configuration file.
    #[error("Config parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A general configuration-related error.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the `walkdir` crate.
    #[error("Walkdir error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// An error that occurred while building the Rayon thread pool.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An error related to persisting a temporary file.
    #[error("Tempfile error: {0}")]
    TempFile(#[from] tempfile::PersistError),

    /// An error related to JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, namesub::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps an I/O error with the path it happened on.
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::FileIo {
            path: path.into(),
            source,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
