//! Error types for repo-tree

use repo_fs::NormalizedPath;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Result type for repo-tree operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in repo-tree operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Absent from both the working and the managed tree
    #[error("No such file or directory: {path}")]
    NotFound { path: PathBuf },

    /// A walk was asked to start from a plain file
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The output index claims a path for more than one output
    #[error("{path} is covered by {count} outputs; the output index is corrupt")]
    InvariantViolation { path: PathBuf, count: usize },

    /// Tracked content whose object is not in the cache
    #[error("Object {checksum} is missing from the cache")]
    ObjectMissing { checksum: String },

    #[error("Invalid manifest at {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error from repo-fs
    #[error(transparent)]
    Fs(#[from] repo_fs::Error),

    /// Version-control error from repo-git
    #[error(transparent)]
    Scm(#[from] repo_git::Error),
}

impl Error {
    pub fn not_found(path: &NormalizedPath) -> Self {
        Self::NotFound {
            path: path.to_native(),
        }
    }

    /// Wrap an I/O error, folding "no such entry" conditions into [`Error::NotFound`].
    pub fn io(path: &NormalizedPath, source: std::io::Error) -> Self {
        match source.kind() {
            ErrorKind::NotFound | ErrorKind::NotADirectory => Self::not_found(path),
            _ => Self::Io {
                path: path.to_native(),
                source,
            },
        }
    }

    /// Whether the path simply does not exist (as opposed to a real failure).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Fs(e) => e.is_not_found(),
            _ => false,
        }
    }
}
