use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    // Root preconditions
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    // Traversal
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("symlink loop: {}", .0.display())]
    SymlinkLoop(PathBuf),

    #[error("walk error: {0}")]
    Walk(String),

    // Content
    #[error("IO error: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid UTF-8 content in {}", .0.display())]
    Decode(PathBuf),
}

impl DigestError {
    /// The path this error occurred at, if applicable.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::PermissionDenied(p)
            | Self::SymlinkLoop(p)
            | Self::Decode(p)
            | Self::Io { path: p, .. } => Some(p),
            Self::Walk(_) => None,
        }
    }

    /// Whether the run can continue after this error.
    ///
    /// Everything below the root is recoverable: the entry is skipped or
    /// classified as excluded and the walk keeps going. A missing or
    /// non-directory root is fatal.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::NotFound(_) | Self::NotADirectory(_))
    }

    /// Map an I/O error on a path below the root to the closest variant.
    pub(crate) fn from_io(path: PathBuf, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::InvalidData => Self::Decode(path),
            _ => Self::Io { path, source: err },
        }
    }
}
