use std::path::Path;

use crate::error::DigestError;

/// Reads the content of an included file.
///
/// Classification never touches file content; reading happens afterwards
/// for files that ended up `FINAL_INCLUDED`. Implement this to decode
/// differently, read from an archive or a cache, or fake failures in
/// tests.
///
/// # Thread Safety
///
/// `Send + Sync` are required: the parallel driver shares one reader
/// across all walker threads.
///
/// # Error Handling
///
/// Return `Err` instead of panicking. A failed read turns the entry into
/// `FINAL_EXCLUDED` with the error text as its reason, or keeps it
/// included without content when read errors are tolerated.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use dirsift::{ContentReader, DigestError};
///
/// struct Lossy;
///
/// impl ContentReader for Lossy {
///     fn read(&self, path: &Path) -> Result<String, DigestError> {
///         let bytes = std::fs::read(path).map_err(|source| DigestError::Io {
///             path: path.to_path_buf(),
///             source,
///         })?;
///         Ok(String::from_utf8_lossy(&bytes).into_owned())
///     }
/// }
/// ```
pub trait ContentReader: Send + Sync {
    /// Read the whole file at `path`, an absolute or root-joined path.
    fn read(&self, path: &Path) -> Result<String, DigestError>;
}

/// Reads files as strict UTF-8. Used when no reader is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Reader;

impl ContentReader for Utf8Reader {
    fn read(&self, path: &Path) -> Result<String, DigestError> {
        let bytes = std::fs::read(path).map_err(|e| DigestError::from_io(path.to_path_buf(), e))?;
        String::from_utf8(bytes).map_err(|_| DigestError::Decode(path.to_path_buf()))
    }
}
