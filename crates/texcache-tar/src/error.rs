//! Error types for the tar writer.

use thiserror::Error;

/// Errors that can occur while writing a tar stream.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying sink rejected a write.
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    /// Entry name does not fit the 100-byte name field.
    #[error("entry name is {len} bytes, at most {max} fit: {name}")]
    NameTooLong { name: String, len: usize, max: usize },

    /// Entry name contains a NUL byte.
    #[error("entry name contains a NUL byte: {0:?}")]
    InvalidName(String),

    /// Entry size does not fit the 11 octal digits of the size field.
    #[error("entry size {0} exceeds the tar size field")]
    SizeTooLarge(u64),
}

/// Result type for tar operations.
pub type Result<T> = std::result::Result<T, Error>;
