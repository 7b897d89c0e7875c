//! Error types for texcache-common.

use thiserror::Error;

/// Common error type for texcache stream operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream ended while reading a fixed-size item.
    #[error("unexpected end of stream at offset {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        needed: usize,
        available: usize,
        offset: u64,
    },

    /// A buffer of the requested size could not be allocated.
    #[error("could not allocate {size} bytes")]
    Allocation { size: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
