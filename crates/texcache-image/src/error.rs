//! Error types for container encoding.

use thiserror::Error;

use crate::FourCC;

/// Errors that can occur when wrapping pixel data in an image container.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pixel buffer length does not match the image dimensions.
    #[error("pixel data size mismatch: expected {expected} bytes, got {actual}")]
    PixelSizeMismatch { expected: usize, actual: usize },

    /// The FourCC has no DDS mapping in this encoder.
    #[error("unsupported DDS FourCC {0}")]
    UnsupportedFourCC(FourCC),

    /// The image does not fit the 32-bit size fields of the container.
    #[error("image too large for container: {width}x{height}")]
    TooLarge { width: u32, height: u32 },
}

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;
