//! Error types for texture cache extraction.

use thiserror::Error;

/// Errors that can occur while extracting a texture cache.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream ended inside a record.
    #[error("truncated {field} at offset {offset:#x}: needed {needed} bytes but only {available} available")]
    Truncated {
        field: &'static str,
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// A payload buffer could not be allocated.
    #[error("could not allocate {size} bytes")]
    AllocationFailed { size: usize },

    /// I/O error on the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload length does not match the texture dimensions.
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// The zlib stream of a compressed payload is corrupt.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// The format code has no conversion.
    #[error("unsupported texture format {format:#06x}: {reason}")]
    UnsupportedFormat { format: u16, reason: &'static str },

    /// Width or height is zero.
    #[error("empty texture: {width}x{height}")]
    EmptyTexture { width: u32, height: u32 },

    /// Container encoding failed.
    #[error("encode error: {0}")]
    Encode(#[from] texcache_image::Error),

    /// The archive rejected an entry or the sink failed.
    #[error("archive error: {0}")]
    WriteFailed(#[from] texcache_tar::Error),

    /// Extraction options are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An error tied to a specific record.
    #[error("record at offset {offset:#x} (checksum {checksum:016X}, format {format:#06x}, {width}x{height}): {source}")]
    Record {
        offset: u64,
        checksum: u64,
        format: u16,
        width: u32,
        height: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether the error comes from the caller's options rather than the stream.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::InvalidConfig(_) => true,
            Self::Record { source, .. } => source.is_configuration(),
            _ => false,
        }
    }

    /// Whether the run may continue with the next record.
    ///
    /// Content errors are recoverable. Read, allocation and sink failures
    /// leave the stream or archive in an unknown state and are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::SizeMismatch { .. }
            | Self::DecompressionFailed(_)
            | Self::UnsupportedFormat { .. }
            | Self::EmptyTexture { .. }
            | Self::Encode(_) => true,
            Self::WriteFailed(err) => !matches!(err, texcache_tar::Error::Write(_)),
            Self::Record { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// The innermost error, without record context.
    pub fn root(&self) -> &Error {
        match self {
            Self::Record { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<texcache_common::Error> for Error {
    fn from(err: texcache_common::Error) -> Self {
        match err {
            texcache_common::Error::UnexpectedEof {
                needed,
                available,
                offset,
            } => Self::Truncated {
                field: "data",
                offset,
                needed,
                available,
            },
            texcache_common::Error::Allocation { size } => Self::AllocationFailed { size },
            texcache_common::Error::Io(err) => Self::Io(err),
        }
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn in_record(source: Error) -> Error {
        Error::Record {
            offset: 4,
            checksum: 0xDEAD_BEEF,
            format: 0x05,
            width: 4,
            height: 4,
            source: Box::new(source),
        }
    }

    #[test]
    fn test_classification() {
        let unsupported = Error::UnsupportedFormat {
            format: 0x05,
            reason: "palette",
        };
        assert!(unsupported.is_recoverable());
        assert!(!unsupported.is_configuration());

        let truncated = Error::Truncated {
            field: "width",
            offset: 12,
            needed: 4,
            available: 1,
        };
        assert!(!truncated.is_recoverable());

        assert!(Error::InvalidConfig("prefix".into()).is_configuration());
        assert!(!Error::WriteFailed(texcache_tar::Error::Write(std::io::ErrorKind::BrokenPipe.into()))
            .is_recoverable());
        assert!(Error::WriteFailed(texcache_tar::Error::SizeTooLarge(u64::MAX)).is_recoverable());
    }

    #[test]
    fn test_record_context_delegates() {
        let err = in_record(Error::EmptyTexture { width: 0, height: 4 });
        assert!(err.is_recoverable());
        assert!(matches!(err.root(), Error::EmptyTexture { .. }));

        let message = err.to_string();
        assert!(message.contains("00000000DEADBEEF"), "{message}");
        assert!(message.contains("0x0005"), "{message}");
        assert!(message.contains("4x4"), "{message}");
    }

    #[test]
    fn test_common_errors_convert() {
        let err: Error = texcache_common::Error::UnexpectedEof {
            needed: 8,
            available: 3,
            offset: 51,
        }
        .into();
        assert!(matches!(
            err,
            Error::Truncated {
                offset: 51,
                needed: 8,
                available: 3,
                ..
            }
        ));

        let err: Error = texcache_common::Error::Allocation { size: 7 }.into();
        assert!(matches!(err, Error::AllocationFailed { size: 7 }));
    }
}
