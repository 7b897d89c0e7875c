//! zlib payload decompression.

use std::io::Read;

use flate2::read::ZlibDecoder;
use texcache_common::reserve_buffer;

use crate::{Error, Result};

/// How far past the expected size output is decoded to report a mismatch.
const OVERRUN_LIMIT: u64 = 4096;

/// Inflate a zlib stream that must decode to exactly `expected` bytes.
///
/// Decoding stops 4096 bytes past `expected`, so the `actual` length in
/// [`Error::SizeMismatch`] never exceeds `expected + 4096`.
pub fn inflate_sized(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut output = reserve_buffer(expected)?;

    ZlibDecoder::new(data)
        .take((expected as u64).saturating_add(OVERRUN_LIMIT))
        .read_to_end(&mut output)
        .map_err(|e| Error::DecompressionFailed(e.to_string()))?;

    if output.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: output.len(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    use super::*;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_inflate_roundtrip() {
        let original: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        let compressed = compress(&original);

        let inflated = inflate_sized(&compressed, original.len()).unwrap();
        assert_eq!(inflated, original);
    }

    #[test]
    fn test_inflate_short_output() {
        let compressed = compress(&[7u8; 10]);
        assert!(matches!(
            inflate_sized(&compressed, 16),
            Err(Error::SizeMismatch {
                expected: 16,
                actual: 10
            })
        ));
    }

    #[test]
    fn test_inflate_long_output() {
        let compressed = compress(&[7u8; 20]);
        assert!(matches!(
            inflate_sized(&compressed, 16),
            Err(Error::SizeMismatch {
                expected: 16,
                actual: 20
            })
        ));
    }

    #[test]
    fn test_inflate_overrun_is_capped() {
        let compressed = compress(&vec![0u8; 8 << 20]);
        assert!(matches!(
            inflate_sized(&compressed, 16),
            Err(Error::SizeMismatch { expected: 16, actual }) if actual == 16 + OVERRUN_LIMIT as usize
        ));
    }

    #[test]
    fn test_inflate_garbage() {
        let garbage = [0xFFu8; 32];
        assert!(matches!(
            inflate_sized(&garbage, 16),
            Err(Error::DecompressionFailed(_))
        ));
    }
}
