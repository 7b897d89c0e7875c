//! Texture record parsing.

use std::io::Read;

use texcache_common::StreamReader;
use tracing::{info, warn};

use crate::config::CacheConfig;
use crate::format::{TextureFormat, DEFLATE_FLAG};
use crate::{Error, Result};

/// Size of the fixed record header in bytes.
pub const RECORD_HEADER_SIZE: u64 = 47;

/// One texture entry of a cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRecord {
    /// Stream offset of the record header.
    pub offset: u64,
    pub checksum: u64,
    pub width: u32,
    pub height: u32,
    /// Format code, possibly with [`DEFLATE_FLAG`] set.
    pub format: u16,
    pub small_lod_log2: u32,
    pub large_lod_log2: u32,
    pub aspect_ratio_log2: u32,
    pub tiles: u32,
    pub untiled_width: u32,
    pub untiled_height: u32,
    pub is_hires_texture: u8,
    /// Number of payload bytes stored in the stream.
    pub declared_size: u32,
    pub payload: Vec<u8>,
}

impl TextureRecord {
    /// Format code with the deflate flag stripped.
    #[inline]
    pub fn format_code(&self) -> u16 {
        self.format & !DEFLATE_FLAG
    }

    /// Whether the payload is zlib-compressed.
    #[inline]
    pub fn is_deflated(&self) -> bool {
        self.format & DEFLATE_FLAG != 0
    }

    /// The registry entry for this record's format, if the code is known.
    #[inline]
    pub fn texture_format(&self) -> Option<TextureFormat> {
        TextureFormat::from_code(self.format_code())
    }

    /// Wrap `err` with this record's identity.
    pub fn context(&self, err: Error) -> Error {
        Error::Record {
            offset: self.offset,
            checksum: self.checksum,
            format: self.format,
            width: self.width,
            height: self.height,
            source: Box::new(err),
        }
    }
}

/// Reads records one at a time from a cache stream.
#[derive(Debug)]
pub struct RecordReader<R> {
    stream: StreamReader<R>,
    verbosity: u8,
}

impl<R: Read> RecordReader<R> {
    /// Create a reader at the start of a cache stream.
    ///
    /// With `verbosity >= 2` every record header is logged.
    pub fn new(inner: R, verbosity: u8) -> Self {
        Self {
            stream: StreamReader::new(inner),
            verbosity,
        }
    }

    /// Number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.stream.position()
    }

    /// Read the configuration word that precedes the first record.
    pub fn read_config(&mut self) -> Result<CacheConfig> {
        let word = self.stream.read_u32().map_err(truncated("config"))?;
        Ok(CacheConfig(word))
    }

    /// Read the next record.
    ///
    /// Returns `Ok(None)` when the stream ends before a new checksum. Any
    /// later short read is [`Error::Truncated`].
    pub fn read_record(&mut self) -> Result<Option<TextureRecord>> {
        let offset = self.stream.position();

        let mut checksum = [0u8; 8];
        let got = self.stream.read_up_to(&mut checksum)?;
        if got == 0 {
            return Ok(None);
        }
        if got < checksum.len() {
            warn!(offset, trailing = got, "ignoring trailing bytes after last record");
            return Ok(None);
        }
        let checksum = u64::from_le_bytes(checksum);

        let stream = &mut self.stream;
        let width = stream.read_u32().map_err(truncated("width"))?;
        let height = stream.read_u32().map_err(truncated("height"))?;
        let format = stream.read_u16().map_err(truncated("format"))?;
        let small_lod_log2 = stream.read_u32().map_err(truncated("smallLodLog2"))?;
        let large_lod_log2 = stream.read_u32().map_err(truncated("largeLodLog2"))?;
        let aspect_ratio_log2 = stream.read_u32().map_err(truncated("aspectRatioLog2"))?;
        let tiles = stream.read_u32().map_err(truncated("tiles"))?;
        let untiled_width = stream.read_u32().map_err(truncated("untiled_width"))?;
        let untiled_height = stream.read_u32().map_err(truncated("untiled_height"))?;
        let is_hires_texture = stream.read_u8().map_err(truncated("is_hires_tex"))?;
        let declared_size = stream.read_u32().map_err(truncated("size"))?;

        if self.verbosity >= 2 {
            info!(
                offset = format_args!("{:#x}", offset),
                checksum = format_args!("{:#018X}", checksum),
                width,
                height,
                format = format_args!("{:#x}", format),
                small_lod_log2,
                large_lod_log2,
                aspect_ratio_log2,
                tiles,
                untiled_width,
                untiled_height,
                is_hires_texture,
                size = declared_size,
                "record header"
            );
        }

        let payload = self
            .stream
            .read_vec(declared_size as usize)
            .map_err(truncated("payload"))?;

        Ok(Some(TextureRecord {
            offset,
            checksum,
            width,
            height,
            format,
            small_lod_log2,
            large_lod_log2,
            aspect_ratio_log2,
            tiles,
            untiled_width,
            untiled_height,
            is_hires_texture,
            declared_size,
            payload,
        }))
    }
}

/// Map a short read to [`Error::Truncated`] naming `field`.
fn truncated(field: &'static str) -> impl FnOnce(texcache_common::Error) -> Error {
    move |err| match err {
        texcache_common::Error::UnexpectedEof {
            needed,
            available,
            offset,
        } => Error::Truncated {
            field,
            offset,
            needed,
            available,
        },
        other => other.into(),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{record, stream};
    use super::*;

    #[test]
    fn test_read_config_and_record() {
        let data = stream(0x0020_0000, &[record(0x1234, 2, 1, 0x0a, &[1, 2, 3, 4])]);
        let mut reader = RecordReader::new(&data[..], 0);

        assert_eq!(reader.read_config().unwrap(), CacheConfig(0x0020_0000));

        let rec = reader.read_record().unwrap().unwrap();
        assert_eq!(rec.offset, 4);
        assert_eq!(rec.checksum, 0x1234);
        assert_eq!((rec.width, rec.height), (2, 1));
        assert_eq!(rec.texture_format(), Some(TextureFormat::Rgb565));
        assert_eq!(rec.declared_size, 4);
        assert_eq!(rec.payload, [1, 2, 3, 4]);
        assert_eq!(reader.position(), 4 + RECORD_HEADER_SIZE + 4);

        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_header_field_order() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        for value in [10u32, 20] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&0x8012u16.to_le_bytes());
        for value in [1u32, 2, 3, 4, 5, 6] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.push(1);
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&[0xAA, 0xBB]);
        assert_eq!(data.len() as u64, RECORD_HEADER_SIZE + 2);

        let rec = RecordReader::new(&data[..], 2).read_record().unwrap().unwrap();
        assert_eq!(rec.checksum, 0x0102_0304_0506_0708);
        assert_eq!(rec.format_code(), 0x12);
        assert!(rec.is_deflated());
        assert_eq!(
            [
                rec.small_lod_log2,
                rec.large_lod_log2,
                rec.aspect_ratio_log2,
                rec.tiles,
                rec.untiled_width,
                rec.untiled_height
            ],
            [1, 2, 3, 4, 5, 6]
        );
        assert_eq!(rec.is_hires_texture, 1);
        assert_eq!(rec.payload, [0xAA, 0xBB]);
    }

    #[test]
    fn test_trailing_bytes_end_stream() {
        let mut data = record(1, 1, 1, 0x02, &[0]);
        data.extend_from_slice(&[0xFF; 5]);
        let mut reader = RecordReader::new(&data[..], 0);

        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_truncated_header_names_field() {
        let data = record(1, 4, 4, 0x12, &[]);
        let mut reader = RecordReader::new(&data[..13], 0);

        match reader.read_record() {
            Err(Error::Truncated {
                field,
                offset,
                needed,
                available,
            }) => {
                assert_eq!(field, "height");
                assert_eq!(offset, 12);
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_truncated_payload() {
        let data = record(1, 2, 2, 0x12, &[0u8; 16]);
        let mut reader = RecordReader::new(&data[..data.len() - 3], 0);

        assert!(matches!(
            reader.read_record(),
            Err(Error::Truncated {
                field: "payload",
                needed: 16,
                available: 13,
                ..
            })
        ));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_huge_declared_size_on_short_stream() {
        let mut data = record(1, 2, 2, 0x12, &[]);
        let size_at = data.len() - 4;
        data[size_at..].copy_from_slice(&0xC000_0000u32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3]);

        let mut reader = RecordReader::new(&data[..], 0);
        assert!(matches!(
            reader.read_record(),
            Err(Error::Truncated {
                field: "payload",
                offset: 47,
                needed: 0xC000_0000,
                available: 3,
            })
        ));
        assert_eq!(reader.position(), data.len() as u64);
    }

    #[test]
    fn test_truncated_config() {
        let mut reader = RecordReader::new(&[0u8, 1][..], 0);
        assert!(matches!(
            reader.read_config(),
            Err(Error::Truncated { field: "config", .. })
        ));
    }
}
