//! Glide texture format registry.
//!
//! Every format code Glide64 writes into its cache maps to a
//! [`FormatDescriptor`] that says how large the payload is and how it is
//! turned into something an image container can hold.

use std::fmt;

use texcache_image::FourCC;

use crate::normalize::expand;

/// Format flag set when the payload is zlib-compressed.
pub const DEFLATE_FLAG: u16 = 0x8000;

/// Pixel formats that can appear in a Glide64 texture cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TextureFormat {
    /// `GR_TEXFMT_ALPHA_8`
    Alpha8 = 0x02,
    /// `GR_TEXFMT_INTENSITY_8`
    Intensity8 = 0x03,
    /// `GR_TEXFMT_ALPHA_INTENSITY_44`
    AlphaIntensity44 = 0x04,
    /// `GR_TEXFMT_P_8`
    Palette8 = 0x05,
    /// `GR_TEXFMT_RGB_565`
    Rgb565 = 0x0a,
    /// `GR_TEXFMT_ARGB_1555`
    Argb1555 = 0x0b,
    /// `GR_TEXFMT_ARGB_4444`
    Argb4444 = 0x0c,
    /// `GR_TEXFMT_ALPHA_INTENSITY_88`
    AlphaIntensity88 = 0x0d,
    /// `GR_TEXFMT_ARGB_CMP_FXT1`
    Fxt1 = 0x11,
    /// `GR_TEXFMT_ARGB_8888`
    Argb8888 = 0x12,
    /// `GR_TEXFMT_ARGB_CMP_DXT1`
    Dxt1 = 0x16,
    /// `GR_TEXFMT_ARGB_CMP_DXT3`
    Dxt3 = 0x18,
    /// `GR_TEXFMT_ARGB_CMP_DXT5`
    Dxt5 = 0x1a,
}

/// How the payload of a format is laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Fixed number of bytes per pixel.
    Packed { bytes_per_pixel: usize },
    /// Blocks covering `block_width` x `block_height` pixels; dimensions are
    /// rounded up to whole blocks.
    Blocks {
        block_width: u32,
        block_height: u32,
        block_bytes: usize,
    },
}

impl Storage {
    /// Payload size in bytes for a texture of the given dimensions.
    ///
    /// Saturates instead of overflowing, which keeps the result monotonic.
    pub fn payload_size(self, width: u32, height: u32) -> usize {
        match self {
            Self::Packed { bytes_per_pixel } => (width as usize)
                .saturating_mul(height as usize)
                .saturating_mul(bytes_per_pixel),
            Self::Blocks {
                block_width,
                block_height,
                block_bytes,
            } => {
                let blocks_x = (width as usize).div_ceil(block_width as usize);
                let blocks_y = (height as usize).div_ceil(block_height as usize);
                blocks_x.saturating_mul(blocks_y).saturating_mul(block_bytes)
            }
        }
    }
}

/// How a format is converted for output.
#[derive(Clone, Copy)]
pub enum Decoder {
    /// One byte per pixel, expanded to ARGB8888.
    Byte(fn(u8) -> u32),
    /// One little-endian word per pixel, expanded to ARGB8888.
    Word(fn(u16) -> u32),
    /// Already ARGB8888.
    Truecolor,
    /// Block data stored as is in a DDS container.
    Passthrough(FourCC),
    /// No conversion exists.
    Unsupported(&'static str),
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(_) => f.write_str("Byte"),
            Self::Word(_) => f.write_str("Word"),
            Self::Truecolor => f.write_str("Truecolor"),
            Self::Passthrough(four_cc) => write!(f, "Passthrough({})", four_cc),
            Self::Unsupported(reason) => write!(f, "Unsupported({:?})", reason),
        }
    }
}

/// Registry entry for a [`TextureFormat`].
#[derive(Debug, Clone, Copy)]
pub struct FormatDescriptor {
    /// Glide name of the format.
    pub name: &'static str,
    /// Payload layout.
    pub storage: Storage,
    /// Output conversion.
    pub decoder: Decoder,
}

const fn packed(bytes_per_pixel: usize) -> Storage {
    Storage::Packed { bytes_per_pixel }
}

const fn blocks(block_width: u32, block_height: u32, block_bytes: usize) -> Storage {
    Storage::Blocks {
        block_width,
        block_height,
        block_bytes,
    }
}

impl TextureFormat {
    /// All known formats in code order.
    pub const ALL: [Self; 13] = [
        Self::Alpha8,
        Self::Intensity8,
        Self::AlphaIntensity44,
        Self::Palette8,
        Self::Rgb565,
        Self::Argb1555,
        Self::Argb4444,
        Self::AlphaIntensity88,
        Self::Fxt1,
        Self::Argb8888,
        Self::Dxt1,
        Self::Dxt3,
        Self::Dxt5,
    ];

    /// Look up a format by its code. The deflate flag must already be stripped.
    pub const fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0x02 => Self::Alpha8,
            0x03 => Self::Intensity8,
            0x04 => Self::AlphaIntensity44,
            0x05 => Self::Palette8,
            0x0a => Self::Rgb565,
            0x0b => Self::Argb1555,
            0x0c => Self::Argb4444,
            0x0d => Self::AlphaIntensity88,
            0x11 => Self::Fxt1,
            0x12 => Self::Argb8888,
            0x16 => Self::Dxt1,
            0x18 => Self::Dxt3,
            0x1a => Self::Dxt5,
            _ => return None,
        })
    }

    /// The Glide format code.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Registry entry for this format.
    pub fn descriptor(self) -> FormatDescriptor {
        let (name, storage, decoder) = match self {
            Self::Alpha8 => ("ALPHA_8", packed(1), Decoder::Byte(expand::alpha8)),
            Self::Intensity8 => ("INTENSITY_8", packed(1), Decoder::Byte(expand::intensity8)),
            Self::AlphaIntensity44 => (
                "ALPHA_INTENSITY_44",
                packed(1),
                Decoder::Byte(expand::alpha_intensity44),
            ),
            Self::Palette8 => (
                "P_8",
                packed(1),
                Decoder::Unsupported("palette data is not stored in the cache"),
            ),
            Self::Rgb565 => ("RGB_565", packed(2), Decoder::Word(expand::rgb565)),
            Self::Argb1555 => ("ARGB_1555", packed(2), Decoder::Word(expand::argb1555)),
            Self::Argb4444 => ("ARGB_4444", packed(2), Decoder::Word(expand::argb4444)),
            Self::AlphaIntensity88 => (
                "ALPHA_INTENSITY_88",
                packed(2),
                Decoder::Word(expand::alpha_intensity88),
            ),
            Self::Fxt1 => (
                "ARGB_CMP_FXT1",
                blocks(8, 4, 16),
                Decoder::Unsupported("no container supports FXT1"),
            ),
            Self::Argb8888 => ("ARGB_8888", packed(4), Decoder::Truecolor),
            // Glide64 reserves 16 bytes per DXT1 block.
            Self::Dxt1 => ("ARGB_CMP_DXT1", blocks(4, 4, 16), Decoder::Passthrough(FourCC::DXT1)),
            Self::Dxt3 => ("ARGB_CMP_DXT3", blocks(4, 4, 32), Decoder::Passthrough(FourCC::DXT3)),
            Self::Dxt5 => ("ARGB_CMP_DXT5", blocks(4, 4, 32), Decoder::Passthrough(FourCC::DXT5)),
        };

        FormatDescriptor {
            name,
            storage,
            decoder,
        }
    }

    /// Glide name of the format.
    #[inline]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Payload size in bytes for a texture of the given dimensions.
    #[inline]
    pub fn payload_size(self, width: u32, height: u32) -> usize {
        self.descriptor().storage.payload_size(width, height)
    }

    /// Whether records of this format can be converted.
    #[inline]
    pub fn is_supported(self) -> bool {
        !matches!(self.descriptor().decoder, Decoder::Unsupported(_))
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload size implied by a raw format code, or 0 for unknown codes.
///
/// The deflate flag is ignored.
pub fn expected_payload_size(format: u16, width: u32, height: u32) -> usize {
    TextureFormat::from_code(format & !DEFLATE_FLAG)
        .map(|f| f.payload_size(width, height))
        .unwrap_or(0)
}
