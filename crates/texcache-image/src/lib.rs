//! Image container encoding for extracted textures.
//!
//! Normalized texture data ends up in one of two containers:
//!
//! - Windows Bitmap for 32-bit ARGB surfaces ([`encode_bmp`])
//! - DirectDraw Surface for DXT block-compressed surfaces ([`encode_dds`])
//!
//! All headers are written field by field in little-endian order, so the
//! output is identical on every host.
//!
//! # Example
//!
//! ```
//! use texcache_image::{encode, BmpVersion, Surface};
//!
//! // 1x1 opaque white pixel
//! let pixels = 0xFFFF_FFFFu32.to_le_bytes();
//! let bmp = encode(&pixels, 1, 1, Surface::Argb8888, BmpVersion::V3)?;
//! assert_eq!(bmp.len(), 54 + 4);
//! # Ok::<(), texcache_image::Error>(())
//! ```

mod bmp;
mod dds;
mod error;

pub use bmp::{encode_bmp, BmpVersion};
pub use dds::{encode_dds, DdsHeader, DdsPixelFormat, FourCC};
pub use error::{Error, Result};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// Layout of the pixel data handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Top-down little-endian `A<<24 | R<<16 | G<<8 | B` words.
    Argb8888,
    /// Block-compressed data identified by its FourCC.
    Compressed(FourCC),
}

impl Surface {
    /// The container this surface is stored in.
    #[inline]
    pub const fn container(self) -> ContainerKind {
        match self {
            Self::Argb8888 => ContainerKind::Bmp,
            Self::Compressed(_) => ContainerKind::Dds,
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Windows Bitmap.
    Bmp,
    /// DirectDraw Surface.
    Dds,
}

impl ContainerKind {
    /// File extension without the dot.
    #[inline]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Bmp => "bmp",
            Self::Dds => "dds",
        }
    }
}

/// Wrap pixel data in the container matching `surface`.
///
/// `bmp_version` only affects ARGB surfaces.
pub fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    surface: Surface,
    bmp_version: BmpVersion,
) -> Result<Vec<u8>> {
    match surface {
        Surface::Argb8888 => encode_bmp(pixels, width, height, bmp_version),
        Surface::Compressed(four_cc) => encode_dds(pixels, width, height, four_cc),
    }
}
