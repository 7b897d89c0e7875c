//! Windows Bitmap encoding for 32-bit ARGB surfaces.
//!
//! Two header flavours are supported:
//!
//! - [`BmpVersion::V3`] - classic 54-byte file with a `BITMAPINFOHEADER`
//! - [`BmpVersion::V5`] - `BITMAPV5HEADER` with explicit channel masks, which
//!   makes tools such as ImageMagick honour the alpha channel
//!
//! The pixel rows are stored bottom-up, so the encoder flips the top-down
//! input while copying.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{Error, Result};

/// `"BM"` as a little-endian u16.
const BMP_SIGNATURE: u16 = 0x4d42;

/// Size of the `BITMAPFILEHEADER`.
pub const FILE_HEADER_SIZE: u32 = 14;
/// Size of the `BITMAPINFOHEADER`.
pub const INFO_HEADER_SIZE: u32 = 40;
/// Size of the `BITMAPV5HEADER`.
pub const V5_HEADER_SIZE: u32 = 124;

/// `BI_RGB`
const COMPRESSION_RGB: u32 = 0;
/// `BI_BITFIELDS`
const COMPRESSION_BITFIELDS: u32 = 3;

/// 72 DPI expressed in pixels per metre.
const PIXELS_PER_METRE: u32 = 2835;

/// `LCS_sRGB`
const COLOR_SPACE_SRGB: u32 = 0x7352_4742;

/// CIEXYZ endpoints (red, green, blue; x, y, z each).
#[rustfmt::skip]
const ENDPOINTS: [u32; 9] = [
    0, 0, 0xfc1e_b854,
    0, 0, 0xfc66_6666,
    0, 0, 0xff28_f5c4,
];

/// `LCS_GM_IMAGES`
const INTENT_IMAGES: u32 = 4;

/// Bitmap header flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BmpVersion {
    /// Classic `BITMAPINFOHEADER`, no alpha masks.
    #[default]
    V3,
    /// `BITMAPV5HEADER` with ARGB bit masks and an sRGB color space tag.
    V5,
}

impl BmpVersion {
    /// Total size of file header plus DIB header.
    #[inline]
    pub const fn header_size(self) -> u32 {
        match self {
            Self::V3 => FILE_HEADER_SIZE + INFO_HEADER_SIZE,
            Self::V5 => FILE_HEADER_SIZE + V5_HEADER_SIZE,
        }
    }
}

/// Encode top-down little-endian ARGB8888 pixels as a 32-bit bitmap.
pub fn encode_bmp(pixels: &[u8], width: u32, height: u32, version: BmpVersion) -> Result<Vec<u8>> {
    let too_large = || Error::TooLarge { width, height };

    let line_size = (width as usize).checked_mul(4).ok_or_else(too_large)?;
    let expected = line_size
        .checked_mul(height as usize)
        .ok_or_else(too_large)?;
    if pixels.len() != expected {
        return Err(Error::PixelSizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let header_size = version.header_size();
    let data_size = u32::try_from(expected).map_err(|_| too_large())?;
    let file_size = data_size.checked_add(header_size).ok_or_else(too_large)?;

    let mut output = Vec::with_capacity(file_size as usize);

    // BITMAPFILEHEADER
    output.write_u16::<LittleEndian>(BMP_SIGNATURE)?;
    output.write_u32::<LittleEndian>(file_size)?;
    output.write_u32::<LittleEndian>(0)?;
    output.write_u32::<LittleEndian>(header_size)?;

    match version {
        BmpVersion::V3 => write_info_header(&mut output, width, height, data_size, COMPRESSION_RGB)?,
        BmpVersion::V5 => write_v5_header(&mut output, width, height, data_size)?,
    }
    debug_assert_eq!(output.len(), header_size as usize);

    if line_size > 0 {
        for row in pixels.chunks_exact(line_size).rev() {
            output.extend_from_slice(row);
        }
    }

    Ok(output)
}

fn write_info_header<W: Write>(
    w: &mut W,
    width: u32,
    height: u32,
    data_size: u32,
    compression: u32,
) -> std::io::Result<()> {
    let size = if compression == COMPRESSION_BITFIELDS {
        V5_HEADER_SIZE
    } else {
        INFO_HEADER_SIZE
    };

    w.write_u32::<LittleEndian>(size)?;
    w.write_u32::<LittleEndian>(width)?;
    w.write_u32::<LittleEndian>(height)?;
    w.write_u16::<LittleEndian>(1)?; // planes
    w.write_u16::<LittleEndian>(32)?; // bits per pixel
    w.write_u32::<LittleEndian>(compression)?;
    w.write_u32::<LittleEndian>(data_size)?;
    w.write_u32::<LittleEndian>(PIXELS_PER_METRE)?;
    w.write_u32::<LittleEndian>(PIXELS_PER_METRE)?;
    w.write_u32::<LittleEndian>(0)?; // colors used
    w.write_u32::<LittleEndian>(0) // important colors
}

fn write_v5_header<W: Write>(w: &mut W, width: u32, height: u32, data_size: u32) -> std::io::Result<()> {
    write_info_header(w, width, height, data_size, COMPRESSION_BITFIELDS)?;

    w.write_u32::<LittleEndian>(0x00ff_0000)?; // red
    w.write_u32::<LittleEndian>(0x0000_ff00)?; // green
    w.write_u32::<LittleEndian>(0x0000_00ff)?; // blue
    w.write_u32::<LittleEndian>(0xff00_0000)?; // alpha
    w.write_u32::<LittleEndian>(COLOR_SPACE_SRGB)?;
    for endpoint in ENDPOINTS {
        w.write_u32::<LittleEndian>(endpoint)?;
    }
    // gamma red, green, blue
    for _ in 0..3 {
        w.write_u32::<LittleEndian>(0)?;
    }
    w.write_u32::<LittleEndian>(INTENT_IMAGES)?;
    // Profile offset and size are not used with LCS_sRGB; Glide64 dumps carry 4 in both.
    w.write_u32::<LittleEndian>(4)?;
    w.write_u32::<LittleEndian>(4)?;
    w.write_u32::<LittleEndian>(0) // reserved
}
