//! Pixel normalization.
//!
//! Packed Glide formats are widened to little-endian ARGB8888 words so they
//! can be stored in a 32-bit bitmap. Truecolor and DXT payloads are handed on
//! without copying.

use byteorder::{ByteOrder, LittleEndian};
use texcache_common::alloc_buffer;
use texcache_image::Surface;

use crate::format::{Decoder, TextureFormat};
use crate::{Error, Result};

/// Per-pixel expansion to `A<<24 | R<<16 | G<<8 | B`.
///
/// Narrow channels are widened by bit replication, so all-zero fields map to
/// 0x00 and all-one fields to 0xFF.
pub mod expand {
    #[inline]
    const fn argb(a: u32, r: u32, g: u32, b: u32) -> u32 {
        (a << 24) | (r << 16) | (g << 8) | b
    }

    #[inline]
    const fn bits4(v: u32) -> u32 {
        (v << 4) | v
    }

    #[inline]
    const fn bits5(v: u32) -> u32 {
        (v << 3) | (v >> 2)
    }

    #[inline]
    const fn bits6(v: u32) -> u32 {
        (v << 2) | (v >> 4)
    }

    /// `ALPHA_8`: the byte lands in every channel.
    pub fn alpha8(raw: u8) -> u32 {
        let a = u32::from(raw);
        argb(a, a, a, a)
    }

    /// `INTENSITY_8`: the byte lands in every channel.
    pub fn intensity8(raw: u8) -> u32 {
        let i = u32::from(raw);
        argb(i, i, i, i)
    }

    /// `ALPHA_INTENSITY_44`: high nibble alpha, low nibble intensity.
    pub fn alpha_intensity44(raw: u8) -> u32 {
        let raw = u32::from(raw);
        let a = bits4(raw >> 4);
        let i = bits4(raw & 0x0f);
        argb(a, i, i, i)
    }

    /// `RGB_565`, opaque.
    pub fn rgb565(raw: u16) -> u32 {
        let raw = u32::from(raw);
        let r = bits5((raw >> 11) & 0x1f);
        let g = bits6((raw >> 5) & 0x3f);
        let b = bits5(raw & 0x1f);
        argb(0xff, r, g, b)
    }

    /// `ARGB_1555`
    pub fn argb1555(raw: u16) -> u32 {
        let raw = u32::from(raw);
        let a = if raw & 0x8000 != 0 { 0xff } else { 0x00 };
        let r = bits5((raw >> 10) & 0x1f);
        let g = bits5((raw >> 5) & 0x1f);
        let b = bits5(raw & 0x1f);
        argb(a, r, g, b)
    }

    /// `ARGB_4444`
    pub fn argb4444(raw: u16) -> u32 {
        let raw = u32::from(raw);
        let a = bits4((raw >> 12) & 0x0f);
        let r = bits4((raw >> 8) & 0x0f);
        let g = bits4((raw >> 4) & 0x0f);
        let b = bits4(raw & 0x0f);
        argb(a, r, g, b)
    }

    /// `ALPHA_INTENSITY_88`: high byte alpha, low byte intensity.
    pub fn alpha_intensity88(raw: u16) -> u32 {
        let raw = u32::from(raw);
        let a = raw >> 8;
        let i = raw & 0xff;
        argb(a, i, i, i)
    }
}

/// Pixel data ready for a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Pixel bytes in `surface` layout.
    pub data: Vec<u8>,
    /// Layout of `data`.
    pub surface: Surface,
}

/// Convert a decompressed payload into a container-ready surface.
///
/// The payload must have exactly the size the format implies. Truecolor and
/// block-compressed payloads are moved through unchanged.
pub fn normalize(payload: Vec<u8>, width: u32, height: u32, format: TextureFormat) -> Result<Normalized> {
    let expected = format.payload_size(width, height);
    if payload.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: payload.len(),
        });
    }

    let (data, surface) = match format.descriptor().decoder {
        Decoder::Byte(pixel) => (widen(&payload, 1, |px| pixel(px[0]))?, Surface::Argb8888),
        Decoder::Word(pixel) => (
            widen(&payload, 2, |px| pixel(LittleEndian::read_u16(px)))?,
            Surface::Argb8888,
        ),
        Decoder::Truecolor => (payload, Surface::Argb8888),
        Decoder::Passthrough(four_cc) => (payload, Surface::Compressed(four_cc)),
        Decoder::Unsupported(reason) => {
            return Err(Error::UnsupportedFormat {
                format: format.code(),
                reason,
            })
        }
    };

    Ok(Normalized { data, surface })
}

fn widen(payload: &[u8], bytes_per_pixel: usize, pixel: impl Fn(&[u8]) -> u32) -> Result<Vec<u8>> {
    let pixels = payload.len() / bytes_per_pixel;
    let mut output = alloc_buffer(pixels.saturating_mul(4))?;

    for (src, dst) in payload
        .chunks_exact(bytes_per_pixel)
        .zip(output.chunks_exact_mut(4))
    {
        LittleEndian::write_u32(dst, pixel(src));
    }

    Ok(output)
}
