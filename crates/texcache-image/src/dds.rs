//! DDS header structures and encoding.

use std::fmt;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{Error, Result, DDS_MAGIC};

/// Header flag: `caps` is valid.
pub const DDSD_CAPS: u32 = 0x0000_0001;
/// Header flag: `height` is valid.
pub const DDSD_HEIGHT: u32 = 0x0000_0002;
/// Header flag: `width` is valid.
pub const DDSD_WIDTH: u32 = 0x0000_0004;
/// Header flag: `pixel_format` is valid.
pub const DDSD_PIXELFORMAT: u32 = 0x0000_1000;
/// Header flag: `pitch_or_linear_size` holds the compressed size.
pub const DDSD_LINEARSIZE: u32 = 0x0008_0000;

/// Pixel format flag: `four_cc` is valid.
pub const DDPF_FOURCC: u32 = 0x0000_0004;

/// Surface capability: the file contains a texture.
pub const DDSCAPS_TEXTURE: u32 = 0x0000_1000;

/// Four-character code for compression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");

    /// The code as stored in the little-endian `four_cc` field.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        u32::from_le_bytes(self.0)
    }

    /// Whether the encoder knows how to describe this code.
    #[inline]
    pub fn is_supported(self) -> bool {
        matches!(self, Self::DXT1 | Self::DXT3 | Self::DXT5)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsPixelFormat {
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel.
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Encoded structure size.
    pub const SIZE: u32 = 32;

    /// Pixel format block for a block-compressed surface.
    ///
    /// The bit count and color masks carry no meaning for FourCC surfaces;
    /// they are filled the way Glide64 dumps have always been written.
    pub fn compressed(four_cc: FourCC) -> Self {
        Self {
            flags: DDPF_FOURCC,
            four_cc,
            rgb_bit_count: 24,
            r_bit_mask: 0x00ff_0000,
            g_bit_mask: 0x0000_ff00,
            b_bit_mask: 0x0000_00ff,
            a_bit_mask: 0,
        }
    }

    fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u32::<LittleEndian>(Self::SIZE)?;
        w.write_u32::<LittleEndian>(self.flags)?;
        w.write_u32::<LittleEndian>(self.four_cc.to_u32())?;
        w.write_u32::<LittleEndian>(self.rgb_bit_count)?;
        w.write_u32::<LittleEndian>(self.r_bit_mask)?;
        w.write_u32::<LittleEndian>(self.g_bit_mask)?;
        w.write_u32::<LittleEndian>(self.b_bit_mask)?;
        w.write_u32::<LittleEndian>(self.a_bit_mask)
    }
}

/// DDS file header (without the leading magic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
}

impl DdsHeader {
    /// Encoded header size (should be 124).
    pub const SIZE: u32 = 124;

    /// Magic plus header, i.e. the offset of the surface data.
    pub const FILE_HEADER_SIZE: usize = 4 + Self::SIZE as usize;

    /// Header for a single-level block-compressed texture.
    pub fn compressed(width: u32, height: u32, four_cc: FourCC, linear_size: u32) -> Self {
        Self {
            flags: DDSD_CAPS | DDSD_HEIGHT | DDSD_WIDTH | DDSD_PIXELFORMAT | DDSD_LINEARSIZE,
            height,
            width,
            pitch_or_linear_size: linear_size,
            depth: 0,
            mipmap_count: 1,
            pixel_format: DdsPixelFormat::compressed(four_cc),
            caps: DDSCAPS_TEXTURE,
            caps2: 0,
            caps3: 0,
            caps4: 0,
        }
    }

    /// Write magic and header in little-endian order.
    pub fn write_to<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(DDS_MAGIC)?;
        w.write_u32::<LittleEndian>(Self::SIZE)?;
        w.write_u32::<LittleEndian>(self.flags)?;
        w.write_u32::<LittleEndian>(self.height)?;
        w.write_u32::<LittleEndian>(self.width)?;
        w.write_u32::<LittleEndian>(self.pitch_or_linear_size)?;
        w.write_u32::<LittleEndian>(self.depth)?;
        w.write_u32::<LittleEndian>(self.mipmap_count)?;
        // reserved1
        for _ in 0..11 {
            w.write_u32::<LittleEndian>(0)?;
        }
        self.pixel_format.write_to(w)?;
        w.write_u32::<LittleEndian>(self.caps)?;
        w.write_u32::<LittleEndian>(self.caps2)?;
        w.write_u32::<LittleEndian>(self.caps3)?;
        w.write_u32::<LittleEndian>(self.caps4)?;
        // reserved2
        w.write_u32::<LittleEndian>(0)
    }
}

/// Wrap block-compressed data in a DDS container.
///
/// The blocks are appended untouched; DDS stores compressed rows top-down.
pub fn encode_dds(blocks: &[u8], width: u32, height: u32, four_cc: FourCC) -> Result<Vec<u8>> {
    if !four_cc.is_supported() {
        return Err(Error::UnsupportedFourCC(four_cc));
    }
    let linear_size = u32::try_from(blocks.len()).map_err(|_| Error::TooLarge { width, height })?;

    let header = DdsHeader::compressed(width, height, four_cc, linear_size);
    let mut output = Vec::with_capacity(DdsHeader::FILE_HEADER_SIZE + blocks.len());
    header.write_to(&mut output)?;
    output.extend_from_slice(blocks);

    Ok(output)
}
