//! Cache configuration word.
//!
//! Glide64 stores the options that produced a cache in the first four bytes
//! of the file. The bits are decoded into the ini setting names Glide64 uses,
//! which is what someone debugging a cache wants to compare against.

use std::fmt;
use std::str::FromStr;

/// Texture filter selection.
pub const FILTER_MASK: u32 = 0x0000_00ff;
/// Texture enhancement selection.
pub const ENHANCEMENT_MASK: u32 = 0x0000_0f00;
/// Texture compression method.
pub const COMPRESSION_MASK: u32 = 0x0000_f000;
/// Hi-res texture pack kind.
pub const HIRESTEXTURES_MASK: u32 = 0x000f_0000;
/// Enhanced textures are compressed.
pub const COMPRESS_TEX: u32 = 0x0010_0000;
/// Hi-res textures are compressed.
pub const COMPRESS_HIRESTEX: u32 = 0x0020_0000;
/// Enhanced texture cache is gzipped.
pub const GZ_TEXCACHE: u32 = 0x0040_0000;
/// Hi-res texture cache is gzipped.
pub const GZ_HIRESTEXCACHE: u32 = 0x0080_0000;
/// Hi-res textures are tiled.
pub const TILE_HIRESTEX: u32 = 0x0400_0000;
/// Hi-res textures are forced to 16 bpp.
pub const FORCE16BPP_HIRESTEX: u32 = 0x1000_0000;
/// Enhanced textures are forced to 16 bpp.
pub const FORCE16BPP_TEX: u32 = 0x2000_0000;
/// Hi-res textures keep their alpha untouched.
pub const LET_TEXARTISTS_FLY: u32 = 0x4000_0000;

const FXT1_COMPRESSION: u32 = 0x0000_1000;
const S3TC_COMPRESSION: u32 = 0x0000_3000;
const NO_HIRESTEXTURES: u32 = 0x0000_0000;
const RICE_HIRESTEXTURES: u32 = 0x0002_0000;

const HIRES_BITS: u32 = HIRESTEXTURES_MASK
    | COMPRESS_HIRESTEX
    | COMPRESSION_MASK
    | TILE_HIRESTEX
    | FORCE16BPP_HIRESTEX
    | GZ_HIRESTEXCACHE
    | LET_TEXARTISTS_FLY;

const TEX_BITS: u32 =
    FILTER_MASK | ENHANCEMENT_MASK | COMPRESS_TEX | COMPRESSION_MASK | FORCE16BPP_TEX | GZ_TEXCACHE;

const UNSUPPORTED: &str = "set to an unsupported format";

/// Which kind of cache the input is declared to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    /// Accept the bits of either cache kind.
    #[default]
    Unknown,
    /// Hi-res texture pack cache (`*_HIRESTEXTURES.dat`).
    HiRes,
    /// Enhanced texture cache (`*_MEMORYCACHE.dat`).
    Tex,
}

impl InputKind {
    /// Config bits that carry meaning for this kind of cache.
    pub const fn mask(self) -> u32 {
        match self {
            Self::Unknown => HIRES_BITS | TEX_BITS,
            Self::HiRes => HIRES_BITS,
            Self::Tex => TEX_BITS,
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    /// Case-insensitive, so `HIRES` and `Tex` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("hires") {
            Ok(Self::HiRes)
        } else if s.eq_ignore_ascii_case("tex") {
            Ok(Self::Tex)
        } else {
            Err(format!("unknown input type '{}', expected 'hires' or 'tex'", s))
        }
    }
}

/// One decoded option, named like the Glide64 ini key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub key: &'static str,
    pub value: &'static str,
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// The configuration word at the start of a cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheConfig(pub u32);

impl CacheConfig {
    /// Raw word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Set bits that have no meaning for `kind`, or 0.
    #[inline]
    pub const fn unknown_bits(self, kind: InputKind) -> u32 {
        self.0 & !kind.mask()
    }

    /// Decode the settings relevant to `kind`, in Glide64 ini order.
    pub fn settings(self, kind: InputKind) -> Vec<Setting> {
        let owned = kind.mask();
        let config = self.0;
        let mut settings = Vec::new();

        let mut push = |key, value| settings.push(Setting { key, value });

        if owned & HIRESTEXTURES_MASK == HIRESTEXTURES_MASK {
            let value = match config & HIRESTEXTURES_MASK {
                NO_HIRESTEXTURES => "0",
                RICE_HIRESTEXTURES => "1",
                _ => UNSUPPORTED,
            };
            push("ghq_hirs", value);
        }

        if owned & COMPRESS_HIRESTEX != 0 {
            push("ghq_hirs_cmpr", flag(config, COMPRESS_HIRESTEX));
        }

        if owned & COMPRESSION_MASK == COMPRESSION_MASK && config & COMPRESS_HIRESTEX != 0 {
            let value = match config & COMPRESSION_MASK {
                FXT1_COMPRESSION => "1",
                S3TC_COMPRESSION => "0",
                _ => UNSUPPORTED,
            };
            push("ghq_cmpr", value);
        }

        for (bit, key) in [
            (TILE_HIRESTEX, "ghq_hirs_tile"),
            (FORCE16BPP_HIRESTEX, "ghq_hirs_f16bpp"),
            (GZ_HIRESTEXCACHE, "ghq_hirs_gz"),
            (LET_TEXARTISTS_FLY, "ghq_hirs_let_texartists_fly"),
        ] {
            if owned & bit != 0 {
                push(key, flag(config, bit));
            }
        }

        if owned & FILTER_MASK == FILTER_MASK {
            let value = match config & FILTER_MASK {
                0x00 => "0",
                0x01 => "1",
                0x02 => "2",
                0x03 => "3",
                0x04 => "4",
                0x10 => "5",
                0x20 => "6",
                _ => UNSUPPORTED,
            };
            push("ghq_fltr", value);
        }

        if owned & ENHANCEMENT_MASK == ENHANCEMENT_MASK {
            // Ini values do not follow the bit order.
            let value = match config & ENHANCEMENT_MASK {
                0x000 => "0",
                0x100 => "2",
                0x200 => "3",
                0x300 => "4",
                0x600 => "5",
                0x400 => "6",
                0x700 => "7",
                0x500 => "8",
                _ => UNSUPPORTED,
            };
            push("ghq_enht", value);
        }

        for (bit, key) in [
            (COMPRESS_TEX, "ghq_enht_cmpr"),
            (FORCE16BPP_TEX, "ghq_enht_f16bpp"),
            (GZ_TEXCACHE, "ghq_enht_gz"),
        ] {
            if owned & bit != 0 {
                push(key, flag(config, bit));
            }
        }

        settings
    }
}

fn flag(config: u32, bit: u32) -> &'static str {
    if config & bit != 0 {
        "True"
    } else {
        "False"
    }
}
