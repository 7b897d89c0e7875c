//! texcache - Glide64 texture cache extraction library.
//!
//! Glide64 keeps enhanced and hi-res textures in a flat little-endian cache
//! file. This crate reads such a cache record by record, converts every
//! texture into a standalone image and writes the images into a tar archive.
//!
//! # Crates
//!
//! - [`texcache_common`] - Position-tracking stream reader
//! - [`texcache_image`] - BMP v3/v5 and DDS container encoding
//! - [`texcache_tar`] - Streaming V7 tar writer
//!
//! # Pipeline
//!
//! 1. [`RecordReader`] parses the configuration word and the records.
//! 2. Compressed payloads are inflated ([`inflate_sized`]).
//! 3. [`normalize`] widens packed pixels to ARGB8888 or passes DXT blocks on.
//! 4. The surface is wrapped in a BMP or DDS container.
//! 5. [`TarWriter`](texcache_tar::TarWriter) appends it under [`entry_name`].
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{BufReader, BufWriter};
//!
//! use texcache::prelude::*;
//!
//! let input = BufReader::new(File::open("GOLDENEYE_HIRESTEXTURES.dat")?);
//! let output = BufWriter::new(File::create("textures.tar")?);
//!
//! let options = ExtractOptions {
//!     skip_errors: true,
//!     ..Default::default()
//! };
//! let summary = extract(input, output, &options)?;
//! println!("{} textures written", summary.written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod decompress;
mod error;
pub mod extract;
pub mod format;
pub mod normalize;
pub mod record;

pub use config::{CacheConfig, InputKind, Setting};
pub use decompress::inflate_sized;
pub use error::{Error, Result};
pub use extract::{entry_name, extract, ExtractOptions, ExtractSummary, Extractor, Outcome};
pub use format::{expected_payload_size, FormatDescriptor, TextureFormat, DEFLATE_FLAG};
pub use normalize::{normalize, Normalized};
pub use record::{RecordReader, TextureRecord};

// Re-export sub-crates
pub use texcache_common as common;
pub use texcache_image as image;
pub use texcache_tar as tar;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        entry_name, extract, CacheConfig, Error, ExtractOptions, ExtractSummary, Extractor,
        InputKind, Outcome, TextureFormat, TextureRecord,
    };
    pub use texcache_image::{BmpVersion, ContainerKind, Surface};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
