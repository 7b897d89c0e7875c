//! Cache to tar extraction pipeline.
//!
//! [`Extractor`] pulls one record at a time through
//! read → inflate → normalize → encode → append, so memory use is bounded by
//! the largest single texture.

use std::io::{Read, Write};

use texcache_image::{BmpVersion, ContainerKind};
use texcache_tar::{TarHeader, TarWriter, BLOCK_SIZE};
use tracing::{info, warn};

use crate::config::{CacheConfig, InputKind};
use crate::decompress::inflate_sized;
use crate::format::{Decoder, TextureFormat};
use crate::normalize::normalize;
use crate::record::{RecordReader, TextureRecord};
use crate::{Error, Result};

/// Longest suffix [`entry_name`] appends to the prefix.
const LONGEST_SUFFIX: &str = "#00000000#3#0#00000000_ciByRGBA.bmp";

/// Longest prefix that keeps every entry name inside the tar name field.
pub const MAX_PREFIX_LEN: usize = TarHeader::MAX_NAME_LEN - LONGEST_SUFFIX.len();

/// Options for a single extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// 1 logs the config word, 2 also logs every record header.
    pub verbosity: u8,
    /// Drop records that fail conversion instead of aborting.
    pub skip_errors: bool,
    /// Header flavor for bitmap entries.
    pub bmp_version: BmpVersion,
    /// Prepended to every entry name.
    pub prefix: String,
    /// Which config bits are expected.
    pub input_kind: InputKind,
}

impl ExtractOptions {
    /// Check that every entry name these options produce fits the archive.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.as_bytes().contains(&0) {
            return Err(Error::InvalidConfig("prefix contains a NUL byte".to_string()));
        }
        if self.prefix.len() > MAX_PREFIX_LEN {
            return Err(Error::InvalidConfig(format!(
                "prefix is {} bytes, at most {} fit in a tar entry name",
                self.prefix.len(),
                MAX_PREFIX_LEN
            )));
        }
        Ok(())
    }
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtractSummary {
    /// Records read from the input.
    pub records: usize,
    /// Entries appended to the archive.
    pub written: usize,
    /// Records dropped because of recoverable errors.
    pub skipped: usize,
    /// Archive size including the end marker.
    pub bytes_written: u64,
    /// Configuration word of the input.
    pub config: CacheConfig,
}

/// What happened to one record.
#[derive(Debug)]
pub enum Outcome {
    /// The record was appended under `name` with `size` content bytes.
    Written { name: String, size: usize },
    /// The record was dropped.
    Skipped { error: Error },
}

/// Streaming extractor over a cache input and a tar output.
pub struct Extractor<R, W: Write> {
    reader: RecordReader<R>,
    tar: TarWriter<W>,
    options: ExtractOptions,
    summary: ExtractSummary,
}

impl<R: Read, W: Write> Extractor<R, W> {
    /// Validate `options` and read the configuration word.
    pub fn new(input: R, output: W, options: ExtractOptions) -> Result<Self> {
        options.validate()?;

        let mut reader = RecordReader::new(input, options.verbosity);
        let config = reader.read_config()?;

        if options.verbosity >= 1 {
            info!(config = format_args!("{:#010x}", config.bits()), "config header");
            for setting in config.settings(options.input_kind) {
                info!(key = setting.key, value = setting.value, "config setting");
            }
        }

        let unknown = config.unknown_bits(options.input_kind);
        if unknown != 0 {
            warn!(bits = format_args!("{:#x}", unknown), "unknown bits set in config field");
        }

        Ok(Self {
            reader,
            tar: TarWriter::new(output),
            options,
            summary: ExtractSummary {
                config,
                ..Default::default()
            },
        })
    }

    /// Configuration word of the input.
    #[inline]
    pub fn config(&self) -> CacheConfig {
        self.summary.config
    }

    /// Process the next record.
    ///
    /// Returns `Ok(None)` at the end of the input. Recoverable errors come
    /// back as [`Outcome::Skipped`] when skipping is enabled.
    pub fn next_entry(&mut self) -> Result<Option<Outcome>> {
        let Some(mut record) = self.reader.read_record()? else {
            return Ok(None);
        };
        self.summary.records += 1;

        match self.process(&mut record) {
            Ok((name, size)) => {
                self.summary.written += 1;
                Ok(Some(Outcome::Written { name, size }))
            }
            Err(err) => {
                let err = record.context(err);
                if self.options.skip_errors && err.is_recoverable() {
                    warn!(error = %err, "skipping record");
                    self.summary.skipped += 1;
                    Ok(Some(Outcome::Skipped { error: err }))
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Process every record and close the archive.
    pub fn run(self) -> Result<ExtractSummary> {
        self.run_with(|_| {})
    }

    /// Like [`run`](Self::run), reporting each outcome to `on_entry`.
    pub fn run_with(mut self, mut on_entry: impl FnMut(&Outcome)) -> Result<ExtractSummary> {
        while let Some(outcome) = self.next_entry()? {
            on_entry(&outcome);
        }

        self.summary.bytes_written = self.tar.offset() + 2 * BLOCK_SIZE as u64;
        self.tar.finish()?;

        Ok(self.summary)
    }

    /// Convert one record and append it. Nothing is written unless every
    /// step succeeds.
    fn process(&mut self, record: &mut TextureRecord) -> Result<(String, usize)> {
        let code = record.format_code();
        let format = TextureFormat::from_code(code).ok_or(Error::UnsupportedFormat {
            format: code,
            reason: "unknown format code",
        })?;
        if let Decoder::Unsupported(reason) = format.descriptor().decoder {
            return Err(Error::UnsupportedFormat { format: code, reason });
        }

        let (width, height) = (record.width, record.height);
        if width == 0 || height == 0 {
            return Err(Error::EmptyTexture { width, height });
        }

        let expected = format.payload_size(width, height);
        let payload = std::mem::take(&mut record.payload);
        let payload = if record.is_deflated() {
            inflate_sized(&payload, expected)?
        } else if payload.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: payload.len(),
            });
        } else {
            payload
        };

        let normalized = normalize(payload, width, height, format)?;
        let data = texcache_image::encode(
            &normalized.data,
            width,
            height,
            normalized.surface,
            self.options.bmp_version,
        )?;

        let name = entry_name(
            &self.options.prefix,
            record.checksum,
            normalized.surface.container(),
        );
        self.tar.append(&name, &data)?;

        Ok((name, data.len()))
    }
}

/// Extract every record of `input` into a tar stream on `output`.
pub fn extract<R: Read, W: Write>(input: R, output: W, options: &ExtractOptions) -> Result<ExtractSummary> {
    Extractor::new(input, output, options.clone())?.run()
}

/// Archive entry name for a texture.
///
/// Textures with a nonzero upper checksum half are color-indexed variants and
/// carry both halves in the name.
pub fn entry_name(prefix: &str, checksum: u64, container: ContainerKind) -> String {
    let low = checksum as u32;
    let high = (checksum >> 32) as u32;
    let ext = container.extension();

    if high == 0 {
        format!("{}#{:08X}#3#0_all.{}", prefix, low, ext)
    } else {
        format!("{}#{:08X}#3#0#{:08X}_ciByRGBA.{}", prefix, low, high, ext)
    }
}
