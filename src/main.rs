//! texcache-extract - Command-line tool for Glide64 texture cache extraction.
//!
//! Reads a cache file (or stdin) and writes a tar archive (to a file or
//! stdout) with one BMP or DDS image per texture.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use texcache::prelude::*;

/// Exit code for bad arguments or unusable paths.
const EXIT_CONFIG: u8 = 1;
/// Exit code for errors while converting the stream.
const EXIT_STREAM: u8 = 2;

/// texcache-extract - Glide64 TexCache extraction tool
#[derive(Parser)]
#[command(name = "texcache-extract")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Cache file to read, `-` or nothing for stdin
    input: Option<PathBuf>,

    /// Tar file to write, stdout if omitted
    #[arg(short, long, env = "TEXCACHE_OUTPUT")]
    output: Option<PathBuf>,

    /// Prefix for every entry name (usually the ROM name)
    #[arg(short, long, default_value = "")]
    prefix: String,

    /// Kind of cache the input is: hires or tex, any case
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    input_type: Option<InputKind>,

    /// Increase verbosity (config header, then record headers)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Skip textures that cannot be converted
    #[arg(short, long)]
    ignore_error: bool,

    /// Write BMP v5 headers with alpha channel masks
    #[arg(short, long)]
    bitmapv5: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Stream errors exit with [`EXIT_STREAM`]; everything else is a setup problem.
fn exit_code(err: &anyhow::Error) -> u8 {
    let stream_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<texcache::Error>());

    match stream_error {
        Some(e) if !e.is_configuration() => EXIT_STREAM,
        _ => EXIT_CONFIG,
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = ExtractOptions {
        verbosity: cli.verbose,
        skip_errors: cli.ignore_error,
        bmp_version: if cli.bitmapv5 {
            BmpVersion::V5
        } else {
            BmpVersion::V3
        },
        prefix: cli.prefix,
        input_kind: cli.input_type.unwrap_or_default(),
    };
    options.validate().context("Invalid options")?;

    let input = open_input(cli.input.as_ref())?;
    let output = open_output(cli.output.as_ref())?;

    let start = Instant::now();
    let extractor = Extractor::new(input, output, options.clone())
        .context("Failed to read cache header")?;

    let spinner = (options.verbosity == 0 && io::stderr().is_terminal()).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} textures {msg}")
        {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = extractor.run_with(|outcome| {
        if let Some(pb) = &spinner {
            pb.inc(1);
            if let Outcome::Written { name, .. } = outcome {
                pb.set_message(name.clone());
            }
        }
    });

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let summary = result.context("Extraction failed")?;
    info!(
        records = summary.records,
        written = summary.written,
        skipped = summary.skipped,
        bytes = summary.bytes_written,
        "extraction completed in {:?}",
        start.elapsed()
    );

    Ok(())
}

fn open_input(path: Option<&PathBuf>) -> Result<Box<dyn Read>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(io::stdin().lock()))),
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "texcache-extract",
            "-vv",
            "-i",
            "-b",
            "-t",
            "hires",
            "-p",
            "ZELDA",
            "-o",
            "out.tar",
            "cache.dat",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(cli.ignore_error);
        assert!(cli.bitmapv5);
        assert_eq!(cli.input_type, Some(InputKind::HiRes));
        assert_eq!(cli.prefix, "ZELDA");
        assert_eq!(cli.output, Some(PathBuf::from("out.tar")));
        assert_eq!(cli.input, Some(PathBuf::from("cache.dat")));
    }

    #[test]
    fn test_cli_type_ignores_case() {
        for (arg, kind) in [
            ("HIRES", InputKind::HiRes),
            ("HiRes", InputKind::HiRes),
            ("Tex", InputKind::Tex),
        ] {
            let cli = Cli::try_parse_from(["texcache-extract", "-t", arg]).unwrap();
            assert_eq!(cli.input_type, Some(kind));
        }
        let cli = Cli::try_parse_from(["texcache-extract", "--type", "TEX"]).unwrap();
        assert_eq!(cli.input_type, Some(InputKind::Tex));
    }

    #[test]
    fn test_cli_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["texcache-extract", "-t", "rice"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let stream = anyhow::Error::new(texcache::Error::Truncated {
            field: "payload",
            offset: 0,
            needed: 4,
            available: 0,
        })
        .context("Extraction failed");
        assert_eq!(exit_code(&stream), EXIT_STREAM);

        let config = anyhow::Error::new(texcache::Error::InvalidConfig("prefix".into()));
        assert_eq!(exit_code(&config), EXIT_CONFIG);

        let open = anyhow::Error::new(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(exit_code(&open), EXIT_CONFIG);
    }
}
