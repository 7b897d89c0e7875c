//! Streaming tar writer.
//!
//! Writes pre-POSIX (V7) tar archives to any [`std::io::Write`] sink without
//! seeking. Every entry is a 512-byte header block followed by the content,
//! zero-padded to the next block boundary. [`TarWriter::finish`] appends the
//! two zero blocks that mark the end of the archive.
//!
//! # Example
//!
//! ```
//! use texcache_tar::{TarWriter, BLOCK_SIZE};
//!
//! let mut tar = TarWriter::new(Vec::new());
//! tar.append("hello.txt", b"hello")?;
//! let archive = tar.finish()?;
//! assert_eq!(archive.len(), 4 * BLOCK_SIZE);
//! # Ok::<(), texcache_tar::Error>(())
//! ```

mod error;
mod header;
mod writer;

pub use error::{Error, Result};
pub use header::TarHeader;
pub use writer::TarWriter;

/// Size of a tar block.
pub const BLOCK_SIZE: usize = 512;
