//! Streaming tar writer.

use std::io::Write;

use zerocopy::IntoBytes;

use crate::{Result, TarHeader, BLOCK_SIZE};

const ZERO_BLOCK: [u8; BLOCK_SIZE] = [0; BLOCK_SIZE];

/// Appends entries to a tar stream.
///
/// The writer keeps a running byte offset and pads every written chunk to the
/// next block boundary; nothing is ever buffered beyond the current entry.
#[derive(Debug)]
pub struct TarWriter<W: Write> {
    inner: W,
    offset: u64,
}

impl<W: Write> TarWriter<W> {
    /// Create a writer positioned at the start of an empty archive.
    pub fn new(inner: W) -> Self {
        Self { inner, offset: 0 }
    }

    /// Number of bytes written so far, padding included.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Append one regular file.
    ///
    /// The header is validated before any byte is written, so a rejected
    /// entry leaves the archive untouched.
    pub fn append(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let header = TarHeader::for_file(name, data.len() as u64)?;

        self.write_padded(header.as_bytes())?;
        self.write_padded(data)?;

        Ok(())
    }

    /// Write the end-of-archive marker and return the sink.
    pub fn finish(mut self) -> Result<W> {
        self.write_padded(&ZERO_BLOCK)?;
        self.write_padded(&ZERO_BLOCK)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_padded(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.offset += data.len() as u64;

        let partial = (self.offset % BLOCK_SIZE as u64) as usize;
        if partial != 0 {
            let padding = BLOCK_SIZE - partial;
            self.inner.write_all(&ZERO_BLOCK[..padding])?;
            self.offset += padding as u64;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::Error;

    fn single_entry(len: usize) -> Vec<u8> {
        let mut tar = TarWriter::new(Vec::new());
        tar.append("entry", &vec![0xAB; len]).unwrap();
        tar.into_bytes()
    }

    impl TarWriter<Vec<u8>> {
        fn into_bytes(self) -> Vec<u8> {
            self.inner
        }
    }

    #[test]
    fn test_padding_full_block() {
        let out = single_entry(512);
        assert_eq!(out.len(), 512 + 512);
        assert!(out[512..].iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_padding_single_byte() {
        let out = single_entry(1);
        assert_eq!(out.len(), 512 + 512);
        assert_eq!(out[512], 0xAB);
        assert_eq!(out[513..].len(), 511);
        assert!(out[513..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_padding_empty() {
        let out = single_entry(0);
        assert_eq!(out.len(), 512);
    }

    #[test]
    fn test_next_header_follows_padding() {
        let mut tar = TarWriter::new(Vec::new());
        tar.append("first", &[1u8; 1]).unwrap();
        tar.append("second", &[]).unwrap();
        tar.append("third", &[3u8; 512]).unwrap();
        assert_eq!(tar.offset(), 5 * 512);

        let out = tar.into_bytes();
        assert_eq!(&out[1024..1031], b"second\0");
        assert_eq!(&out[1536..1542], b"third\0");
    }

    #[test]
    fn test_finish_writes_end_marker() {
        let mut tar = TarWriter::new(Vec::new());
        tar.append("a", b"abc").unwrap();
        let out = tar.finish().unwrap();

        assert_eq!(out.len(), 4 * 512);
        assert!(out[1024..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rejected_entry_writes_nothing() {
        let mut tar = TarWriter::new(Vec::new());
        let name = "x".repeat(200);
        assert!(matches!(tar.append(&name, b"data"), Err(Error::NameTooLong { .. })));
        assert_eq!(tar.offset(), 0);
        assert!(tar.into_bytes().is_empty());
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_errors_are_reported() {
        let mut tar = TarWriter::new(FailingSink);
        assert!(matches!(tar.append("a", b"abc"), Err(Error::Write(_))));
    }
}
