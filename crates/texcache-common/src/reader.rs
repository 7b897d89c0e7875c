//! Stream reader for forward-only parsing of little-endian data.
//!
//! This module provides [`StreamReader`], a cursor-like wrapper around any
//! [`Read`] implementation that keeps track of how many bytes have been
//! consumed so errors can point at the offending offset.

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian};

use crate::{Error, Result};

/// A forward-only reader that tracks its absolute position in the stream.
///
/// Unlike [`Read::read_exact`], every fixed-size read reports how many bytes
/// were actually available when the stream ends early.
///
/// # Example
///
/// ```
/// use texcache_common::StreamReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
/// let mut reader = StreamReader::new(&data[..]);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u16().unwrap(), 0x0605);
/// assert_eq!(reader.position(), 6);
/// ```
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> StreamReader<R> {
    /// Create a new reader starting at offset zero.
    #[inline]
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Get the number of bytes consumed so far.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read until `buf` is full or the stream ends.
    ///
    /// Returns the number of bytes read, which is only smaller than
    /// `buf.len()` at end of stream.
    pub fn read_up_to(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.position += filled as u64;
        Ok(filled)
    }

    /// Fill `buf` completely or fail with [`Error::UnexpectedEof`].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = self.position;
        let available = self.read_up_to(buf)?;
        if available < buf.len() {
            return Err(Error::UnexpectedEof {
                needed: buf.len(),
                available,
                offset: start,
            });
        }
        Ok(())
    }

    /// Read exactly `len` bytes into a freshly allocated buffer.
    ///
    /// The buffer only grows as bytes arrive, so a bogus length on a short
    /// stream fails without touching `len` bytes of memory.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let start = self.position;
        let mut buf = reserve_buffer(len)?;

        let available = (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        self.position += available as u64;

        if available < len {
            return Err(Error::UnexpectedEof {
                needed: len,
                available,
                offset: start,
            });
        }
        Ok(buf)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }
}

/// Create an empty buffer with room for `len` bytes without aborting on failure.
pub fn reserve_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { size: len })?;
    Ok(buf)
}

/// Allocate a zeroed buffer of `len` bytes without aborting on failure.
pub fn alloc_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buf = reserve_buffer(len)?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most one byte per call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, // u16: 0xFFFF
            0x7F, // u8
            0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, // u64
        ];
        let mut reader = StreamReader::new(&data[..]);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_u16().unwrap(), 0xFFFF);
        assert_eq!(reader.read_u8().unwrap(), 0x7F);
        assert_eq!(reader.read_u64().unwrap(), 0x0102030405060708);
        assert_eq!(reader.position(), data.len() as u64);
    }

    #[test]
    fn test_partial_reads_are_reassembled() {
        let data = [0xEF, 0xBE, 0xAD, 0xDE];
        let mut reader = StreamReader::new(Trickle(&data));

        assert_eq!(reader.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_eof_error_reports_offset() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = StreamReader::new(&data[..]);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        match reader.read_u32() {
            Err(Error::UnexpectedEof {
                needed,
                available,
                offset,
            }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 2);
                assert_eq!(offset, 1);
            }
            other => panic!("expected UnexpectedEof, got {:?}", other),
        }
    }

    #[test]
    fn test_read_up_to_at_end() {
        let data = [0xAA, 0xBB];
        let mut reader = StreamReader::new(&data[..]);
        let mut buf = [0u8; 8];

        assert_eq!(reader.read_up_to(&mut buf).unwrap(), 2);
        assert_eq!(reader.read_up_to(&mut buf).unwrap(), 0);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_read_vec() {
        let data = b"payload";
        let mut reader = StreamReader::new(&data[..]);

        assert_eq!(reader.read_vec(4).unwrap(), b"payl");
        assert!(reader.read_vec(4).is_err());
    }

    #[test]
    fn test_read_vec_large_length_on_short_stream() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = StreamReader::new(Trickle(&data));
        let len = 256 << 20;

        match reader.read_vec(len) {
            Err(Error::UnexpectedEof {
                needed,
                available,
                offset,
            }) => {
                assert_eq!(needed, len);
                assert_eq!(available, 3);
                assert_eq!(offset, 0);
            }
            other => panic!("expected UnexpectedEof, got {:?}", other.map(|v| v.len())),
        }
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn test_reserve_buffer_is_empty() {
        let buf = reserve_buffer(1024).unwrap();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 1024);
        assert_eq!(alloc_buffer(3).unwrap(), [0, 0, 0]);
    }
}
