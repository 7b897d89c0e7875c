//! Tar header block.

use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::{Error, Result, BLOCK_SIZE};

/// File mode of every entry.
const MODE: &[u8] = b"0000644";
/// Owner and group of every entry.
const OWNER: &[u8] = b"0000000";
/// Modification time of every entry (one second past the epoch).
const MTIME: u64 = 1;

/// Checksums are stored in six octal digits.
const CHECKSUM_MODULUS: u32 = 0x40000;

/// Largest value the 11-digit octal size field can hold.
const MAX_SIZE: u64 = 0o777_7777_7777;

/// V7 tar header, padded to a full block.
///
/// All fields are byte arrays, so the struct has no padding and the same
/// layout on every host.
#[derive(Debug, Clone, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TarHeader {
    /// NUL-terminated entry name.
    pub name: [u8; 100],
    /// Octal file mode.
    pub mode: [u8; 8],
    /// Octal owner id.
    pub uid: [u8; 8],
    /// Octal group id.
    pub gid: [u8; 8],
    /// Octal content size.
    pub size: [u8; 12],
    /// Octal modification time.
    pub mtime: [u8; 12],
    /// Octal header checksum.
    pub chksum: [u8; 8],
    /// Entry type; NUL is a regular file.
    pub typeflag: u8,
    /// Link target (unused).
    pub linkname: [u8; 100],
    /// Zero padding up to [`BLOCK_SIZE`].
    pub padding: [u8; 255],
}

const _: () = assert!(std::mem::size_of::<TarHeader>() == BLOCK_SIZE);

impl TarHeader {
    /// Longest name that still leaves room for the terminating NUL.
    pub const MAX_NAME_LEN: usize = 99;

    /// Build the header for a regular file of `size` bytes.
    pub fn for_file(name: &str, size: u64) -> Result<Self> {
        if name.len() > Self::MAX_NAME_LEN {
            return Err(Error::NameTooLong {
                name: name.to_string(),
                len: name.len(),
                max: Self::MAX_NAME_LEN,
            });
        }
        if name.as_bytes().contains(&0) {
            return Err(Error::InvalidName(name.to_string()));
        }
        if size > MAX_SIZE {
            return Err(Error::SizeTooLarge(size));
        }

        let mut header = Self::new_zeroed();
        header.name[..name.len()].copy_from_slice(name.as_bytes());
        header.mode[..MODE.len()].copy_from_slice(MODE);
        header.uid[..OWNER.len()].copy_from_slice(OWNER);
        header.gid[..OWNER.len()].copy_from_slice(OWNER);
        write_octal(&mut header.size, size);
        write_octal(&mut header.mtime, MTIME);

        let checksum = header.checksum();
        let digits = format!("{:06o}", checksum);
        header.chksum[..6].copy_from_slice(digits.as_bytes());
        header.chksum[6] = 0;
        header.chksum[7] = b' ';

        Ok(header)
    }

    /// Byte sum of the header with the checksum field read as spaces.
    pub fn checksum(&self) -> u32 {
        let mut blank = self.clone();
        blank.chksum = [b' '; 8];
        blank.as_bytes().iter().map(|&b| u32::from(b)).sum::<u32>() % CHECKSUM_MODULUS
    }

    /// Entry name up to the first NUL.
    pub fn name(&self) -> &[u8] {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        &self.name[..end]
    }
}

/// Write `value` as zero-padded octal digits followed by a NUL.
fn write_octal(field: &mut [u8], value: u64) {
    let digits = field.len() - 1;
    let text = format!("{:0width$o}", value, width = digits);
    field[..digits].copy_from_slice(text.as_bytes());
    field[digits] = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_layout() {
        let header = TarHeader::for_file("a.bmp", 70).unwrap();
        let raw = header.as_bytes();

        assert_eq!(raw.len(), BLOCK_SIZE);
        assert_eq!(&raw[..6], b"a.bmp\0");
        assert_eq!(&raw[100..108], b"0000644\0");
        assert_eq!(&raw[108..116], b"0000000\0");
        assert_eq!(&raw[116..124], b"0000000\0");
        assert_eq!(&raw[124..136], b"00000000106\0");
        assert_eq!(&raw[136..148], b"00000000001\0");
        assert_eq!(raw[154], 0);
        assert_eq!(raw[155], b' ');
        assert_eq!(raw[156], 0); // typeflag
        assert!(raw[157..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_checksum_matches_stored_value() {
        let header = TarHeader::for_file("prefix#DEADBEEF#3#0_all.bmp", 1234).unwrap();

        let stored = std::str::from_utf8(&header.chksum[..6]).unwrap();
        let stored = u32::from_str_radix(stored, 8).unwrap();
        assert_eq!(stored, header.checksum());

        // independent recomputation with the checksum field blanked
        let mut raw = header.as_bytes().to_vec();
        raw[148..156].fill(b' ');
        let sum: u32 = raw.iter().map(|&b| u32::from(b)).sum();
        assert_eq!(stored, sum % CHECKSUM_MODULUS);
    }

    #[test]
    fn test_parse_back() {
        let header = TarHeader::for_file("x.dds", 0).unwrap();
        let bytes = header.as_bytes().to_vec();
        let parsed = TarHeader::ref_from_bytes(&bytes).unwrap();

        assert_eq!(parsed.name(), b"x.dds");
        assert_eq!(&parsed.size, b"00000000000\0");
    }

    #[test]
    fn test_name_limits() {
        let longest = "n".repeat(TarHeader::MAX_NAME_LEN);
        let header = TarHeader::for_file(&longest, 1).unwrap();
        assert_eq!(header.name(), longest.as_bytes());
        assert_eq!(header.name[99], 0);

        let too_long = "n".repeat(TarHeader::MAX_NAME_LEN + 1);
        assert!(matches!(
            TarHeader::for_file(&too_long, 1),
            Err(Error::NameTooLong { len: 100, .. })
        ));
        assert!(matches!(
            TarHeader::for_file("a\0b", 1),
            Err(Error::InvalidName(_))
        ));
    }

    #[test]
    fn test_size_limit() {
        assert!(TarHeader::for_file("big", MAX_SIZE).is_ok());
        assert!(matches!(
            TarHeader::for_file("big", MAX_SIZE + 1),
            Err(Error::SizeTooLarge(_))
        ));
    }
}
