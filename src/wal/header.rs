//! WAL sibling detection
//!
//! Inspects the first bytes of `<db>-wal` to tell a genuine SQLite WAL from a
//! standalone database file. Frames are counted, never applied.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use bytes::Buf;
use serde::Serialize;

use crate::error::{InspectError, Result};

/// Fixed suffix of the WAL sibling
pub const WAL_SUFFIX: &str = "-wal";

/// WAL header size in bytes
pub const WAL_HEADER_SIZE: usize = 32;

/// Per-frame header size in bytes
pub const WAL_FRAME_HEADER_SIZE: u64 = 24;

/// Magic with little-endian checksum words
pub const WAL_MAGIC_LE: u32 = 0x377F_0682;

/// Magic with big-endian checksum words
pub const WAL_MAGIC_BE: u32 = 0x377F_0683;

/// The only WAL format version SQLite has shipped
pub const WAL_FORMAT_VERSION: u32 = 3_007_000;

const SQLITE_DB_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Path of the WAL sibling for a database path
pub fn wal_path_for(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_owned();
    os.push(WAL_SUFFIX);
    PathBuf::from(os)
}

/// Parsed WAL file header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalHeader {
    pub magic: u32,
    pub format_version: u32,
    pub page_size: u32,
    pub checkpoint_seq: u32,
    pub salt1: u32,
    pub salt2: u32,
    pub checksum1: u32,
    pub checksum2: u32,

    /// Stored checksum matches the one computed over the first 24 bytes
    pub checksum_valid: bool,

    /// Whole frames present after the header, from the file length
    pub frame_count: u64,
}

impl WalHeader {
    /// Parse a header from the start of a WAL file of `file_len` bytes
    pub fn parse(bytes: &[u8], file_len: u64) -> Result<Self> {
        if bytes.len() < WAL_HEADER_SIZE {
            return Err(InspectError::WalRead(format!(
                "WAL header too short: expected {} bytes, got {}",
                WAL_HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut cursor = &bytes[..WAL_HEADER_SIZE];
        let magic = cursor.get_u32();
        if magic != WAL_MAGIC_LE && magic != WAL_MAGIC_BE {
            return Err(InspectError::WalRead(format!("bad WAL magic: {:#010x}", magic)));
        }

        let format_version = cursor.get_u32();
        let page_size = cursor.get_u32();
        let checkpoint_seq = cursor.get_u32();
        let salt1 = cursor.get_u32();
        let salt2 = cursor.get_u32();
        let checksum1 = cursor.get_u32();
        let checksum2 = cursor.get_u32();

        let big_endian = magic == WAL_MAGIC_BE;
        let (s1, s2) = wal_checksum(&bytes[..24], 0, 0, big_endian);

        let frame_count = if valid_page_size(page_size) {
            file_len.saturating_sub(WAL_HEADER_SIZE as u64) / (WAL_FRAME_HEADER_SIZE + page_size as u64)
        } else {
            0
        };

        Ok(Self {
            magic,
            format_version,
            page_size,
            checkpoint_seq,
            salt1,
            salt2,
            checksum1,
            checksum2,
            checksum_valid: s1 == checksum1 && s2 == checksum2,
            frame_count,
        })
    }

    /// Checksum words are big-endian when the magic's low bit is set
    pub fn big_endian_checksum(&self) -> bool {
        self.magic == WAL_MAGIC_BE
    }

    /// Header looks like something SQLite would replay
    pub fn is_plausible(&self) -> bool {
        self.format_version == WAL_FORMAT_VERSION && valid_page_size(self.page_size) && self.checksum_valid
    }
}

/// What the `-wal` sibling turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiblingKind {
    /// Zero-length file (SQLite truncates the WAL after a full checkpoint)
    Empty,

    /// A database file in its own right
    Database,

    /// A genuine write-ahead log
    Wal(WalHeader),
}

/// Classify the file at `path` by its leading bytes
///
/// Every failure is a `WalRead` error so callers can degrade uniformly.
pub fn sniff(path: &Path) -> Result<SiblingKind> {
    let read_err = |e: std::io::Error| InspectError::WalRead(format!("{}: {}", path.display(), e));

    let file = File::open(path).map_err(read_err)?;
    let file_len = file.metadata().map_err(read_err)?.len();
    if file_len == 0 {
        return Ok(SiblingKind::Empty);
    }

    let mut head = Vec::with_capacity(WAL_HEADER_SIZE);
    file.take(WAL_HEADER_SIZE as u64)
        .read_to_end(&mut head)
        .map_err(read_err)?;

    if head.len() >= SQLITE_DB_MAGIC.len() && head[..SQLITE_DB_MAGIC.len()] == SQLITE_DB_MAGIC[..] {
        return Ok(SiblingKind::Database);
    }

    if head.len() >= 4 {
        let mut magic_bytes = &head[..4];
        let magic = magic_bytes.get_u32();
        if magic == WAL_MAGIC_LE || magic == WAL_MAGIC_BE {
            return WalHeader::parse(&head, file_len).map(SiblingKind::Wal);
        }
    }

    Err(InspectError::WalRead(format!(
        "{} is neither a database nor a WAL file",
        path.display()
    )))
}

/// SQLite's WAL checksum over 8-byte chunks, seeded with `(s1, s2)`
///
/// Trailing bytes that do not fill a chunk are ignored.
pub fn wal_checksum(data: &[u8], seed1: u32, seed2: u32, big_endian: bool) -> (u32, u32) {
    let word = |b: &[u8]| {
        let arr = [b[0], b[1], b[2], b[3]];
        if big_endian {
            u32::from_be_bytes(arr)
        } else {
            u32::from_le_bytes(arr)
        }
    };

    let mut s1 = seed1;
    let mut s2 = seed2;
    for chunk in data.chunks_exact(8) {
        s1 = s1.wrapping_add(word(&chunk[..4])).wrapping_add(s2);
        s2 = s2.wrapping_add(word(&chunk[4..])).wrapping_add(s1);
    }
    (s1, s2)
}

fn valid_page_size(page_size: u32) -> bool {
    (512..=65536).contains(&page_size) && page_size.is_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(magic: u32, page_size: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(WAL_HEADER_SIZE);
        for word in [magic, WAL_FORMAT_VERSION, page_size, 7, 0xDEAD_BEEF, 0x0BAD_F00D] {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        let (s1, s2) = wal_checksum(&bytes, 0, 0, magic == WAL_MAGIC_BE);
        bytes.extend_from_slice(&s1.to_be_bytes());
        bytes.extend_from_slice(&s2.to_be_bytes());
        bytes
    }

    #[test]
    fn test_parse_valid_header() {
        let bytes = header_bytes(WAL_MAGIC_LE, 4096);
        let len = WAL_HEADER_SIZE as u64 + 3 * (WAL_FRAME_HEADER_SIZE + 4096);

        let header = WalHeader::parse(&bytes, len).unwrap();

        assert_eq!(header.page_size, 4096);
        assert_eq!(header.checkpoint_seq, 7);
        assert_eq!(header.salt1, 0xDEAD_BEEF);
        assert_eq!(header.frame_count, 3);
        assert!(header.checksum_valid);
        assert!(header.is_plausible());
        assert!(!header.big_endian_checksum());
    }

    #[test]
    fn test_parse_big_endian_checksum() {
        let bytes = header_bytes(WAL_MAGIC_BE, 1024);
        let header = WalHeader::parse(&bytes, WAL_HEADER_SIZE as u64).unwrap();

        assert!(header.big_endian_checksum());
        assert!(header.checksum_valid);
        assert_eq!(header.frame_count, 0);
    }

    #[test]
    fn test_corrupted_header_fails_checksum() {
        let mut bytes = header_bytes(WAL_MAGIC_LE, 4096);
        bytes[13] ^= 0xFF;

        let header = WalHeader::parse(&bytes, WAL_HEADER_SIZE as u64).unwrap();
        assert!(!header.checksum_valid);
        assert!(!header.is_plausible());
    }

    #[test]
    fn test_partial_frame_not_counted() {
        let bytes = header_bytes(WAL_MAGIC_LE, 512);
        let len = WAL_HEADER_SIZE as u64 + (WAL_FRAME_HEADER_SIZE + 512) + 100;
        assert_eq!(WalHeader::parse(&bytes, len).unwrap().frame_count, 1);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = header_bytes(WAL_MAGIC_LE, 4096);
        bytes[0] = 0;
        assert!(matches!(
            WalHeader::parse(&bytes, 32),
            Err(InspectError::WalRead(_))
        ));
    }

    #[test]
    fn test_wal_path_appends_suffix() {
        assert_eq!(
            wal_path_for(Path::new("/data/line.sqlite")),
            PathBuf::from("/data/line.sqlite-wal")
        );
    }
}
