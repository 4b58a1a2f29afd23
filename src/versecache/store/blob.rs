//! Append-only text record file.
//!
//! ```text
//! [magic "VCDT"][version: u32 BE]                 // 8-byte header
//! [length: u32 BE][utf8 bytes][length][bytes]...  // records
//! ```
//!
//! The header guarantees that no record starts at offset 0, so the index can
//! use 0 to mean "absent" on disk.

use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MAGIC: &[u8; 4] = b"VCDT";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_LEN: u64 = 8;
pub const LENGTH_PREFIX: u64 = 4;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("{} is not a verse data file", path.display())]
    BadHeader { path: PathBuf },

    #[error("Unsupported data file version {0}")]
    UnsupportedVersion(u32),

    #[error("Offset {offset} is outside the record area (file length {len})")]
    OutOfBounds { offset: u64, len: u64 },

    #[error("Corrupt record at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    #[error("Data file is open read-only")]
    ReadOnly,

    #[error("Text of {0} bytes is too large for one record")]
    TooLarge(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlobMode {
    ReadOnly,
    ReadWrite,
}

impl std::fmt::Display for BlobMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlobMode::ReadOnly => write!(f, "read-only"),
            BlobMode::ReadWrite => write!(f, "read-write"),
        }
    }
}

pub struct TextBlob {
    path: PathBuf,
    file: File,
    mode: BlobMode,
    len: u64,
}

impl TextBlob {
    /// Opens the data file, creating it with a header if it does not exist.
    pub fn open(path: impl AsRef<Path>, mode: BlobMode) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            create_with_header(&path)?;
            tracing::debug!(path = %path.display(), "created data file");
        }

        let file = match mode {
            BlobMode::ReadOnly => File::open(&path)?,
            BlobMode::ReadWrite => OpenOptions::new().read(true).write(true).open(&path)?,
        };
        let len = file.metadata()?.len();

        let mut blob = Self {
            path,
            file,
            mode,
            len,
        };
        blob.check_header()?;
        Ok(blob)
    }

    /// Replaces the handle with a fresh one in `mode`.
    pub fn reopen(&mut self, mode: BlobMode) -> Result<(), StoreError> {
        *self = Self::open(&self.path, mode)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> BlobMode {
        self.mode
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when the file holds no records.
    pub fn is_empty(&self) -> bool {
        self.len <= HEADER_LEN
    }

    /// Reads the record starting at `offset`.
    pub fn read_at(&mut self, offset: u64) -> Result<String, StoreError> {
        Ok(self.read_record(offset)?.0)
    }

    /// Reads the record at `offset` and returns it with the offset of the
    /// next record.
    pub fn read_record(&mut self, offset: u64) -> Result<(String, u64), StoreError> {
        if offset < HEADER_LEN || offset + LENGTH_PREFIX > self.len {
            return Err(StoreError::OutOfBounds {
                offset,
                len: self.len,
            });
        }

        self.file.seek(SeekFrom::Start(offset))?;
        let mut prefix = [0u8; 4];
        self.file.read_exact(&mut prefix)?;
        let length = u64::from(u32::from_be_bytes(prefix));

        let body_start = offset + LENGTH_PREFIX;
        if body_start + length > self.len {
            return Err(StoreError::Corrupt {
                offset,
                reason: format!(
                    "length {} runs past end of file ({} bytes)",
                    length, self.len
                ),
            });
        }

        let mut bytes = vec![0u8; length as usize];
        self.file.read_exact(&mut bytes)?;
        let text = String::from_utf8(bytes).map_err(|e| StoreError::Corrupt {
            offset,
            reason: format!("invalid UTF-8: {}", e),
        })?;
        Ok((text, body_start + length))
    }

    /// Appends a record and returns the offset it starts at.
    pub fn append(&mut self, text: &str) -> Result<u64, StoreError> {
        if self.mode == BlobMode::ReadOnly {
            return Err(StoreError::ReadOnly);
        }
        let length = u32::try_from(text.len()).map_err(|_| StoreError::TooLarge(text.len()))?;

        let offset = self.file.seek(SeekFrom::End(0))?;
        let mut record = Vec::with_capacity(text.len() + LENGTH_PREFIX as usize);
        record.extend_from_slice(&length.to_be_bytes());
        record.extend_from_slice(text.as_bytes());
        self.file.write_all(&record)?;

        self.len = offset + record.len() as u64;
        Ok(offset)
    }

    /// Flushes appended records to stable storage.
    pub fn sync(&mut self) -> Result<(), StoreError> {
        if self.mode == BlobMode::ReadWrite {
            self.file.flush()?;
            self.file.sync_data()?;
        }
        Ok(())
    }

    fn check_header(&mut self) -> Result<(), StoreError> {
        if self.len < HEADER_LEN {
            return Err(StoreError::BadHeader {
                path: self.path.clone(),
            });
        }
        self.file.seek(SeekFrom::Start(0))?;
        let mut header = [0u8; HEADER_LEN as usize];
        self.file.read_exact(&mut header)?;

        if &header[..4] != MAGIC {
            return Err(StoreError::BadHeader {
                path: self.path.clone(),
            });
        }
        let version = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
        if version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(version));
        }
        Ok(())
    }
}

fn create_with_header(path: &Path) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&FORMAT_VERSION.to_be_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xml.data");
        (dir, path)
    }

    #[test]
    fn test_new_file_has_header_only() {
        let (_dir, path) = setup();
        let blob = TextBlob::open(&path, BlobMode::ReadOnly).unwrap();
        assert_eq!(blob.len(), HEADER_LEN);
        assert!(blob.is_empty());
        assert_eq!(&fs::read(&path).unwrap()[..4], MAGIC);
    }

    #[test]
    fn test_append_never_returns_offset_zero() {
        let (_dir, path) = setup();
        let mut blob = TextBlob::open(&path, BlobMode::ReadWrite).unwrap();
        let first = blob.append("").unwrap();
        assert_eq!(first, HEADER_LEN);
        let second = blob.append("abc").unwrap();
        assert_eq!(second, HEADER_LEN + 4);
        assert_eq!(blob.len(), HEADER_LEN + 4 + 4 + 3);
    }

    #[test]
    fn test_append_and_read_back() {
        let (_dir, path) = setup();
        let mut blob = TextBlob::open(&path, BlobMode::ReadWrite).unwrap();
        let a = blob.append("In the beginning").unwrap();
        let b = blob.append("Ἐν ἀρχῇ ἦν ὁ λόγος").unwrap();
        assert_eq!(blob.read_at(b).unwrap(), "Ἐν ἀρχῇ ἦν ὁ λόγος");
        assert_eq!(blob.read_at(a).unwrap(), "In the beginning");

        let (_, next) = blob.read_record(a).unwrap();
        assert_eq!(next, b);
    }

    #[test]
    fn test_read_only_rejects_append() {
        let (_dir, path) = setup();
        let mut blob = TextBlob::open(&path, BlobMode::ReadOnly).unwrap();
        assert!(matches!(blob.append("x"), Err(StoreError::ReadOnly)));
    }

    #[test]
    fn test_reopen_sees_appended_records() {
        let (_dir, path) = setup();
        let mut writer = TextBlob::open(&path, BlobMode::ReadWrite).unwrap();
        let offset = writer.append("persisted").unwrap();
        writer.sync().unwrap();

        let mut reader = TextBlob::open(&path, BlobMode::ReadOnly).unwrap();
        assert_eq!(reader.read_at(offset).unwrap(), "persisted");

        reader.reopen(BlobMode::ReadWrite).unwrap();
        assert_eq!(reader.mode(), BlobMode::ReadWrite);
        let next = reader.append("more").unwrap();
        assert!(next > offset);
    }

    #[test]
    fn test_out_of_bounds_offsets() {
        let (_dir, path) = setup();
        let mut blob = TextBlob::open(&path, BlobMode::ReadWrite).unwrap();
        blob.append("x").unwrap();
        assert!(matches!(blob.read_at(0), Err(StoreError::OutOfBounds { .. })));
        assert!(matches!(blob.read_at(3), Err(StoreError::OutOfBounds { .. })));
        assert!(matches!(blob.read_at(1_000), Err(StoreError::OutOfBounds { .. })));
    }

    #[test]
    fn test_truncated_record_is_corrupt() {
        let (_dir, path) = setup();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        bytes.extend_from_slice(&100u32.to_be_bytes());
        bytes.extend_from_slice(b"short");
        fs::write(&path, bytes).unwrap();

        let mut blob = TextBlob::open(&path, BlobMode::ReadOnly).unwrap();
        assert!(matches!(
            blob.read_at(HEADER_LEN),
            Err(StoreError::Corrupt { offset: 8, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_corrupt() {
        let (_dir, path) = setup();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&[0xff, 0xfe]);
        fs::write(&path, bytes).unwrap();

        let mut blob = TextBlob::open(&path, BlobMode::ReadOnly).unwrap();
        assert!(matches!(blob.read_at(HEADER_LEN), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn test_foreign_file_is_rejected() {
        let (_dir, path) = setup();
        fs::write(&path, b"not a data file").unwrap();
        assert!(matches!(
            TextBlob::open(&path, BlobMode::ReadOnly),
            Err(StoreError::BadHeader { .. })
        ));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let (_dir, path) = setup();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&9u32.to_be_bytes());
        fs::write(&path, bytes).unwrap();
        assert!(matches!(
            TextBlob::open(&path, BlobMode::ReadOnly),
            Err(StoreError::UnsupportedVersion(9))
        ));
    }
}
