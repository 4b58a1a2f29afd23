//! Ordinal → byte offset table.
//!
//! In memory every slot is an `Option<u64>`. On disk the table is plain text,
//! one unsigned decimal offset per line in ordinal order, with `0` standing
//! for an absent verse.

use crate::error::{CacheError, Result};
use crate::store::blob::{StoreError, HEADER_LEN};
use crate::versification::Ordinal;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: '{value}' is not a byte offset")]
    Format { line: usize, value: String },

    #[error("expected {expected} lines but found {found}")]
    Short { expected: usize, found: usize },

    #[error("line {line}: offset {offset} points into the data file header")]
    OffsetInHeader { line: usize, offset: u64 },

    #[error("line {line}: offset {offset} is past the end of the data file ({blob_len} bytes)")]
    Dangling {
        line: usize,
        offset: u64,
        blob_len: u64,
    },

    #[error("data file: {0}")]
    Data(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetIndex {
    slots: Vec<Option<u64>>,
}

impl OffsetIndex {
    /// Index of `total` absent slots.
    pub fn new(total: Ordinal) -> Self {
        Self {
            slots: vec![None; total as usize],
        }
    }

    /// Reads exactly `total` lines from `path`. Offsets must point into the
    /// record area of a data file that is `blob_len` bytes long.
    pub fn load(
        path: impl AsRef<Path>,
        total: Ordinal,
        blob_len: u64,
    ) -> std::result::Result<Self, IndexError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        Self::read_from(reader, total, blob_len)
    }

    pub fn read_from<R: BufRead>(
        reader: R,
        total: Ordinal,
        blob_len: u64,
    ) -> std::result::Result<Self, IndexError> {
        let expected = total as usize;
        let mut slots = Vec::with_capacity(expected);
        let mut lines = reader.lines();

        while slots.len() < expected {
            let line_no = slots.len() + 1;
            let line = match lines.next() {
                Some(line) => line?,
                None => {
                    return Err(IndexError::Short {
                        expected,
                        found: slots.len(),
                    })
                }
            };
            let value = line.trim();
            let offset: u64 = value.parse().map_err(|_| IndexError::Format {
                line: line_no,
                value: value.to_string(),
            })?;

            let slot = match offset {
                0 => None,
                o if o < HEADER_LEN => {
                    return Err(IndexError::OffsetInHeader {
                        line: line_no,
                        offset: o,
                    })
                }
                o if o >= blob_len => {
                    return Err(IndexError::Dangling {
                        line: line_no,
                        offset: o,
                        blob_len,
                    })
                }
                o => Some(o),
            };
            slots.push(slot);
        }

        let extra = lines.count();
        if extra > 0 {
            tracing::debug!(extra, "ignoring trailing lines in index file");
        }
        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, ordinal: Ordinal) -> Result<Option<u64>> {
        let i = self.slot(ordinal)?;
        Ok(self.slots[i])
    }

    pub fn set(&mut self, ordinal: Ordinal, offset: u64) -> Result<()> {
        let i = self.slot(ordinal)?;
        self.slots[i] = Some(offset);
        Ok(())
    }

    pub fn present_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// `(ordinal, offset)` for every recorded verse, in ordinal order.
    pub fn iter_present(&self) -> impl Iterator<Item = (Ordinal, u64)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|offset| (i as Ordinal + 1, offset)))
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for slot in &self.slots {
            writeln!(writer, "{}", slot.unwrap_or(0))?;
        }
        writer.flush()
    }

    /// Writes the index to a temporary file next to `path` and renames it
    /// into place, so readers never see a half-written index.
    pub fn persist(&self, path: impl AsRef<Path>, sync: bool) -> io::Result<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let tmp_path = dir.join(format!(".index-{}.tmp", Uuid::new_v4()));

        let result = (|| {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            self.write_to(&mut writer)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            if sync {
                file.sync_all()?;
            }
            fs::rename(&tmp_path, path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    fn slot(&self, ordinal: Ordinal) -> Result<usize> {
        if ordinal == 0 || ordinal as usize > self.slots.len() {
            return Err(CacheError::IndexOutOfRange {
                ordinal,
                max: self.slots.len() as Ordinal,
            });
        }
        Ok(ordinal as usize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    const BLOB_LEN: u64 = 1_000;

    fn read(text: &str, total: Ordinal) -> std::result::Result<OffsetIndex, IndexError> {
        OffsetIndex::read_from(Cursor::new(text), total, BLOB_LEN)
    }

    #[test]
    fn test_new_is_all_absent() {
        let index = OffsetIndex::new(5);
        assert_eq!(index.len(), 5);
        assert_eq!(index.present_count(), 0);
        for ordinal in 1..=5 {
            assert_eq!(index.get(ordinal).unwrap(), None);
        }
    }

    #[test]
    fn test_out_of_range_is_error_not_clamp() {
        let mut index = OffsetIndex::new(5);
        assert!(matches!(
            index.get(0),
            Err(CacheError::IndexOutOfRange { ordinal: 0, max: 5 })
        ));
        assert!(matches!(
            index.get(6),
            Err(CacheError::IndexOutOfRange { ordinal: 6, max: 5 })
        ));
        assert!(index.set(6, 10).is_err());
    }

    #[test]
    fn test_set_overwrites() {
        let mut index = OffsetIndex::new(3);
        index.set(2, 8).unwrap();
        index.set(2, 40).unwrap();
        assert_eq!(index.get(2).unwrap(), Some(40));
        assert_eq!(index.iter_present().collect::<Vec<_>>(), vec![(2, 40)]);
    }

    #[test]
    fn test_read_maps_lines_to_ordinals() {
        let index = read("0\n8\n0\n20\n", 4).unwrap();
        assert_eq!(index.get(1).unwrap(), None);
        assert_eq!(index.get(2).unwrap(), Some(8));
        assert_eq!(index.get(4).unwrap(), Some(20));
    }

    #[test]
    fn test_read_ignores_extra_lines() {
        let index = read("8\n0\n99\n", 2).unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_read_short_file() {
        let err = read("8\n0\n", 3).unwrap_err();
        assert!(matches!(err, IndexError::Short { expected: 3, found: 2 }));
    }

    #[test]
    fn test_read_bad_number() {
        let err = read("8\nabc\n0\n", 3).unwrap_err();
        assert!(matches!(err, IndexError::Format { line: 2, ref value } if value == "abc"));

        let err = read("8\n-4\n0\n", 3).unwrap_err();
        assert!(matches!(err, IndexError::Format { line: 2, .. }));
    }

    #[test]
    fn test_read_offset_checks() {
        let err = read("3\n", 1).unwrap_err();
        assert!(matches!(err, IndexError::OffsetInHeader { line: 1, offset: 3 }));

        let err = read("0\n1000\n", 2).unwrap_err();
        assert!(matches!(err, IndexError::Dangling { line: 2, offset: 1000, .. }));
    }

    #[test]
    fn test_write_format() {
        let mut index = OffsetIndex::new(3);
        index.set(3, 12).unwrap();
        let mut out = Vec::new();
        index.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\n0\n12\n");
    }

    #[test]
    fn test_persist_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xml.index");

        let mut index = OffsetIndex::new(4);
        index.set(1, 8).unwrap();
        index.set(4, 30).unwrap();
        index.persist(&path, true).unwrap();

        let loaded = OffsetIndex::load(&path, 4, BLOB_LEN).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_persist_leaves_no_tmp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("xml.index");
        OffsetIndex::new(2).persist(&path, false).unwrap();
        OffsetIndex::new(2).persist(&path, false).unwrap();

        for entry in fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name();
            let name = name.to_string_lossy();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }
}
