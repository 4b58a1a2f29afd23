//! # Storage Layer
//!
//! Two files make up one cache directory:
//!
//! ```text
//! <cache dir>/
//! ├── xml.index    # one decimal byte offset per verse ordinal, 0 = absent
//! ├── xml.data     # header + append-only length-prefixed UTF-8 records
//! └── cache.json   # cache configuration (see config.rs)
//! ```
//!
//! - [`index::OffsetIndex`]: the in-memory ordinal → offset table and its
//!   plain-text persistence.
//! - [`blob::TextBlob`]: the record file, opened read-only or read-write.
//!
//! Neither type knows about the other. Keeping the index pointing at valid
//! records is the job of [`crate::cache::VerseCache`].

pub mod blob;
pub mod index;

pub const INDEX_FILENAME: &str = "xml.index";
pub const DATA_FILENAME: &str = "xml.data";
