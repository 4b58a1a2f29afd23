//! # Cache Controller
//!
//! [`VerseCache`] ties one cache directory to one versification. It owns the
//! [`OffsetIndex`] and the [`TextBlob`] handle and keeps them consistent:
//!
//! - every present index slot points at the start of a record in the blob
//! - the index always has exactly `total_verse_count` slots
//! - records are only ever appended; rewriting a verse leaves the old record
//!   behind as unreachable bytes
//!
//! All state sits behind a single mutex. Every operation holds it for its
//! whole duration, so a flush (which swaps the blob handle) never interleaves
//! with a read or a write.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──► load ──► get_data / read_verse
//!            │
//!            └────► set_document ──► flush
//! ```
//!
//! `open` starts with an all-absent index and a read-only blob. `load` reads
//! `xml.index` if there is one. `set_document` appends to the blob (upgrading
//! the handle to read-write on first use) and updates the in-memory index
//! only; nothing is durable until `flush`. Dropping a cache with unflushed
//! writes loses them and logs a warning.

use crate::builder::DocumentBuilder;
use crate::config::CacheConfig;
use crate::document::Document;
use crate::error::{CacheError, Result};
use crate::passage::Passage;
use crate::store::blob::{BlobMode, StoreError, TextBlob, HEADER_LEN, LENGTH_PREFIX};
use crate::store::index::OffsetIndex;
use crate::store::{DATA_FILENAME, INDEX_FILENAME};
use crate::versification::{Ordinal, Versification, VersificationProvider};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of a range query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub document: Document,
    /// Requested ordinals with no recorded text, in request order
    pub missing: Vec<Ordinal>,
}

impl QueryResult {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// Ordinals whose index slot now points at new text, in document order
    pub recorded: Vec<Ordinal>,
    /// Bytes appended to the data file, length prefixes included
    pub bytes_written: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorruptVerse {
    pub ordinal: Ordinal,
    pub offset: u64,
    pub reason: String,
}

/// Report from [`VerseCache::check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub verses_checked: usize,
    pub corrupt: Vec<CorruptVerse>,
    /// Records found walking the data file from the header
    pub record_count: usize,
    /// Bytes of records referenced by the index
    pub live_bytes: u64,
    /// Bytes of records no index slot points at
    pub garbage_bytes: u64,
    /// Offset where walking the data file hit an unreadable record
    pub truncated_at: Option<u64>,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.corrupt.is_empty() && self.truncated_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub versification: String,
    pub total_verses: Ordinal,
    pub present_verses: usize,
    pub blob_len: u64,
    pub dirty: bool,
    pub mode: BlobMode,
}

struct CacheState {
    index: OffsetIndex,
    blob: TextBlob,
    dirty: bool,
}

pub struct VerseCache {
    location: PathBuf,
    versification: Arc<Versification>,
    title: String,
    sync_on_flush: bool,
    state: Mutex<CacheState>,
}

impl VerseCache {
    /// Opens the cache at `location` with default settings.
    ///
    /// `location` is a directory path or a `file://` URL. The directory is
    /// created if it does not exist.
    pub fn open(location: impl AsRef<Path>, versification: Arc<Versification>) -> Result<Self> {
        let config = CacheConfig {
            versification: versification.name().to_string(),
            ..CacheConfig::default()
        };
        Self::open_with_config(location, versification, &config)
    }

    /// Opens the cache, looking up `scheme` through `provider`.
    pub fn open_with_provider(
        location: impl AsRef<Path>,
        provider: &dyn VersificationProvider,
        scheme: &str,
    ) -> Result<Self> {
        let versification = provider.versification(scheme)?;
        Self::open(location, versification)
    }

    /// Opens the cache using the `cache.json` stored in its directory.
    /// Without one the defaults apply.
    pub fn open_configured(
        location: impl AsRef<Path>,
        provider: &dyn VersificationProvider,
    ) -> Result<Self> {
        let dir = resolve_location(location.as_ref())?;
        let config = CacheConfig::load(&dir)?;
        let versification = provider.versification(&config.versification)?;
        Self::open_with_config(dir, versification, &config)
    }

    pub fn open_with_config(
        location: impl AsRef<Path>,
        versification: Arc<Versification>,
        config: &CacheConfig,
    ) -> Result<Self> {
        let location = resolve_location(location.as_ref())?;
        if location.exists() && !location.is_dir() {
            return Err(CacheError::Config(format!(
                "{} exists and is not a directory",
                location.display()
            )));
        }
        fs::create_dir_all(&location)?;

        let blob = TextBlob::open(location.join(DATA_FILENAME), BlobMode::ReadOnly)
            .map_err(CacheError::StoreRead)?;
        let index = OffsetIndex::new(versification.total_verse_count());

        if config.versification != versification.name() {
            tracing::warn!(
                configured = %config.versification,
                using = versification.name(),
                "cache config names a different versification"
            );
        }
        tracing::debug!(
            location = %location.display(),
            versification = versification.name(),
            "opened verse cache"
        );

        Ok(Self {
            location,
            title: config.document_title().to_string(),
            versification,
            sync_on_flush: config.sync_on_flush,
            state: Mutex::new(CacheState {
                index,
                blob,
                dirty: false,
            }),
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn versification(&self) -> &Arc<Versification> {
        &self.versification
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// True when there are writes that `flush` has not made durable.
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    fn index_path(&self) -> PathBuf {
        self.location.join(INDEX_FILENAME)
    }

    /// Reads `xml.index` into memory. A missing index file yields an
    /// all-absent index. On failure the current index is left untouched.
    pub fn load(&self) -> Result<()> {
        let mut state = self.state.lock();
        let path = self.index_path();

        let mode = state.blob.mode();
        state
            .blob
            .reopen(mode)
            .map_err(|e| CacheError::CacheLoad {
                path: self.location.join(DATA_FILENAME),
                source: e.into(),
            })?;

        let total = self.versification.total_verse_count();
        let index = if path.exists() {
            OffsetIndex::load(&path, total, state.blob.len())
                .map_err(|source| CacheError::CacheLoad {
                    path: path.clone(),
                    source,
                })?
        } else {
            tracing::debug!(path = %path.display(), "no index file, starting empty");
            OffsetIndex::new(total)
        };

        if state.dirty {
            tracing::warn!(
                location = %self.location.display(),
                "load discarded unflushed writes"
            );
        }
        tracing::info!(
            location = %self.location.display(),
            present = index.present_count(),
            total,
            "loaded verse index"
        );
        state.index = index;
        state.dirty = false;
        Ok(())
    }

    /// Builds a document for every range of `passage`, one section per range.
    /// Verses with no recorded text are left out and listed in
    /// [`QueryResult::missing`].
    pub fn get_data(&self, passage: &Passage) -> Result<QueryResult> {
        let mut state = self.state.lock();
        let mut builder = DocumentBuilder::new(&self.versification, self.title.as_str());
        let mut missing = Vec::new();

        for range in passage.iter() {
            builder.section(range)?;
            for ordinal in range.ordinals() {
                match state.index.get(ordinal)? {
                    Some(offset) => {
                        let text = state.blob.read_at(offset).map_err(CacheError::StoreRead)?;
                        builder.verse(ordinal, text)?;
                    }
                    None => missing.push(ordinal),
                }
            }
        }

        let document = builder.build();
        tracing::debug!(
            entries = document.entry_count(),
            missing = missing.len(),
            "built document"
        );
        Ok(QueryResult { document, missing })
    }

    /// Text of a single verse.
    pub fn read_verse(&self, ordinal: Ordinal) -> Result<String> {
        let mut state = self.state.lock();
        let offset = state
            .index
            .get(ordinal)?
            .ok_or(CacheError::MissingVerse(ordinal))?;
        state.blob.read_at(offset).map_err(CacheError::StoreRead)
    }

    /// Appends the text of every entry of `doc` and points each entry's own
    /// verse at it. All references are checked before anything is written.
    pub fn set_document(&self, doc: &Document) -> Result<WriteReport> {
        let keyed = doc
            .entries()
            .map(|e| Ok((self.versification.ordinal_of(&e.verse)?, e.text.as_str())))
            .collect::<Result<Vec<(Ordinal, &str)>>>()?;

        let mut report = WriteReport::default();
        if keyed.is_empty() {
            return Ok(report);
        }

        let mut state = self.state.lock();
        if state.blob.mode() == BlobMode::ReadOnly {
            state
                .blob
                .reopen(BlobMode::ReadWrite)
                .map_err(CacheError::StoreWrite)?;
        }

        for (ordinal, text) in keyed {
            let offset = state.blob.append(text).map_err(CacheError::StoreWrite)?;
            state.index.set(ordinal, offset)?;
            state.dirty = true;
            report.recorded.push(ordinal);
            report.bytes_written += LENGTH_PREFIX + text.len() as u64;
        }

        tracing::debug!(
            verses = report.recorded.len(),
            bytes = report.bytes_written,
            "recorded document"
        );
        Ok(report)
    }

    /// Makes all writes durable: syncs the data file, then replaces
    /// `xml.index` in one rename.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();

        if self.sync_on_flush {
            state.blob.sync().map_err(CacheError::StoreWrite)?;
        }
        state
            .blob
            .reopen(BlobMode::ReadWrite)
            .map_err(CacheError::StoreWrite)?;

        state
            .index
            .persist(self.index_path(), self.sync_on_flush)
            .map_err(|e| CacheError::StoreWrite(StoreError::Io(e)))?;

        tracing::info!(
            location = %self.location.display(),
            present = state.index.present_count(),
            "flushed verse cache"
        );
        state.dirty = false;
        Ok(())
    }

    /// Decodes every record the index points at and walks the data file to
    /// account for unreachable bytes.
    pub fn check(&self) -> Result<CheckReport> {
        let mut state = self.state.lock();
        let state = &mut *state;
        let mut report = CheckReport::default();
        let mut live_offsets = BTreeSet::new();

        let present: Vec<(Ordinal, u64)> = state.index.iter_present().collect();
        for (ordinal, offset) in present {
            report.verses_checked += 1;
            match state.blob.read_record(offset) {
                Ok((_, next)) => {
                    if live_offsets.insert(offset) {
                        report.live_bytes += next - offset;
                    }
                }
                Err(e) => report.corrupt.push(CorruptVerse {
                    ordinal,
                    offset,
                    reason: e.to_string(),
                }),
            }
        }

        let mut offset = HEADER_LEN;
        while offset < state.blob.len() {
            match state.blob.read_record(offset) {
                Ok((_, next)) => {
                    report.record_count += 1;
                    offset = next;
                }
                Err(_) => {
                    report.truncated_at = Some(offset);
                    break;
                }
            }
        }

        let record_bytes = report.truncated_at.unwrap_or(state.blob.len()) - HEADER_LEN;
        report.garbage_bytes = record_bytes.saturating_sub(report.live_bytes);

        if !report.is_healthy() {
            tracing::warn!(
                corrupt = report.corrupt.len(),
                truncated_at = ?report.truncated_at,
                "verse cache check found problems"
            );
        }
        Ok(report)
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            versification: self.versification.name().to_string(),
            total_verses: self.versification.total_verse_count(),
            present_verses: state.index.present_count(),
            blob_len: state.blob.len(),
            dirty: state.dirty,
            mode: state.blob.mode(),
        }
    }
}

impl Drop for VerseCache {
    fn drop(&mut self) {
        if self.state.get_mut().dirty {
            tracing::warn!(
                location = %self.location.display(),
                "verse cache dropped with unflushed writes"
            );
        }
    }
}

/// Accepts a plain path or a `file://` URL. Any other URL scheme is rejected.
pub(crate) fn resolve_location(location: &Path) -> Result<PathBuf> {
    let Some(text) = location.to_str() else {
        return Ok(location.to_path_buf());
    };
    let Some((scheme, rest)) = text.split_once("://") else {
        return Ok(location.to_path_buf());
    };

    let looks_like_scheme = !scheme.is_empty()
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !looks_like_scheme {
        return Ok(location.to_path_buf());
    }

    if !scheme.eq_ignore_ascii_case("file") {
        return Err(CacheError::UnsupportedLocation(text.to_string()));
    }
    if rest.is_empty() {
        return Err(CacheError::UnsupportedLocation(text.to_string()));
    }
    // file://localhost/path and file:///path both name /path
    let path = rest.strip_prefix("localhost").unwrap_or(rest);
    if !path.starts_with('/') {
        return Err(CacheError::UnsupportedLocation(text.to_string()));
    }
    Ok(PathBuf::from(path))
}
