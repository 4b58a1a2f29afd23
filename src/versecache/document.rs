//! The structured document exchanged with the cache.
//!
//! A [`Document`] is a two-level tree: one [`Section`] per verse range, each
//! holding one [`VerseEntry`] per verse with that verse's plain text. It is
//! built fresh for every query and never persisted by the cache itself.

use crate::versification::VerseRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Display form of the range this section covers, e.g. `Gen 1:1-3`
    pub title: String,
    pub entries: Vec<VerseEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseEntry {
    pub verse: VerseRef,
    pub text: String,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sections: Vec::new(),
        }
    }

    /// Every verse entry in document order.
    pub fn entries(&self) -> impl Iterator<Item = &VerseEntry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Plain text of every verse, one per line.
    pub fn plain_text(&self) -> String {
        self.entries()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }
}

impl VerseEntry {
    pub fn new(verse: VerseRef, text: impl Into<String>) -> Self {
        Self {
            verse,
            text: text.into(),
        }
    }
}
