//! Conversion between ordinals/ranges and [`Document`] trees.
//!
//! The builder is stateless apart from the document under construction: the
//! cache uses it to shape query results, and writers use
//! [`DocumentBuilder::from_verses`] to turn loose `(verse, text)` pairs into a
//! document that [`crate::cache::VerseCache::set_document`] accepts.

use crate::document::{Document, Section, VerseEntry};
use crate::error::Result;
use crate::passage::VerseRange;
use crate::versification::{Ordinal, VerseRef, Versification};

pub struct DocumentBuilder<'a> {
    versification: &'a Versification,
    document: Document,
    current: Option<Section>,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(versification: &'a Versification, title: impl Into<String>) -> Self {
        Self {
            versification,
            document: Document::new(title),
            current: None,
        }
    }

    /// Starts a new section for `range`, closing the previous one.
    pub fn section(&mut self, range: &VerseRange) -> Result<&mut Self> {
        let title = range.display(self.versification)?;
        self.close_section();
        self.current = Some(Section::new(title));
        Ok(self)
    }

    /// Adds a verse to the current section, opening a single-verse section if
    /// none is open.
    pub fn verse(&mut self, ordinal: Ordinal, text: impl Into<String>) -> Result<&mut Self> {
        let verse = self.versification.verse_at(ordinal)?;
        if self.current.is_none() {
            self.section(&VerseRange::single(ordinal))?;
        }
        if let Some(section) = self.current.as_mut() {
            section.entries.push(VerseEntry::new(verse, text));
        }
        Ok(self)
    }

    /// Closes the open section. Sections without entries are dropped.
    fn close_section(&mut self) {
        if let Some(section) = self.current.take() {
            if !section.entries.is_empty() {
                self.document.sections.push(section);
            }
        }
    }

    pub fn build(mut self) -> Document {
        self.close_section();
        self.document
    }

    /// Builds a document from `(verse, text)` pairs, sorted by ordinal, with
    /// one section per run of consecutive ordinals. A verse given twice keeps
    /// its last text.
    pub fn from_verses<I, S>(
        versification: &'a Versification,
        title: impl Into<String>,
        verses: I,
    ) -> Result<Document>
    where
        I: IntoIterator<Item = (VerseRef, S)>,
        S: Into<String>,
    {
        let mut keyed = verses
            .into_iter()
            .map(|(verse, text)| Ok((versification.ordinal_of(&verse)?, text.into())))
            .collect::<Result<Vec<(Ordinal, String)>>>()?;
        // Stable sort keeps input order among duplicates; the last one wins below
        keyed.sort_by_key(|(ordinal, _)| *ordinal);
        keyed.reverse();
        keyed.dedup_by_key(|(ordinal, _)| *ordinal);
        keyed.reverse();

        let mut builder = Self::new(versification, title);
        for run in consecutive_runs(&keyed) {
            let first = run[0].0;
            let last = run[run.len() - 1].0;
            builder.section(&VerseRange::new(first, last))?;
            for (ordinal, text) in run {
                builder.verse(*ordinal, text.clone())?;
            }
        }
        Ok(builder.build())
    }
}

fn consecutive_runs(keyed: &[(Ordinal, String)]) -> Vec<&[(Ordinal, String)]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=keyed.len() {
        if i == keyed.len() || keyed[i].0 != keyed[i - 1].0 + 1 {
            if start < i {
                runs.push(&keyed[start..i]);
            }
            start = i;
        }
    }
    runs
}
