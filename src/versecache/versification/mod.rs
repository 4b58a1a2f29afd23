//! # Versification
//!
//! A versification (numbering scheme) is a named, total ordering of canonical
//! verse references into consecutive integers, the *ordinals*. Ordinals are
//! 1-based and dense: `Gen 1:1` is ordinal 1 and the last verse of the last
//! book is ordinal [`Versification::total_verse_count`].
//!
//! The verse cache never defines a numbering scheme itself. It receives a
//! [`Versification`] (or a [`VersificationProvider`] to look one up by name)
//! when a cache directory is opened, and relies on the ordinals staying
//! stable for the lifetime of the handle.
//!
//! ## Reference syntax
//!
//! References are parsed and displayed using OSIS book abbreviations or full
//! book names (case-insensitive, spaces ignored):
//!
//! ```text
//! Gen 1:1          a single verse
//! Genesis 1        a whole chapter
//! 1 John           a whole book
//! ```
//!
//! Ranges built on top of these live in [`crate::passage`].

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod kjv;
pub mod registry;

pub use registry::{VersificationProvider, Versifications, DEFAULT_VERSIFICATION};

/// 1-based position of a verse within a versification.
pub type Ordinal = u32;

/// One book of a versification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    /// OSIS abbreviation, e.g. `Gen`
    pub osis: String,
    /// Full name, e.g. `Genesis`
    pub name: String,
    /// Number of verses in each chapter, in chapter order
    pub chapters: Vec<u16>,
}

impl BookInfo {
    pub fn new(osis: impl Into<String>, name: impl Into<String>, chapters: Vec<u16>) -> Self {
        Self {
            osis: osis.into(),
            name: name.into(),
            chapters,
        }
    }

    pub fn verse_count(&self) -> u32 {
        self.chapters.iter().map(|&v| u32::from(v)).sum()
    }
}

/// A verse reference: book number (1-based position in the versification),
/// chapter and verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseRef {
    pub book: u16,
    pub chapter: u16,
    pub verse: u16,
}

impl VerseRef {
    pub fn new(book: u16, chapter: u16, verse: u16) -> Self {
        Self {
            book,
            chapter,
            verse,
        }
    }
}

/// A parsed reference before it is widened to concrete verses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefSpec {
    Book(u16),
    Chapter(u16, u16),
    Verse(VerseRef),
}

#[derive(Debug, Clone)]
pub struct Versification {
    name: String,
    books: Vec<BookInfo>,
    /// Ordinal of the verse before each book's first verse
    book_starts: Vec<Ordinal>,
    /// Per book, ordinal of the verse before each chapter's first verse
    chapter_starts: Vec<Vec<Ordinal>>,
    total: Ordinal,
}

impl Versification {
    /// Creates a versification from its books, validating that every book has
    /// at least one chapter and every chapter at least one verse.
    pub fn new(name: impl Into<String>, books: Vec<BookInfo>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CacheError::Config(
                "Versification name cannot be empty".to_string(),
            ));
        }
        if books.is_empty() {
            return Err(CacheError::Config(format!(
                "Versification {} has no books",
                name
            )));
        }
        if books.len() > usize::from(u16::MAX) {
            return Err(CacheError::Config(format!(
                "Versification {} has too many books",
                name
            )));
        }
        for book in &books {
            if book.chapters.is_empty() {
                return Err(CacheError::Config(format!(
                    "Book {} in {} has no chapters",
                    book.osis, name
                )));
            }
            if let Some(pos) = book.chapters.iter().position(|&v| v == 0) {
                return Err(CacheError::Config(format!(
                    "{} {} in {} has no verses",
                    book.osis,
                    pos + 1,
                    name
                )));
            }
        }
        Ok(Self::build(name, books))
    }

    /// Computes the ordinal tables. Callers guarantee the books are valid.
    pub(crate) fn build(name: String, books: Vec<BookInfo>) -> Self {
        let mut book_starts = Vec::with_capacity(books.len());
        let mut chapter_starts = Vec::with_capacity(books.len());
        let mut running: Ordinal = 0;

        for book in &books {
            book_starts.push(running);
            let mut starts = Vec::with_capacity(book.chapters.len());
            for &verses in &book.chapters {
                starts.push(running);
                running += Ordinal::from(verses);
            }
            chapter_starts.push(starts);
        }

        Self {
            name,
            books,
            book_starts,
            chapter_starts,
            total: running,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn books(&self) -> &[BookInfo] {
        &self.books
    }

    /// Book info by 1-based book number.
    pub fn book(&self, book: u16) -> Option<&BookInfo> {
        usize::from(book)
            .checked_sub(1)
            .and_then(|i| self.books.get(i))
    }

    pub fn total_verse_count(&self) -> Ordinal {
        self.total
    }

    pub fn contains(&self, ordinal: Ordinal) -> bool {
        ordinal >= 1 && ordinal <= self.total
    }

    /// Number of verses in a chapter, if the chapter exists.
    pub fn chapter_len(&self, book: u16, chapter: u16) -> Option<u16> {
        let info = self.book(book)?;
        usize::from(chapter)
            .checked_sub(1)
            .and_then(|i| info.chapters.get(i))
            .copied()
    }

    pub fn ordinal_of(&self, verse: &VerseRef) -> Result<Ordinal> {
        let len = self
            .chapter_len(verse.book, verse.chapter)
            .ok_or_else(|| self.invalid(verse))?;
        if verse.verse == 0 || verse.verse > len {
            return Err(self.invalid(verse));
        }
        let start =
            self.chapter_starts[usize::from(verse.book) - 1][usize::from(verse.chapter) - 1];
        Ok(start + Ordinal::from(verse.verse))
    }

    pub fn verse_at(&self, ordinal: Ordinal) -> Result<VerseRef> {
        if !self.contains(ordinal) {
            return Err(CacheError::IndexOutOfRange {
                ordinal,
                max: self.total,
            });
        }
        // Last book/chapter whose start lies before the ordinal
        let book_idx = self.book_starts.partition_point(|&s| s < ordinal) - 1;
        let starts = &self.chapter_starts[book_idx];
        let chapter_idx = starts.partition_point(|&s| s < ordinal) - 1;
        let verse = ordinal - starts[chapter_idx];

        Ok(VerseRef::new(
            (book_idx + 1) as u16,
            (chapter_idx + 1) as u16,
            verse as u16,
        ))
    }

    /// Finds a book by OSIS abbreviation or full name.
    pub fn find_book(&self, name: &str) -> Option<u16> {
        let wanted = normalize_book(name);
        if wanted.is_empty() {
            return None;
        }
        self.books
            .iter()
            .position(|b| normalize_book(&b.osis) == wanted || normalize_book(&b.name) == wanted)
            .map(|i| (i + 1) as u16)
    }

    /// Formats a verse as `Gen 1:1`.
    pub fn format_ref(&self, verse: &VerseRef) -> String {
        match self.book(verse.book) {
            Some(info) => format!("{} {}:{}", info.osis, verse.chapter, verse.verse),
            None => format!("#{} {}:{}", verse.book, verse.chapter, verse.verse),
        }
    }

    /// Parses a single verse reference such as `Gen 1:1` or `1 John 4:8`.
    pub fn parse_ref(&self, input: &str) -> Result<VerseRef> {
        match self.parse_spec(input)? {
            RefSpec::Verse(verse) => Ok(verse),
            _ => Err(CacheError::InvalidReference(format!(
                "{} (expected book chapter:verse)",
                input.trim()
            ))),
        }
    }

    pub(crate) fn parse_spec(&self, input: &str) -> Result<RefSpec> {
        let input = input.trim();
        let (book_part, numbers) = split_book_and_numbers(input);

        let book = self
            .find_book(book_part)
            .ok_or_else(|| CacheError::InvalidReference(input.to_string()))?;

        let Some(numbers) = numbers else {
            return Ok(RefSpec::Book(book));
        };

        let spec = match numbers.split_once(':') {
            Some((c, v)) => RefSpec::Verse(VerseRef::new(
                book,
                parse_number(c, input)?,
                parse_number(v, input)?,
            )),
            None => RefSpec::Chapter(book, parse_number(numbers, input)?),
        };
        self.check_spec(spec, input)?;
        Ok(spec)
    }

    /// First and last verse covered by a spec.
    pub(crate) fn spec_bounds(&self, spec: RefSpec) -> Result<(VerseRef, VerseRef)> {
        let invalid = || CacheError::InvalidReference(format!("{:?}", spec));
        match spec {
            RefSpec::Verse(v) => Ok((v, v)),
            RefSpec::Chapter(book, chapter) => {
                let len = self.chapter_len(book, chapter).ok_or_else(invalid)?;
                Ok((
                    VerseRef::new(book, chapter, 1),
                    VerseRef::new(book, chapter, len),
                ))
            }
            RefSpec::Book(book) => {
                let info = self.book(book).ok_or_else(invalid)?;
                let last_chapter = info.chapters.len() as u16;
                let len = info.chapters[info.chapters.len() - 1];
                Ok((
                    VerseRef::new(book, 1, 1),
                    VerseRef::new(book, last_chapter, len),
                ))
            }
        }
    }

    fn check_spec(&self, spec: RefSpec, input: &str) -> Result<()> {
        let ok = match spec {
            RefSpec::Book(book) => self.book(book).is_some(),
            RefSpec::Chapter(book, chapter) => self.chapter_len(book, chapter).is_some(),
            RefSpec::Verse(v) => self.ordinal_of(&v).is_ok(),
        };
        if ok {
            Ok(())
        } else {
            Err(CacheError::InvalidReference(format!(
                "{} (not in {})",
                input, self.name
            )))
        }
    }

    fn invalid(&self, verse: &VerseRef) -> CacheError {
        CacheError::InvalidReference(format!(
            "{} (not in {})",
            self.format_ref(verse),
            self.name
        ))
    }
}

impl fmt::Display for Versification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} books, {} verses)",
            self.name,
            self.books.len(),
            self.total
        )
    }
}

fn normalize_book(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Splits `1 John 4:8` into `("1 John", Some("4:8"))` and `1 John` into
/// `("1 John", None)`.
fn split_book_and_numbers(input: &str) -> (&str, Option<&str>) {
    if let Some((head, tail)) = input.rsplit_once(char::is_whitespace) {
        let is_numbers = !tail.is_empty()
            && tail.starts_with(|c: char| c.is_ascii_digit())
            && tail.chars().all(|c| c.is_ascii_digit() || c == ':');
        if is_numbers && !head.trim().is_empty() {
            return (head.trim(), Some(tail));
        }
    }
    (input, None)
}

fn parse_number(s: &str, input: &str) -> Result<u16> {
    s.parse()
        .map_err(|_| CacheError::InvalidReference(input.to_string()))
}
