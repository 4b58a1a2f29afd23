//! Verse ranges and passages.
//!
//! A [`VerseRange`] is an inclusive span of ordinals; a [`Passage`] is an
//! ordered list of ranges, one document section each. Ranges hold raw
//! ordinals and are only checked against a versification when they are used,
//! so an out-of-range request surfaces as `IndexOutOfRange` at the cache.
//!
//! Range syntax accepted by [`Passage::parse`]:
//!
//! ```text
//! Gen 1:1-3              verses of one chapter
//! Gen 1:31-2:3           across chapters
//! Gen 50:26-Exod 1:2     across books
//! Gen 1-2                whole chapters
//! Gen 1:1-3; Exod 2:4    several ranges, separated by ';' or ','
//! Gen 1:1,3-5            after ',', bare numbers continue the previous range
//! ```

use crate::error::{CacheError, Result};
use crate::versification::{Ordinal, RefSpec, VerseRef, Versification};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerseRange {
    start: Ordinal,
    end: Ordinal,
}

impl VerseRange {
    /// Range between two ordinals, in either order.
    pub fn new(a: Ordinal, b: Ordinal) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(ordinal: Ordinal) -> Self {
        Self::new(ordinal, ordinal)
    }

    pub fn between(versification: &Versification, from: &VerseRef, to: &VerseRef) -> Result<Self> {
        Ok(Self::new(
            versification.ordinal_of(from)?,
            versification.ordinal_of(to)?,
        ))
    }

    pub fn start(&self) -> Ordinal {
        self.start
    }

    pub fn end(&self) -> Ordinal {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn ordinals(&self) -> RangeInclusive<Ordinal> {
        self.start..=self.end
    }

    /// Parses one range such as `Gen 1:1-3`.
    pub fn parse(versification: &Versification, input: &str) -> Result<Self> {
        parse_range(versification, input, None).map(|(range, _)| range)
    }

    /// Display form: `Gen 1:1`, `Gen 1:1-3`, `Gen 1:31-2:3` or
    /// `Gen 50:26-Exod 1:2`.
    pub fn display(&self, versification: &Versification) -> Result<String> {
        let first = versification.verse_at(self.start)?;
        if self.start == self.end {
            return Ok(versification.format_ref(&first));
        }
        let last = versification.verse_at(self.end)?;
        let head = versification.format_ref(&first);

        let text = if first.book != last.book {
            format!("{}-{}", head, versification.format_ref(&last))
        } else if first.chapter != last.chapter {
            format!("{}-{}:{}", head, last.chapter, last.verse)
        } else {
            format!("{}-{}", head, last.verse)
        };
        Ok(text)
    }
}

/// Parses one range. With a `context` (the end of the previous range), a
/// start without a book name is read relative to it. Returns the range and
/// the spec its end was taken from.
fn parse_range(
    versification: &Versification,
    input: &str,
    context: Option<RefSpec>,
) -> Result<(VerseRange, RefSpec)> {
    let input = input.trim();
    let (head, tail) = match input.split_once('-') {
        Some((head, tail)) => (head.trim(), Some(tail.trim())),
        None => (input, None),
    };

    let start_spec = match context {
        Some(context) if !names_book(head) => resolve_end(versification, context, head)
            .map_err(|_| CacheError::InvalidReference(input.to_string()))?,
        _ => versification.parse_spec(head)?,
    };
    let (first, mut last) = versification.spec_bounds(start_spec)?;
    let mut end_spec = start_spec;

    if let Some(tail) = tail {
        end_spec = resolve_end(versification, start_spec, tail)
            .map_err(|_| CacheError::InvalidReference(input.to_string()))?;
        last = versification.spec_bounds(end_spec)?.1;
    }

    let start = versification.ordinal_of(&first)?;
    let end = versification.ordinal_of(&last)?;
    if end < start {
        return Err(CacheError::InvalidReference(format!(
            "{} (range ends before it starts)",
            input
        )));
    }
    Ok((VerseRange { start, end }, end_spec))
}

/// `1Sam 1:1` names a book, `1:1` and `3` do not.
fn names_book(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// The end of a range may name a book, or give just a chapter or verse that
/// is read relative to the start.
fn resolve_end(versification: &Versification, start: RefSpec, tail: &str) -> Result<RefSpec> {
    if names_book(tail) {
        return versification.parse_spec(tail);
    }

    let book = match start {
        RefSpec::Verse(v) => v.book,
        RefSpec::Chapter(book, _) | RefSpec::Book(book) => book,
    };
    let number = |s: &str| -> Result<u16> {
        s.trim()
            .parse()
            .map_err(|_| CacheError::InvalidReference(tail.to_string()))
    };

    let spec = match (tail.split_once(':'), start) {
        (Some((c, v)), _) => RefSpec::Verse(VerseRef::new(book, number(c)?, number(v)?)),
        (None, RefSpec::Verse(v)) => RefSpec::Verse(VerseRef::new(book, v.chapter, number(tail)?)),
        (None, _) => RefSpec::Chapter(book, number(tail)?),
    };
    // Validate the end against the versification
    versification.spec_bounds(spec)?;
    if let RefSpec::Verse(v) = spec {
        versification.ordinal_of(&v)?;
    }
    Ok(spec)
}

/// An ordered list of verse ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passage {
    ranges: Vec<VerseRange>,
}

impl Passage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ranges(ranges: impl IntoIterator<Item = VerseRange>) -> Self {
        Self {
            ranges: ranges.into_iter().collect(),
        }
    }

    /// Parses ranges separated by `;` or `,`. After a `,` a range without a
    /// book name continues from the previous one, so `Gen 1:1,3` is
    /// `Gen 1:1; Gen 1:3`.
    pub fn parse(versification: &Versification, input: &str) -> Result<Self> {
        let mut ranges = Vec::new();
        for group in input.split(';') {
            let mut context = None;
            for part in group.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let (range, end) = parse_range(versification, part, context)?;
                ranges.push(range);
                context = Some(end);
            }
        }

        if ranges.is_empty() {
            return Err(CacheError::InvalidReference(format!(
                "'{}' names no verses",
                input
            )));
        }
        Ok(Self { ranges })
    }

    pub fn push(&mut self, range: VerseRange) {
        self.ranges.push(range);
    }

    pub fn ranges(&self) -> &[VerseRange] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn verse_count(&self) -> usize {
        self.ranges.iter().map(VerseRange::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VerseRange> {
        self.ranges.iter()
    }
}

impl From<VerseRange> for Passage {
    fn from(range: VerseRange) -> Self {
        Self {
            ranges: vec![range],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tiny_versification;
    use crate::versification::kjv::kjv;

    #[test]
    fn test_new_orders_endpoints() {
        let range = VerseRange::new(7, 3);
        assert_eq!(range.start(), 3);
        assert_eq!(range.end(), 7);
        assert_eq!(range.len(), 5);
        assert_eq!(range.ordinals().collect::<Vec<_>>(), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_parse_single_verse() {
        let v = tiny_versification();
        assert_eq!(VerseRange::parse(&v, "Alpha 1:2").unwrap(), VerseRange::single(2));
    }

    #[test]
    fn test_parse_verse_span() {
        let v = tiny_versification();
        assert_eq!(VerseRange::parse(&v, "A 1:1-3").unwrap(), VerseRange::new(1, 3));
        // Across chapters: A 1:3 is 3, A 2:2 is 5
        assert_eq!(VerseRange::parse(&v, "A 1:3-2:2").unwrap(), VerseRange::new(3, 5));
        // Across books
        assert_eq!(VerseRange::parse(&v, "A 2:2-B 1:2").unwrap(), VerseRange::new(5, 7));
    }

    #[test]
    fn test_parse_chapters_and_books() {
        let v = tiny_versification();
        assert_eq!(VerseRange::parse(&v, "A 2").unwrap(), VerseRange::new(4, 5));
        assert_eq!(VerseRange::parse(&v, "A 1-2").unwrap(), VerseRange::new(1, 5));
        assert_eq!(VerseRange::parse(&v, "Beta").unwrap(), VerseRange::new(6, 9));
    }

    #[test]
    fn test_parse_rejects_bad_ranges() {
        let v = tiny_versification();
        assert!(VerseRange::parse(&v, "A 1:3-1").is_err());
        assert!(VerseRange::parse(&v, "A 1:1-9").is_err());
        assert!(VerseRange::parse(&v, "A 1:1-Q 1:1").is_err());
        assert!(VerseRange::parse(&v, "A 1:1-x").is_err());
    }

    #[test]
    fn test_display_forms() {
        let v = kjv();
        let genesis = |c, vs| v.ordinal_of(&VerseRef::new(1, c, vs)).unwrap();

        assert_eq!(VerseRange::single(1).display(&v).unwrap(), "Gen 1:1");
        assert_eq!(VerseRange::new(1, 3).display(&v).unwrap(), "Gen 1:1-3");
        assert_eq!(
            VerseRange::new(genesis(1, 31), genesis(2, 3)).display(&v).unwrap(),
            "Gen 1:31-2:3"
        );
        assert_eq!(
            VerseRange::new(1533, 1535).display(&v).unwrap(),
            "Gen 50:26-Exod 1:2"
        );
    }

    #[test]
    fn test_display_parses_back() {
        let v = kjv();
        for text in [
            "Gen 1:1",
            "Ps 119:1-176",
            "Gen 1:31-2:3",
            "Mal 4:6-Matt 1:1",
            "Ruth 4:22-1Sam 1:1",
            "2Kgs 25:30-1Chr 1:1",
        ] {
            let range = VerseRange::parse(&v, text).unwrap();
            assert_eq!(range.display(&v).unwrap(), text);
        }
    }

    #[test]
    fn test_parse_end_in_numbered_book() {
        let v = kjv();
        let ruth_end = v.ordinal_of(&VerseRef::new(8, 4, 22)).unwrap();
        let expected = VerseRange::new(ruth_end, ruth_end + 1);
        assert_eq!(VerseRange::parse(&v, "Ruth 4:22-1Sam 1:1").unwrap(), expected);
        assert_eq!(
            VerseRange::parse(&v, "Ruth 4:22-1 Samuel 1:1").unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_comma_continuation() {
        let v = tiny_versification();
        let passage = Passage::parse(&v, "A 1:1,3").unwrap();
        assert_eq!(
            passage.ranges(),
            &[VerseRange::single(1), VerseRange::single(3)]
        );

        // Chapter and chapter:verse continuations
        let passage = Passage::parse(&v, "A 1,2; A 1:2,2:1-2").unwrap();
        assert_eq!(
            passage.ranges(),
            &[
                VerseRange::new(1, 3),
                VerseRange::new(4, 5),
                VerseRange::single(2),
                VerseRange::new(4, 5)
            ]
        );

        // ';' starts afresh, so a bare number needs a book
        assert!(Passage::parse(&v, "A 1:1; 3").is_err());
        assert!(Passage::parse(&v, "A 1:1,4").is_err());
    }

    #[test]
    fn test_display_out_of_range() {
        let v = tiny_versification();
        assert!(matches!(
            VerseRange::new(9, 10).display(&v),
            Err(CacheError::IndexOutOfRange { ordinal: 10, .. })
        ));
    }

    #[test]
    fn test_parse_passage() {
        let v = tiny_versification();
        let passage = Passage::parse(&v, "A 1:1-2; B 1:4, A 2:1").unwrap();
        assert_eq!(
            passage.ranges(),
            &[
                VerseRange::new(1, 2),
                VerseRange::single(9),
                VerseRange::single(4)
            ]
        );
        assert_eq!(passage.verse_count(), 4);
    }

    #[test]
    fn test_parse_empty_passage() {
        let v = tiny_versification();
        assert!(Passage::parse(&v, " ; ").is_err());
    }
}
