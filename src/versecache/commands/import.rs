use crate::builder::DocumentBuilder;
use crate::cache::VerseCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{CacheError, Result};
use crate::versification::VerseRef;
use std::fs;
use std::path::Path;

/// Imports a text file of `REFERENCE<TAB>TEXT` lines. Blank lines and lines
/// starting with `#` are skipped. Nothing is written unless every line
/// parses.
pub fn run(cache: &VerseCache, path: &Path) -> Result<CmdResult> {
    let content = fs::read_to_string(path).map_err(CacheError::Io)?;
    let verses = parse_lines(cache, &content)?;

    let mut result = CmdResult::default();
    if verses.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "No verses found in {}",
            path.display()
        )));
        return Ok(result);
    }

    let line_count = verses.len();
    let document = DocumentBuilder::from_verses(cache.versification(), cache.title(), verses)?;
    let report = cache.set_document(&document)?;
    cache.flush()?;

    if report.recorded.len() < line_count {
        result.add_message(CmdMessage::info(format!(
            "{} line(s) repeated an earlier verse; the last text was kept",
            line_count - report.recorded.len()
        )));
    }
    result.add_message(CmdMessage::success(format!(
        "Imported {} verse(s) from {}",
        report.recorded.len(),
        path.display()
    )));
    Ok(result.with_written(report))
}

fn parse_lines(cache: &VerseCache, content: &str) -> Result<Vec<(VerseRef, String)>> {
    let versification = cache.versification();
    let mut verses = Vec::new();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let (reference, text) = line.split_once('\t').ok_or_else(|| {
            CacheError::InvalidReference(format!("line {}: expected REFERENCE<TAB>TEXT", i + 1))
        })?;
        let verse = versification
            .parse_ref(reference)
            .map_err(|e| CacheError::InvalidReference(format!("line {}: {}", i + 1, e)))?;
        verses.push((verse, text.to_string()));
    }
    Ok(verses)
}
