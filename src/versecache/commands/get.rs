use crate::cache::VerseCache;
use crate::commands::{list_refs, CmdMessage, CmdResult};
use crate::error::Result;
use crate::passage::Passage;

/// Looks up one or more passages. Each argument may itself hold several
/// ranges separated by `;`.
pub fn run<I: AsRef<str>>(cache: &VerseCache, passages: &[I]) -> Result<CmdResult> {
    let versification = cache.versification();
    let mut passage = Passage::new();
    for input in passages {
        for range in Passage::parse(versification, input.as_ref())?.iter() {
            passage.push(*range);
        }
    }

    let query = cache.get_data(&passage)?;
    let missing = query
        .missing
        .iter()
        .map(|&ordinal| {
            versification
                .verse_at(ordinal)
                .map(|v| versification.format_ref(&v))
        })
        .collect::<Result<Vec<String>>>()?;

    let mut result = CmdResult::default();
    if query.document.is_empty() {
        result.add_message(CmdMessage::warning("No text recorded for this passage."));
    } else if !missing.is_empty() {
        result.add_message(CmdMessage::warning(format!(
            "{} verse(s) not in cache: {}",
            missing.len(),
            list_refs(&missing)
        )));
    }
    result.missing = missing;
    Ok(result.with_document(query.document))
}
