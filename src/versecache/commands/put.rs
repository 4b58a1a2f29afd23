use crate::builder::DocumentBuilder;
use crate::cache::VerseCache;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

/// Records the text of one verse and flushes.
pub fn run(cache: &VerseCache, reference: &str, text: &str) -> Result<CmdResult> {
    let versification = cache.versification();
    let verse = versification.parse_ref(reference)?;
    let document = DocumentBuilder::from_verses(versification, cache.title(), [(verse, text)])?;

    let report = cache.set_document(&document)?;
    cache.flush()?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Recorded {}",
        versification.format_ref(&verse)
    )));
    Ok(result.with_written(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_put_records_and_flushes() {
        let env = TestEnv::new();
        let cache = env.open();
        let result = run(&cache, "Beta 1:2", "seven").unwrap();

        assert_eq!(result.written.unwrap().recorded, vec![7]);
        assert_eq!(result.messages[0].content, "Recorded B 1:2");
        assert!(!cache.is_dirty());

        let reopened = env.open();
        reopened.load().unwrap();
        assert_eq!(reopened.read_verse(7).unwrap(), "seven");
    }

    #[test]
    fn test_put_rejects_ranges() {
        let env = TestEnv::new();
        let cache = env.open();
        assert!(matches!(
            run(&cache, "A 1", "chapter"),
            Err(CacheError::InvalidReference(_))
        ));
    }
}
