use crate::cache::VerseCache;
use crate::commands::{list_refs, CmdMessage, CmdResult};
use crate::error::Result;

pub fn run(cache: &VerseCache) -> Result<CmdResult> {
    let report = cache.check()?;
    let mut result = CmdResult::default();

    if report.is_healthy() {
        result.add_message(CmdMessage::success(format!(
            "No problems found in {} verse(s).",
            report.verses_checked
        )));
    } else {
        result.add_message(CmdMessage::error("Problems found:"));
        if !report.corrupt.is_empty() {
            let versification = cache.versification();
            let refs: Vec<String> = report
                .corrupt
                .iter()
                .map(|c| match versification.verse_at(c.ordinal) {
                    Ok(v) => versification.format_ref(&v),
                    Err(_) => format!("#{}", c.ordinal),
                })
                .collect();
            result.add_message(CmdMessage::warning(format!(
                "  - {} verse(s) point at unreadable text: {}",
                refs.len(),
                list_refs(&refs)
            )));
        }
        if let Some(offset) = report.truncated_at {
            result.add_message(CmdMessage::warning(format!(
                "  - Data file is unreadable from byte {}",
                offset
            )));
        }
    }

    if report.garbage_bytes > 0 {
        result.add_message(CmdMessage::info(format!(
            "{} record(s), {} byte(s) no longer referenced.",
            report.record_count, report.garbage_bytes
        )));
    }
    Ok(result.with_check(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_check_healthy_cache() {
        let env = TestEnv::new();
        let cache = env.open();
        cache.set_document(&env.document(&[(1, "one")])).unwrap();

        let result = run(&cache).unwrap();
        assert!(result.check.as_ref().unwrap().is_healthy());
        assert!(result.has_level(MessageLevel::Success));
        assert!(!result.has_level(MessageLevel::Info));
    }

    #[test]
    fn test_check_mentions_garbage() {
        let env = TestEnv::new();
        let cache = env.open();
        cache.set_document(&env.document(&[(1, "one")])).unwrap();
        cache.set_document(&env.document(&[(1, "uno")])).unwrap();

        let result = run(&cache).unwrap();
        assert_eq!(result.check.as_ref().unwrap().garbage_bytes, 7);
        assert!(result.has_level(MessageLevel::Info));
    }
}
