use crate::cache::{resolve_location, VerseCache};
use crate::commands::{CmdMessage, CmdResult};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::versification::VersificationProvider;
use std::path::Path;

/// Creates a cache directory with its config, an empty data file and an
/// all-absent index. An existing cache is left as it is.
pub fn run(
    dir: &Path,
    provider: &dyn VersificationProvider,
    versification: &str,
    title: Option<String>,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let dir = resolve_location(dir)?;

    if CacheConfig::exists_in(&dir) {
        let existing = CacheConfig::load(&dir)?;
        result.add_message(CmdMessage::warning(format!(
            "Cache at {} already exists ({})",
            dir.display(),
            existing.versification
        )));
        return Ok(result.with_config(existing));
    }

    let scheme = provider.versification(versification)?;
    let mut config = CacheConfig::new(scheme.name());
    config.title = title;

    let cache = VerseCache::open_with_config(&dir, scheme, &config)?;
    cache.flush()?;
    config.save(cache.location())?;

    result.add_message(CmdMessage::success(format!(
        "Initialized {} cache at {} ({} verses)",
        config.versification,
        cache.location().display(),
        cache.versification().total_verse_count()
    )));
    Ok(result.with_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::store::INDEX_FILENAME;
    use crate::test_utils::TestEnv;
    use std::fs;

    #[test]
    fn test_init_creates_cache_files() {
        let env = TestEnv::new();
        let result = run(
            &env.cache_dir(),
            &env.registry(),
            "Tiny",
            Some("Tiny Bible".to_string()),
        )
        .unwrap();

        let config = result.config.unwrap();
        assert_eq!(config.versification, "Tiny");
        assert_eq!(config.title.as_deref(), Some("Tiny Bible"));
        assert!(config.created_at.is_some());

        let index = fs::read_to_string(env.cache_dir().join(INDEX_FILENAME)).unwrap();
        assert_eq!(index, "0\n".repeat(9));
        assert_eq!(CacheConfig::load(env.cache_dir()).unwrap(), config);
    }

    #[test]
    fn test_init_twice_keeps_existing() {
        let env = TestEnv::new();
        let registry = env.registry();
        run(&env.cache_dir(), &registry, "Tiny", None).unwrap();
        let again = run(&env.cache_dir(), &registry, "KJV", None).unwrap();

        assert_eq!(again.config.unwrap().versification, "Tiny");
        assert!(again.messages[0].content.contains("already exists"));
    }

    #[test]
    fn test_init_unknown_versification() {
        let env = TestEnv::new();
        let err = run(&env.cache_dir(), &env.registry(), "Nope", None).unwrap_err();
        assert!(matches!(err, CacheError::UnknownVersification(_)));
        assert!(!CacheConfig::exists_in(env.cache_dir()));
    }
}
