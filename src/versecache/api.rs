//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for the CLI (or any other client).
//!
//! It:
//! - **Opens** the cache directory with the settings in its `cache.json`
//! - **Dispatches** to the matching command function
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and no formatting.
//!
//! ## Generic Over VersificationProvider
//!
//! `CacheApi<P: VersificationProvider>` takes the registry that resolves the
//! scheme named in `cache.json`:
//! - Production: `CacheApi<Versifications>` with the built-in schemes
//! - Testing: a registry holding a small custom scheme

use crate::cache::{resolve_location, VerseCache};
use crate::commands;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::versification::{VersificationProvider, Versifications};
use std::path::{Path, PathBuf};

pub struct CacheApi<P: VersificationProvider = Versifications> {
    dir: PathBuf,
    provider: P,
}

impl<P: VersificationProvider> CacheApi<P> {
    pub fn new(dir: impl Into<PathBuf>, provider: P) -> Self {
        Self {
            dir: dir.into(),
            provider,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn init(&self, versification: &str, title: Option<String>) -> Result<commands::CmdResult> {
        commands::init::run(&self.dir, &self.provider, versification, title)
    }

    pub fn put(&self, reference: &str, text: &str) -> Result<commands::CmdResult> {
        let cache = self.open()?;
        commands::put::run(&cache, reference, text)
    }

    pub fn import(&self, path: &Path) -> Result<commands::CmdResult> {
        let cache = self.open()?;
        commands::import::run(&cache, path)
    }

    pub fn get<I: AsRef<str>>(&self, passages: &[I]) -> Result<commands::CmdResult> {
        let cache = self.open()?;
        commands::get::run(&cache, passages)
    }

    pub fn check(&self) -> Result<commands::CmdResult> {
        let cache = self.open()?;
        commands::check::run(&cache)
    }

    pub fn info(&self) -> Result<commands::CmdResult> {
        let cache = self.open()?;
        let config = CacheConfig::load(cache.location())?;
        commands::info::run(&cache, config)
    }

    /// Opens and loads an initialized cache.
    fn open(&self) -> Result<VerseCache> {
        let dir = resolve_location(&self.dir)?;
        if !CacheConfig::exists_in(&dir) {
            return Err(CacheError::Config(format!(
                "No cache at {}; run `versecache init` first",
                dir.display()
            )));
        }
        let cache = VerseCache::open_configured(&dir, &self.provider)?;
        cache.load()?;
        Ok(cache)
    }
}

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn api(env: &TestEnv) -> CacheApi {
        CacheApi::new(env.cache_dir(), env.registry())
    }

    #[test]
    fn test_commands_need_init() {
        let env = TestEnv::new();
        let api = api(&env);
        assert!(matches!(api.get(&["A 1:1"]), Err(CacheError::Config(_))));
        assert!(!env.cache_dir().exists());
    }

    #[test]
    fn test_put_then_get() {
        let env = TestEnv::new();
        let api = api(&env);
        api.init("Tiny", None).unwrap();
        api.put("A 1:1", "one").unwrap();

        let result = api.get(&["A 1:1"]).unwrap();
        assert_eq!(result.document.unwrap().plain_text(), "one");
    }

    #[test]
    fn test_info_returns_config() {
        let env = TestEnv::new();
        let api = api(&env);
        api.init("Tiny", Some("Tiny Bible".to_string())).unwrap();

        let result = api.info().unwrap();
        assert_eq!(result.config.unwrap().title.as_deref(), Some("Tiny Bible"));
        assert_eq!(result.stats.unwrap().total_verses, 9);
    }

    #[test]
    fn test_get_uses_configured_title() {
        let env = TestEnv::new();
        let api = api(&env);
        api.init("Tiny", Some("Tiny Bible".to_string())).unwrap();
        api.put("B 1:1", "six").unwrap();

        let document = api.get(&["B 1:1"]).unwrap().document.unwrap();
        assert_eq!(document.title, "Tiny Bible");
    }

    #[test]
    fn test_file_url_dir_works_after_init() {
        let env = TestEnv::new();
        let url = format!("file://{}", env.cache_dir().display());
        let api = CacheApi::new(url, env.registry());
        api.init("Tiny", None).unwrap();
        api.put("A 2:1", "four").unwrap();

        let result = api.get(&["A 2:1"]).unwrap();
        assert_eq!(result.document.unwrap().plain_text(), "four");
        assert!(env.cache_dir().join("cache.json").exists());

        let again = api.init("Tiny", None).unwrap();
        assert!(again.messages[0].content.contains("already exists"));
    }
}
