use crate::error::{CacheError, Result};
use crate::versification::DEFAULT_VERSIFICATION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "cache.json";

/// Configuration for one cache directory, stored in `<dir>/cache.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Name of the numbering scheme the index is laid out in
    #[serde(default = "default_versification")]
    pub versification: String,

    /// Title given to documents read from this cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// fsync data and index files on flush
    #[serde(default = "default_sync_on_flush")]
    pub sync_on_flush: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_versification() -> String {
    DEFAULT_VERSIFICATION.to_string()
}

fn default_sync_on_flush() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            versification: default_versification(),
            title: None,
            sync_on_flush: default_sync_on_flush(),
            created_at: None,
        }
    }
}

impl CacheConfig {
    pub fn new(versification: impl Into<String>) -> Self {
        Self {
            versification: versification.into(),
            created_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let config_path = cache_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(CacheError::Io)?;
        let config: CacheConfig =
            serde_json::from_str(&content).map_err(CacheError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, cache_dir: P) -> Result<()> {
        let cache_dir = cache_dir.as_ref();

        if !cache_dir.exists() {
            fs::create_dir_all(cache_dir).map_err(CacheError::Io)?;
        }

        let config_path = cache_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(CacheError::Serialization)?;
        fs::write(config_path, content).map_err(CacheError::Io)?;
        Ok(())
    }

    pub fn exists_in<P: AsRef<Path>>(cache_dir: P) -> bool {
        cache_dir.as_ref().join(CONFIG_FILENAME).exists()
    }

    /// Document title, falling back to the versification name.
    pub fn document_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.versification)
    }
}
