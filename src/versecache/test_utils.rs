use crate::builder::DocumentBuilder;
use crate::cache::VerseCache;
use crate::document::Document;
use crate::versification::{BookInfo, Ordinal, Versification, Versifications};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Nine verses: Alpha has chapters of 3 and 2 verses, Beta one of 4.
pub fn tiny_versification() -> Versification {
    Versification::new(
        "Tiny",
        vec![
            BookInfo::new("A", "Alpha", vec![3, 2]),
            BookInfo::new("B", "Beta", vec![4]),
        ],
    )
    .expect("tiny versification is valid")
}

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub versification: Arc<Versification>,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
            versification: Arc::new(tiny_versification()),
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    /// Opens a fresh handle on the test cache directory.
    pub fn open(&self) -> VerseCache {
        VerseCache::open(self.cache_dir(), Arc::clone(&self.versification))
            .expect("failed to open test cache")
    }

    /// Registry with the tiny scheme and the built-ins.
    pub fn registry(&self) -> Versifications {
        Versifications::new().with(tiny_versification())
    }

    pub fn document(&self, verses: &[(Ordinal, &str)]) -> Document {
        let pairs = verses.iter().map(|(ordinal, text)| {
            let verse = self
                .versification
                .verse_at(*ordinal)
                .expect("test ordinal in range");
            (verse, *text)
        });
        DocumentBuilder::from_verses(&self.versification, "Tiny", pairs)
            .expect("test document is valid")
    }
}
