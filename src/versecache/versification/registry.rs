//! Lookup of versifications by name.
//!
//! Built-in schemes are constructed lazily the first time they are asked for
//! and cached for the lifetime of the registry. A [`Versifications`] value is
//! passed to whoever needs it; there is no process-wide instance.

use super::{kjv, Ordinal, Versification};
use crate::error::{CacheError, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Scheme used when a cache does not name one.
pub const DEFAULT_VERSIFICATION: &str = kjv::NAME;

type Factory = fn() -> Versification;

static BUILTINS: Lazy<HashMap<&'static str, Factory>> = Lazy::new(|| {
    let mut builtins: HashMap<&'static str, Factory> = HashMap::new();
    builtins.insert(kjv::NAME, kjv::kjv);
    builtins
});

/// Source of numbering schemes for verse caches.
///
/// Implementations must be safe to share between threads: several caches
/// using the same scheme may look it up concurrently.
pub trait VersificationProvider: Send + Sync {
    /// Get the versification by its name.
    fn versification(&self, name: &str) -> Result<Arc<Versification>>;

    /// Determine whether the named versification is available.
    fn is_known(&self, name: &str) -> bool;

    fn total_verse_count(&self, name: &str) -> Result<Ordinal> {
        Ok(self.versification(name)?.total_verse_count())
    }
}

/// Registry of built-in and registered versifications.
pub struct Versifications {
    include_builtins: bool,
    built: RwLock<HashMap<String, Arc<Versification>>>,
}

impl Default for Versifications {
    fn default() -> Self {
        Self::new()
    }
}

impl Versifications {
    /// Registry offering the built-in schemes.
    pub fn new() -> Self {
        Self {
            include_builtins: true,
            built: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with no schemes at all; tests register their own.
    pub fn empty() -> Self {
        Self {
            include_builtins: false,
            built: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a versification that is not built in, replacing any scheme of the
    /// same name.
    pub fn register(&self, versification: Versification) -> Arc<Versification> {
        let versification = Arc::new(versification);
        tracing::debug!(name = versification.name(), "registered versification");
        self.built
            .write()
            .insert(versification.name().to_string(), Arc::clone(&versification));
        versification
    }

    pub fn with(self, versification: Versification) -> Self {
        self.register(versification);
        self
    }

    /// Names of every scheme this registry can provide, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.built.read().keys().cloned().collect();
        if self.include_builtins {
            names.extend(BUILTINS.keys().map(|k| k.to_string()));
        }
        names.into_iter().collect()
    }

    fn builtin(&self, name: &str) -> Option<Factory> {
        if self.include_builtins {
            BUILTINS.get(name).copied()
        } else {
            None
        }
    }
}

impl VersificationProvider for Versifications {
    fn versification(&self, name: &str) -> Result<Arc<Versification>> {
        if let Some(found) = self.built.read().get(name) {
            return Ok(Arc::clone(found));
        }

        let factory = self
            .builtin(name)
            .ok_or_else(|| CacheError::UnknownVersification(name.to_string()))?;

        let mut built = self.built.write();
        // Another thread may have built it between the two locks
        let entry = built.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(name, "building versification");
            Arc::new(factory())
        });
        Ok(Arc::clone(entry))
    }

    fn is_known(&self, name: &str) -> bool {
        self.built.read().contains_key(name) || self.builtin(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tiny_versification;
    use std::thread;

    #[test]
    fn test_builtin_kjv_is_known() {
        let registry = Versifications::new();
        assert!(registry.is_known("KJV"));
        assert!(!registry.is_known("Vulgate"));
        assert_eq!(registry.total_verse_count("KJV").unwrap(), 31102);
    }

    #[test]
    fn test_unknown_scheme() {
        let registry = Versifications::new();
        let err = registry.versification("Nope").unwrap_err();
        assert!(matches!(err, CacheError::UnknownVersification(name) if name == "Nope"));
    }

    #[test]
    fn test_empty_registry_has_no_builtins() {
        let registry = Versifications::empty();
        assert!(!registry.is_known("KJV"));
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_register_custom_scheme() {
        let registry = Versifications::empty().with(tiny_versification());
        assert!(registry.is_known("Tiny"));
        assert_eq!(registry.total_verse_count("Tiny").unwrap(), 9);
        assert_eq!(registry.names(), vec!["Tiny".to_string()]);
    }

    #[test]
    fn test_lookups_share_one_instance() {
        let registry = Arc::new(Versifications::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.versification("KJV").unwrap())
            })
            .collect();

        let schemes: Vec<Arc<Versification>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for scheme in &schemes[1..] {
            assert!(Arc::ptr_eq(&schemes[0], scheme));
        }
    }
}
