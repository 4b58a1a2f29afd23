use crate::store::blob::StoreError;
use crate::store::index::IndexError;
use crate::versification::Ordinal;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Unsupported cache location: {0} (only local directories are supported)")]
    UnsupportedLocation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load cache index {}: {source}", path.display())]
    CacheLoad {
        path: PathBuf,
        #[source]
        source: IndexError,
    },

    #[error("Failed to read verse text: {0}")]
    StoreRead(#[source] StoreError),

    #[error("Failed to write verse text: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("No text recorded for verse ordinal {0}")]
    MissingVerse(Ordinal),

    #[error("Verse ordinal {ordinal} is outside 1..={max}")]
    IndexOutOfRange { ordinal: Ordinal, max: Ordinal },

    #[error("Unknown versification: {0}")]
    UnknownVersification(String),

    #[error("Invalid verse reference: {0}")]
    InvalidReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = CacheError::IndexOutOfRange {
            ordinal: 0,
            max: 31102,
        };
        assert_eq!(err.to_string(), "Verse ordinal 0 is outside 1..=31102");
    }

    #[test]
    fn test_cache_load_keeps_source() {
        use std::error::Error as _;

        let err = CacheError::CacheLoad {
            path: PathBuf::from("/tmp/xml.index"),
            source: IndexError::Short {
                expected: 10,
                found: 3,
            },
        };
        assert!(err.to_string().contains("/tmp/xml.index"));
        assert!(err.source().is_some());
    }
}
