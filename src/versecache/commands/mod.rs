use crate::cache::{CacheStats, CheckReport, WriteReport};
use crate::config::CacheConfig;
use crate::document::Document;

pub mod check;
pub mod get;
pub mod import;
pub mod info;
pub mod init;
pub mod put;

/// Longest list of verse references spelled out in a message.
const MAX_LISTED_REFS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub document: Option<Document>,
    /// Display references of requested verses with no text
    pub missing: Vec<String>,
    pub written: Option<WriteReport>,
    pub check: Option<CheckReport>,
    pub stats: Option<CacheStats>,
    pub config: Option<CacheConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_written(mut self, report: WriteReport) -> Self {
        self.written = Some(report);
        self
    }

    pub fn with_check(mut self, report: CheckReport) -> Self {
        self.check = Some(report);
        self
    }

    pub fn with_stats(mut self, stats: CacheStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_level(&self, level: MessageLevel) -> bool {
        self.messages.iter().any(|m| m.level == level)
    }
}

/// `a, b, c` or `a, b, … (12 more)`.
pub(crate) fn list_refs(refs: &[String]) -> String {
    if refs.len() <= MAX_LISTED_REFS {
        return refs.join(", ");
    }
    format!(
        "{}, … ({} more)",
        refs[..MAX_LISTED_REFS].join(", "),
        refs.len() - MAX_LISTED_REFS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_refs_short() {
        let refs = vec!["Gen 1:1".to_string(), "Gen 1:2".to_string()];
        assert_eq!(list_refs(&refs), "Gen 1:1, Gen 1:2");
    }

    #[test]
    fn test_list_refs_truncates() {
        let refs: Vec<String> = (1..=12).map(|v| format!("Gen 1:{}", v)).collect();
        let listed = list_refs(&refs);
        assert!(listed.starts_with("Gen 1:1, Gen 1:2"));
        assert!(listed.ends_with("… (2 more)"));
        assert!(!listed.contains("Gen 1:11"));
    }
}
