//! Core type definitions for the relay pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordered set of previously processed source identifiers
///
/// Order is discovery order; identifiers are unique by value. Serializes as a
/// plain JSON array so the persisted file stays human-editable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet {
    ids: Vec<String>,
}

impl SeenSet {
    /// Create an empty seen-set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a seen-set from identifiers, keeping the first occurrence of duplicates
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    /// Check whether an identifier was already processed
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|seen| seen == id)
    }

    /// Insert an identifier in place. Returns false if it was already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Return the set with `id` appended (no-op if already present)
    pub fn append(mut self, id: impl Into<String>) -> Self {
        self.insert(id);
        self
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

/// A link discovered on the listing surface, in presentation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Link target as found on the page (may be relative)
    pub href: String,
}

impl Candidate {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Raw title and body text retrieved for a candidate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedDocument {
    pub title: String,
    pub body: String,
}

/// A source article accepted by the fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Canonical absolute URL, used as the seen-set key
    pub identifier: String,
    /// Trimmed, non-empty title
    pub title: String,
    /// Trimmed body text, at least the configured threshold long
    pub body: String,
}

/// Asset references chosen for embedding, in embedding order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSelection {
    assets: Vec<String>,
}

impl AssetSelection {
    /// Wrap an already-chosen list of distinct asset references
    pub fn new(assets: Vec<String>) -> Self {
        Self { assets }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.assets
    }
}

/// Rewritten article ready for publishing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedContent {
    pub title: String,
    /// Markdown body, disclaimer included
    pub body: String,
}

/// Diagnostics gathered when the publish sequence fails
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDiagnostics {
    /// Where the rendered-surface snapshot was written, if capture succeeded
    pub screenshot: Option<PathBuf>,
    /// Truncated raw state of the surface at failure time
    pub state_dump: Option<String>,
    /// Surface location (URL) at failure time
    pub location: Option<String>,
}

/// Result of a single publish attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub success: bool,
    /// Step that failed (only on failure)
    pub failed_step: Option<String>,
    /// Error message (only on failure)
    pub error: Option<String>,
    pub diagnostics: Option<PublishDiagnostics>,
}

impl PublishOutcome {
    /// Outcome of a publish that reached the published state
    pub fn published() -> Self {
        Self {
            success: true,
            failed_step: None,
            error: None,
            diagnostics: None,
        }
    }

    /// Outcome of a publish that failed at `step`
    pub fn failed(
        step: impl Into<String>,
        error: impl Into<String>,
        diagnostics: PublishDiagnostics,
    ) -> Self {
        Self {
            success: false,
            failed_step: Some(step.into()),
            error: Some(error.into()),
            diagnostics: Some(diagnostics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seen_set_preserves_discovery_order() {
        let set = SeenSet::from_ids(["b", "a", "b", "c"]);
        let ids: Vec<&str> = set.iter().collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_seen_set_append_is_unique() {
        let set = SeenSet::new().append("x").append("x").append("y");
        assert_eq!(set.len(), 2);
        assert!(set.contains("x"));
        assert!(!set.contains("z"));
    }

    #[test]
    fn test_seen_set_serializes_as_array() {
        let set = SeenSet::from_ids(["https://a", "https://b"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["https://a","https://b"]"#);

        let back: SeenSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_publish_outcome_constructors() {
        assert!(PublishOutcome::published().success);

        let failed = PublishOutcome::failed("submit", "timeout", PublishDiagnostics::default());
        assert!(!failed.success);
        assert_eq!(failed.failed_step.as_deref(), Some("submit"));
        assert!(failed.diagnostics.is_some());
    }
}
