//! Seen-set persistence
//!
//! The seen-set lives in a single JSON array file. A missing or blank file is
//! an empty set; anything that is not a JSON array of strings is a fatal
//! storage error and is never silently reset.

use relay_core::{RelayError, Result, SeenSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// JSON-file store for the seen-set
#[derive(Debug, Clone)]
pub struct SeenSetStore {
    path: PathBuf,
}

impl SeenSetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted seen-set
    ///
    /// # Returns
    /// * `Ok(SeenSet)` - parsed set, or an empty set if the file is absent or blank
    /// * `Err(RelayError::Storage)` - the file exists but is not a JSON array of strings
    pub async fn load(&self) -> Result<SeenSet> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No seen-set at {}, starting empty", self.path.display());
                return Ok(SeenSet::new());
            }
            Err(e) => return Err(RelayError::storage(&self.path, e.to_string())),
        };

        if data.trim().is_empty() {
            return Ok(SeenSet::new());
        }

        let ids: Vec<String> = serde_json::from_str(&data)
            .map_err(|e| RelayError::storage(&self.path, format!("malformed seen-set: {}", e)))?;
        let total = ids.len();
        let set = SeenSet::from_ids(ids);
        if set.len() < total {
            warn!(
                "Dropped {} duplicate identifiers from {}; the next commit rewrites it without them",
                total - set.len(),
                self.path.display()
            );
        }

        info!("Loaded {} seen identifiers from {}", set.len(), self.path.display());
        Ok(set)
    }

    /// Write the whole seen-set back
    ///
    /// The data goes to a sibling temp file that is then renamed over the
    /// target, so readers never observe a half-written set.
    pub async fn persist(&self, set: &SeenSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RelayError::storage(parent, e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(set)?;
        let tmp_path = self.temp_path();

        fs::write(&tmp_path, content)
            .await
            .map_err(|e| RelayError::storage(&tmp_path, e.to_string()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| RelayError::storage(&self.path, e.to_string()))?;

        info!("Persisted {} seen identifiers to {}", set.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "seen".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SeenSetStore {
        SeenSetStore::new(dir.path().join("data/crawled_urls.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = store_in(&dir).load().await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "  \n").unwrap();

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"not": "an array"}"#).unwrap();

        let result = store.load().await;
        assert!(matches!(result, Err(RelayError::Storage { .. })));

        // The broken file is left for inspection
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("not"));
    }

    #[tokio::test]
    async fn test_duplicate_entries_collapse_to_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"["https://news.example/x", "https://news.example/y", "https://news.example/x"]"#,
        )
        .unwrap();

        let set = store.load().await.unwrap();
        let ids: Vec<&str> = set.iter().collect();
        assert_eq!(ids, vec!["https://news.example/x", "https://news.example/y"]);

        store
            .persist(&set.append("https://news.example/new"))
            .await
            .unwrap();
        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded.contains("https://news.example/new"));
    }

    #[tokio::test]
    async fn test_persist_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let set = SeenSet::new()
            .append("https://news.example/b")
            .append("https://news.example/a");
        store.persist(&set).await.unwrap();

        let loaded = store.load().await.unwrap();
        let ids: Vec<&str> = loaded.iter().collect();
        assert_eq!(ids, vec!["https://news.example/b", "https://news.example/a"]);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_persist_writes_pretty_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .persist(&SeenSet::from_ids(["https://news.example/a"]))
            .await
            .unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "[\n  \"https://news.example/a\"\n]");
    }
}
