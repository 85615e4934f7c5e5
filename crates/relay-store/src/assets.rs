//! Asset pool loading

use relay_core::{RelayError, Result};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// Read the pool of image references from a JSON array file
///
/// Unlike the seen-set, the pool is required: a missing file is an error.
/// Blank entries are dropped.
pub async fn load_asset_pool(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .await
        .map_err(|e| RelayError::storage(path, format!("cannot read asset pool: {}", e)))?;

    let entries: Vec<String> = serde_json::from_str(&data)
        .map_err(|e| RelayError::storage(path, format!("malformed asset pool: {}", e)))?;

    let total = entries.len();
    let pool: Vec<String> = entries
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();

    if pool.len() < total {
        warn!("Dropped {} blank asset entries from {}", total - pool.len(), path.display());
    }
    info!("Loaded {} assets from {}", pool.len(), path.display());
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.json");
        std::fs::write(&path, r#"["https://img/1.png", " ", "https://img/2.png"]"#).unwrap();

        let pool = load_asset_pool(&path).await.unwrap();
        assert_eq!(pool, vec!["https://img/1.png", "https://img/2.png"]);
    }

    #[tokio::test]
    async fn test_missing_pool_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_asset_pool(&dir.path().join("images.json")).await;
        assert!(matches!(result, Err(RelayError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_non_string_entries_are_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(load_asset_pool(&path).await.is_err());
    }
}
