//! Failure diagnostics for the publish sequence
//!
//! On failure we keep three things for offline diagnosis: a screenshot at a
//! fixed path, the first [`STATE_DUMP_LIMIT`] characters of the surface
//! markup, and the surface URL. Each capture fails open; a broken tab must
//! not stop the others.

use relay_core::fail_open::fail_open;
use relay_core::{PublishDiagnostics, PublishingSurface, RelayError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Characters of surface markup kept in the log
pub const STATE_DUMP_LIMIT: usize = 1000;

/// First `limit` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

/// Collects screenshot, state dump and location from a surface
#[derive(Debug, Clone)]
pub struct DiagnosticsCollector {
    screenshot_path: PathBuf,
}

impl DiagnosticsCollector {
    pub fn new(screenshot_path: impl Into<PathBuf>) -> Self {
        Self {
            screenshot_path: screenshot_path.into(),
        }
    }

    pub fn screenshot_path(&self) -> &Path {
        &self.screenshot_path
    }

    async fn write_screenshot(&self, surface: &dyn PublishingSurface) -> Result<PathBuf> {
        let png = surface.snapshot().await?;

        if let Some(parent) = self.screenshot_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.screenshot_path, &png).await.map_err(|e| {
            RelayError::storage(&self.screenshot_path, format!("cannot write screenshot: {}", e))
        })?;

        Ok(self.screenshot_path.clone())
    }

    /// Capture everything available and log it
    pub async fn collect(&self, surface: &dyn PublishingSurface) -> PublishDiagnostics {
        info!("Collecting publish failure diagnostics");

        let screenshot = fail_open("capture_screenshot", || self.write_screenshot(surface)).await;
        let state_dump = fail_open("dump_surface_state", || surface.dump_state())
            .await
            .map(|dump| truncate_chars(&dump, STATE_DUMP_LIMIT));
        let location = fail_open("read_surface_location", || surface.location()).await;

        if let Some(ref dump) = state_dump {
            warn!("--- Surface state at failure (first {} chars) ---\n{}", STATE_DUMP_LIMIT, dump);
        }
        if let Some(ref url) = location {
            warn!("Surface location at failure: {}", url);
        }
        if let Some(ref path) = screenshot {
            warn!("Saved failure screenshot to {}", path.display());
        }

        PublishDiagnostics {
            screenshot,
            state_dump,
            location,
        }
    }
}
