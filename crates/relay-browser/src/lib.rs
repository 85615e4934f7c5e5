//! Browser automation and scraping drivers for relay
//!
//! This crate provides the concrete collaborators behind the pipeline's
//! traits, using Chrome DevTools Protocol (CDP) through `headless_chrome`.
//!
//! # Features
//!
//! - **Browser Management**: launch Chrome once per run, share one tab
//! - **Content Sources**: list and read articles through the tab, or over plain HTTP
//! - **Publishing Surface**: log in to Tistory, compose and publish a post
//! - **Diagnostics**: full-page screenshots and raw markup dumps
//! - **Session State**: save cookies after a manual login and restore them later
//!
//! # Example
//!
//! ```no_run
//! use relay_browser::ChromeLauncher;
//! use relay_core::{AutomationSession, RelayConfig, SessionLauncher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let launcher = ChromeLauncher::new(RelayConfig::default());
//!     let session = launcher.open().await?;
//!
//!     let candidates = session.source().list_candidates().await?;
//!     println!("{} candidates", candidates.len());
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - Chrome or Chromium browser installed
//! - For headless operation, no additional setup required
//!
//! # Architecture
//!
//! - [`browser`]: Browser lifecycle and tab helpers
//! - [`screenshot`]: Screenshot capture
//! - [`source`]: Browser-driven and HTTP content sources
//! - [`surface`]: Tistory publishing surface
//! - [`pattern`]: Glob-style URL matching
//! - [`session_state`]: Cookie persistence and interactive login
//! - [`launcher`]: Opens the per-run automation session
//! - [`error`]: Error types for browser operations

pub mod browser;
pub mod error;
pub mod launcher;
pub mod pattern;
pub mod screenshot;
pub mod session_state;
pub mod source;
pub mod surface;

// Re-export commonly used types
pub use browser::BrowserSession;
pub use error::{BrowserError, Result};
pub use launcher::{ChromeLauncher, ChromeSession};
pub use pattern::UrlPattern;
pub use screenshot::{capture_png, is_png, CaptureArea};
pub use session_state::{interactive_login, load_cookie_params, restore_cookies, save_cookies};
pub use source::{BrowserSource, HttpSource};
pub use surface::TistorySurface;
