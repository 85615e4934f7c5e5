//! Browser error types - re-exports unified RelayError from relay-core
//!
//! All browser errors use the unified RelayError type:
//! - Browser(String) - launch, navigation, CDP and screenshot failures
//! - ElementNotFound - a selector did not resolve within its timeout
//!
//! Error messages should name the selector or URL involved.

pub use relay_core::{RelayError, Result};

pub type BrowserError = RelayError;
