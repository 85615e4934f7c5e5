//! Cookie persistence
//!
//! `relay login` opens a visible browser, waits for a human to finish the
//! login, and saves the resulting cookies. Later runs restore them before
//! attempting a credential login, which avoids most interactive challenges.

use crate::browser::BrowserSession;
use crate::pattern::UrlPattern;
use headless_chrome::protocol::cdp::Network::{Cookie, CookieParam};
use relay_core::{BrowserSettings, RelayError, Result};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::info;

/// Login page opened by [`interactive_login`]
pub const LOGIN_URL: &str = "https://www.tistory.com/auth/login";

/// Write the tab's cookies to `path` as JSON
pub async fn save_cookies(session: &BrowserSession, path: &Path) -> Result<usize> {
    let cookies: Vec<Cookie> = session
        .tab()
        .get_cookies()
        .map_err(|e| RelayError::Browser(format!("Failed to read cookies: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, serde_json::to_string_pretty(&cookies)?).await?;

    info!("Saved {} cookies to {}", cookies.len(), path.display());
    Ok(cookies.len())
}

/// Read saved cookies from `path` in the form Chrome accepts for setting
///
/// Saved cookies carry more fields than Chrome accepts when setting them;
/// unknown fields are dropped during conversion.
pub async fn load_cookie_params(path: &Path) -> Result<Vec<CookieParam>> {
    let data = fs::read_to_string(path)
        .await
        .map_err(|e| RelayError::storage(path, format!("cannot read session state: {}", e)))?;
    let saved: serde_json::Value = serde_json::from_str(&data)
        .map_err(|e| RelayError::storage(path, format!("malformed session state: {}", e)))?;
    serde_json::from_value(saved)
        .map_err(|e| RelayError::storage(path, format!("unusable cookies: {}", e)))
}

/// Load cookies from `path` into the tab
pub async fn restore_cookies(session: &BrowserSession, path: &Path) -> Result<usize> {
    let cookies = load_cookie_params(path).await?;
    let count = cookies.len();
    session
        .tab()
        .set_cookies(cookies)
        .map_err(|e| RelayError::Browser(format!("Failed to set cookies: {}", e)))?;

    info!("Restored {} cookies from {}", count, path.display());
    Ok(count)
}

/// Open a visible browser on the login page and save cookies once the
/// manage page is reached
pub async fn interactive_login(
    settings: &BrowserSettings,
    manage_pattern: &str,
    state_path: &Path,
    timeout: Duration,
) -> Result<usize> {
    let settings = BrowserSettings {
        headless: false,
        ..settings.clone()
    };
    let pattern = UrlPattern::new(manage_pattern)?;
    let session = BrowserSession::launch_with_config(&settings).await?;

    session.navigate(LOGIN_URL).await?;
    info!("Complete the login in the browser window");

    let saved = match session.wait_for_url(&pattern, timeout).await {
        Ok(_) => save_cookies(&session, state_path).await,
        Err(e) => Err(e),
    };

    session.close().await?;
    saved
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAVED: &str = r#"[
  {
    "name": "TSSESSION",
    "value": "abc123",
    "domain": ".tistory.com",
    "path": "/",
    "expires": -1,
    "size": 15,
    "httpOnly": true,
    "secure": true,
    "session": true
  }
]"#;

    #[tokio::test]
    async fn test_load_cookie_params_from_saved_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, SAVED).unwrap();

        let cookies = load_cookie_params(&path).await.unwrap();

        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "TSSESSION");
        assert_eq!(cookies[0].value, "abc123");
        assert_eq!(cookies[0].domain.as_deref(), Some(".tistory.com"));
    }

    #[tokio::test]
    async fn test_missing_session_state_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_cookie_params(&dir.path().join("auth.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_malformed_session_state_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_cookie_params(&path).await.unwrap_err();
        assert!(err.to_string().contains("malformed session state"));
    }
}
