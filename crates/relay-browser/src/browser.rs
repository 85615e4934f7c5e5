//! Browser lifecycle management using Chrome DevTools Protocol

use crate::error::Result;
use crate::pattern::UrlPattern;
use headless_chrome::browser::tab::ModifierKey;
use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::{Browser, LaunchOptions, Tab};
use relay_core::{BrowserSettings, RelayError};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Poll interval while waiting for a URL
const URL_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Quote a string as a JavaScript literal
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Message of a JavaScript dialog about to open, if `event` announces one
fn dialog_message(event: &Event) -> Option<&str> {
    match event {
        Event::PageJavascriptDialogOpening(opening) => Some(opening.params.message.as_str()),
        _ => None,
    }
}

/// Accept every alert, confirm and beforeunload dialog the tab opens,
/// including ones raised while a page is still loading
fn accept_dialogs(tab: &Arc<Tab>) -> Result<()> {
    let weak_tab = Arc::downgrade(tab);
    tab.add_event_listener(Arc::new(move |event: &Event| {
        if let Some(message) = dialog_message(event) {
            let Some(tab) = weak_tab.upgrade() else {
                return;
            };
            info!("Accepting dialog: {}", message);
            if let Err(e) = tab.get_dialog().accept(None) {
                warn!("Failed to accept dialog '{}': {}", message, e);
            }
        }
    }))
    .map_err(|e| RelayError::Browser(format!("Failed to register dialog handler: {}", e)))?;
    Ok(())
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// The one tab every collaborator drives
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch browser with the given settings
    pub async fn launch_with_config(settings: &BrowserSettings) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            settings.headless, settings.window_width, settings.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .window_size(Some((settings.window_width, settings.window_height)))
            .idle_browser_timeout(Duration::from_secs(settings.idle_timeout_secs))
            .build()
            .map_err(|e| RelayError::Configuration(format!("Invalid browser options: {}", e)))?;

        let user_agent_arg: Option<String> = settings
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| RelayError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| RelayError::Browser(format!("Failed to create tab: {}", e)))?;

        tab.set_default_timeout(Duration::from_secs(settings.element_timeout_secs));
        accept_dialogs(&tab)?;

        info!("Browser launched successfully");

        Ok(Self { browser, tab })
    }

    /// Navigate to a URL and wait for the load to finish
    ///
    /// Dialogs raised by the page are accepted by the handler registered at launch.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| RelayError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| RelayError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        info!("Navigated to {}", url);
        Ok(())
    }

    /// Click the first element matching `selector`
    pub async fn click(&self, selector: &str) -> Result<()> {
        debug!("Clicking {}", selector);

        let element = self
            .tab
            .wait_for_element(selector)
            .map_err(|_e| RelayError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .map_err(|e| RelayError::Browser(format!("Failed to click {}: {}", selector, e)))?;
        Ok(())
    }

    /// Focus the element matching `selector` and type `text` into it
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        debug!("Typing {} characters into {}", text.chars().count(), selector);

        let element = self
            .tab
            .wait_for_element(selector)
            .map_err(|_e| RelayError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .type_into(text)
            .map_err(|e| RelayError::Browser(format!("Failed to type into {}: {}", selector, e)))?;
        Ok(())
    }

    /// Replace the content of an editor: select all, delete, then insert `text`
    pub async fn replace_content(&self, selector: &str, text: &str) -> Result<()> {
        self.click(selector).await?;

        self.tab
            .press_key_with_modifiers("a", Some(&[ModifierKey::Ctrl]))
            .map_err(|e| RelayError::Browser(format!("Failed to select all in {}: {}", selector, e)))?;
        self.tab
            .press_key("Backspace")
            .map_err(|e| RelayError::Browser(format!("Failed to clear {}: {}", selector, e)))?;
        self.tab
            .send_character(text)
            .map_err(|e| RelayError::Browser(format!("Failed to insert into {}: {}", selector, e)))?;

        debug!("Replaced content of {} ({} characters)", selector, text.chars().count());
        Ok(())
    }

    /// Click the first element matching `selector` whose trimmed text equals `text`
    ///
    /// # Returns
    /// `false` if no such element exists
    pub async fn click_by_text(&self, selector: &str, text: &str) -> Result<bool> {
        let script = format!(
            "(() => {{ const target = Array.from(document.querySelectorAll({})).find(el => el.textContent.trim() === {}); if (!target) return false; target.click(); return true; }})()",
            js_string(selector),
            js_string(text)
        );
        let result = self.evaluate_script(&script).await?;
        Ok(result.as_bool().unwrap_or(false))
    }

    /// Execute JavaScript in the page context
    ///
    /// # Returns
    /// JSON result from JavaScript execution (primitives only; stringify objects in the script)
    pub async fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        debug!("Evaluating JavaScript ({} chars)", script.len());

        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| RelayError::Browser(format!("JavaScript evaluation failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Get the current URL
    pub fn get_url(&self) -> String {
        self.tab.get_url()
    }

    /// Get trimmed text content of the first element matching `selector`
    ///
    /// Returns an empty string when nothing matches.
    pub async fn get_text_content(&self, selector: &str) -> Result<String> {
        let script = format!(
            "document.querySelector({})?.textContent ?? ''",
            js_string(selector)
        );
        let result = self.evaluate_script(&script).await?;
        Ok(result.as_str().unwrap_or("").trim().to_string())
    }

    /// Get the `href` attribute of every element matching `selector`, in document order
    pub async fn get_hrefs(&self, selector: &str) -> Result<Vec<String>> {
        let script = format!(
            "JSON.stringify(Array.from(document.querySelectorAll({})).map(el => el.getAttribute('href')).filter(h => h))",
            js_string(selector)
        );
        let result = self.evaluate_script(&script).await?;
        let encoded = result.as_str().unwrap_or("[]");
        Ok(serde_json::from_str(encoded)?)
    }

    /// Raw inner markup of the document body
    pub async fn body_html(&self) -> Result<String> {
        let result = self
            .evaluate_script("document.body ? document.body.innerHTML : ''")
            .await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Poll the tab URL until it matches `pattern` or `timeout` elapses
    pub async fn wait_for_url(&self, pattern: &UrlPattern, timeout: Duration) -> Result<String> {
        info!("Waiting up to {:?} for {}", timeout, pattern.as_str());
        let started = Instant::now();

        loop {
            let url = self.get_url();
            if pattern.matches(&url) {
                debug!("Reached {}", url);
                return Ok(url);
            }
            if started.elapsed() >= timeout {
                return Err(RelayError::Browser(format!(
                    "Timed out after {:?} waiting for {} (last URL: {})",
                    timeout,
                    pattern.as_str(),
                    url
                )));
            }
            tokio::time::sleep(URL_POLL_INTERVAL).await;
        }
    }

    /// Get reference to the active tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Close the browser session
    pub async fn close(self) -> Result<()> {
        info!("Closing browser session");
        // Dropping the Browser terminates the Chrome process
        drop(self);
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("BrowserSession dropped, browser will be cleaned up");
    }
}
