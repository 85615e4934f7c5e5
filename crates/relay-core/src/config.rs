//! Configuration management for relay
//!
//! Everything that is not a secret lives in `relay.toml`; secrets come from
//! the environment through [`Credentials`]. Both are built once by the caller
//! and injected into the pipeline, never read ad hoc.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{RelayError, Result};

/// Default config file name, resolved against the working directory
pub const DEFAULT_CONFIG_FILE: &str = "relay.toml";

/// Environment variable holding the generative-service API key
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Environment variable holding the publishing-surface username
pub const ENV_USERNAME: &str = "TISTORY_USERNAME";
/// Environment variable holding the publishing-surface password
pub const ENV_PASSWORD: &str = "TISTORY_PASSWORD";

/// Top-level relay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub publisher: PublisherConfig,

    #[serde(default)]
    pub browser: BrowserSettings,
}

/// Filesystem locations used by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON array of already-published source URLs
    #[serde(default = "default_seen_set_path")]
    pub seen_set: PathBuf,

    /// JSON array of image URLs to embed
    #[serde(default = "default_asset_pool_path")]
    pub asset_pool: PathBuf,

    /// Where the failure screenshot is written
    #[serde(default = "default_screenshot_path")]
    pub screenshot: PathBuf,

    /// Saved browser cookies from `relay login`
    #[serde(default = "default_session_state_path")]
    pub session_state: PathBuf,
}

/// How candidate articles are listed and retrieved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDriver {
    /// Drive the shared browser tab
    #[default]
    Browser,
    /// Plain HTTP requests with HTML parsing
    Http,
}

/// Listing/document source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub driver: SourceDriver,

    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Base against which relative article links are resolved
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    #[serde(default = "default_body_selector")]
    pub body_selector: String,

    /// Minimum body length (characters) for a candidate to be accepted
    #[serde(default = "default_min_body_chars")]
    pub min_body_chars: usize,
}

/// Whether generated output is checked beyond its structure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Only the title/body structure is enforced
    #[default]
    Lenient,
    /// Also enforce the body length band and asset embedding
    Strict,
}

/// Generative text service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Language the article is rewritten into
    #[serde(default = "default_language")]
    pub language: String,

    /// Audience and tone directive
    #[serde(default = "default_tone")]
    pub tone: String,

    #[serde(default = "default_body_min_chars")]
    pub body_min_chars: usize,

    #[serde(default = "default_body_max_chars")]
    pub body_max_chars: usize,

    /// Number of images embedded per article
    #[serde(default = "default_asset_count")]
    pub asset_count: usize,

    #[serde(default)]
    pub strictness: Strictness,

    /// Appended verbatim to every generated body
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Publishing surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    #[serde(default = "default_blog_url")]
    pub blog_url: String,

    /// Category selected for every post
    #[serde(default = "default_category")]
    pub category: String,

    /// Glob-style URL pattern reached after a successful login
    #[serde(default = "default_manage_url_pattern")]
    pub manage_url_pattern: String,

    /// Upper bound on waiting for the authenticated surface
    #[serde(default = "default_login_timeout_secs")]
    pub login_timeout_secs: u64,

    /// Pause after the final confirmation
    #[serde(default = "default_settle_secs")]
    pub settle_secs: u64,

    #[serde(default)]
    pub selectors: SurfaceSelectors,
}

/// CSS selectors for every publishing-surface input target
///
/// Unset selectors keep their defaults, so a config may override just one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSelectors {
    pub login_button: String,
    pub username_input: String,
    pub password_input: String,
    pub login_submit: String,
    pub category_button: String,
    pub category_item: String,
    pub editor_mode_button: String,
    pub markdown_mode_option: String,
    pub title_input: String,
    pub body_input: String,
    pub publish_button: String,
    pub public_option: String,
    pub confirm_button: String,
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,

    /// Default wait for a single element
    #[serde(default = "default_element_timeout_secs")]
    pub element_timeout_secs: u64,

    /// How long the browser may sit idle (e.g. during generation) before it is torn down
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

// Default value providers
fn default_seen_set_path() -> PathBuf {
    PathBuf::from("data/crawled_urls.json")
}

fn default_asset_pool_path() -> PathBuf {
    PathBuf::from("data/images.json")
}

fn default_screenshot_path() -> PathBuf {
    PathBuf::from("error_screenshot.png")
}

fn default_session_state_path() -> PathBuf {
    PathBuf::from("auth.json")
}

fn default_listing_url() -> String {
    "https://www.healthline.com/health-news".to_string()
}

fn default_base_url() -> String {
    "https://www.healthline.com".to_string()
}

fn default_link_selector() -> String {
    "a.css-a63gyd".to_string()
}

fn default_title_selector() -> String {
    "h1.css-1q7njkh".to_string()
}

fn default_body_selector() -> String {
    "article.article-body".to_string()
}

fn default_min_body_chars() -> usize {
    500
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_language() -> String {
    "Korean".to_string()
}

fn default_tone() -> String {
    "friendly and easy to follow for general readers in their 30s to 50s who care about their health"
        .to_string()
}

fn default_body_min_chars() -> usize {
    1500
}

fn default_body_max_chars() -> usize {
    2500
}

fn default_asset_count() -> usize {
    2
}

fn default_disclaimer() -> String {
    "\n---\n> **면책 조항 (Disclaimer):** 이 글은 정보 제공을 목적으로 하며, 전문적인 의학적 조언이나 진단을 대체할 수 없습니다. 건강 관련 문제에 대해서는 반드시 전문 의료인과 상담하시기 바랍니다."
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_blog_url() -> String {
    "https://reviewland.tistory.com".to_string()
}

fn default_category() -> String {
    "건강".to_string()
}

fn default_manage_url_pattern() -> String {
    "https://*.tistory.com/manage".to_string()
}

fn default_login_timeout_secs() -> u64 {
    60
}

fn default_settle_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_user_agent() -> Option<String> {
    Some(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"
            .to_string(),
    )
}

fn default_element_timeout_secs() -> u64 {
    30
}

fn default_idle_timeout_secs() -> u64 {
    600
}

impl RelayConfig {
    /// Load configuration from `path`, or use defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                RelayError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            })
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default configuration to `path`
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&Self::default()).map_err(|e| {
            RelayError::Configuration(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the invariants a run relies on
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.source.listing_url.trim().is_empty() {
            problems.push("source.listing_url is empty");
        }
        if self.source.base_url.trim().is_empty() {
            problems.push("source.base_url is empty");
        }
        if self.source.min_body_chars == 0 {
            problems.push("source.min_body_chars must be greater than zero");
        }
        if self.generator.model.trim().is_empty() {
            problems.push("generator.model is empty");
        }
        if self.generator.body_min_chars > self.generator.body_max_chars {
            problems.push("generator.body_min_chars exceeds generator.body_max_chars");
        }
        if self.generator.asset_count == 0 {
            problems.push("generator.asset_count must be at least 1");
        }
        if self.publisher.blog_url.trim().is_empty() {
            problems.push("publisher.blog_url is empty");
        }
        if self.publisher.login_timeout_secs == 0 {
            problems.push("publisher.login_timeout_secs must be greater than zero");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RelayError::Configuration(problems.join("; ")))
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            seen_set: default_seen_set_path(),
            asset_pool: default_asset_pool_path(),
            screenshot: default_screenshot_path(),
            session_state: default_session_state_path(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            driver: SourceDriver::default(),
            listing_url: default_listing_url(),
            base_url: default_base_url(),
            link_selector: default_link_selector(),
            title_selector: default_title_selector(),
            body_selector: default_body_selector(),
            min_body_chars: default_min_body_chars(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            language: default_language(),
            tone: default_tone(),
            body_min_chars: default_body_min_chars(),
            body_max_chars: default_body_max_chars(),
            asset_count: default_asset_count(),
            strictness: Strictness::default(),
            disclaimer: default_disclaimer(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            blog_url: default_blog_url(),
            category: default_category(),
            manage_url_pattern: default_manage_url_pattern(),
            login_timeout_secs: default_login_timeout_secs(),
            settle_secs: default_settle_secs(),
            selectors: SurfaceSelectors::default(),
        }
    }
}

impl Default for SurfaceSelectors {
    fn default() -> Self {
        Self {
            login_button: "#cMain a.btn_login.link_kakao_id".to_string(),
            username_input: "input[name=\"loginId\"]".to_string(),
            password_input: "input[name=\"password\"]".to_string(),
            login_submit: ".btn_g.highlight.submit".to_string(),
            category_button: "#category-btn".to_string(),
            category_item: "#category-list .mce-menu-item".to_string(),
            editor_mode_button: "#editor-mode-layer-btn-open".to_string(),
            markdown_mode_option: "#editor-mode-markdown".to_string(),
            title_input: "#post-title-inp".to_string(),
            body_input: ".CodeMirror textarea".to_string(),
            publish_button: "#publish-layer-btn".to_string(),
            public_option: "#open20".to_string(),
            confirm_button: "#publish-btn".to_string(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            element_timeout_secs: default_element_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// Username/password pair for the publishing surface
#[derive(Clone, PartialEq, Eq)]
pub struct PublisherCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for PublisherCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Secrets required before a run may touch any external system
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub publisher: PublisherCredentials,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("publisher", &self.publisher)
            .finish()
    }
}

impl Credentials {
    /// Build credentials, rejecting empty values
    pub fn new(
        api_key: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let username = username.into();
        let password = password.into();
        Self::from_lookup(|name| match name {
            ENV_API_KEY => Some(api_key.clone()),
            ENV_USERNAME => Some(username.clone()),
            ENV_PASSWORD => Some(password.clone()),
            _ => None,
        })
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary lookup, reporting every missing name
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name);
                String::new()
            }
        };

        let api_key = read(ENV_API_KEY);
        let username = read(ENV_USERNAME);
        let password = read(ENV_PASSWORD);

        if !missing.is_empty() {
            return Err(RelayError::Configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            api_key,
            publisher: PublisherCredentials { username, password },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = RelayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source.min_body_chars, 500);
        assert_eq!(config.generator.asset_count, 2);
        assert_eq!(config.generator.strictness, Strictness::Lenient);
        assert_eq!(config.publisher.login_timeout_secs, 60);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: RelayConfig = toml::from_str(
            r#"
            [source]
            driver = "http"
            min_body_chars = 800

            [generator]
            strictness = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.driver, SourceDriver::Http);
        assert_eq!(config.source.min_body_chars, 800);
        assert_eq!(config.source.link_selector, "a.css-a63gyd");
        assert_eq!(config.generator.strictness, Strictness::Strict);
        assert_eq!(config.paths.seen_set, PathBuf::from("data/crawled_urls.json"));
    }

    #[test]
    fn test_single_selector_override_keeps_other_selectors() {
        let config: RelayConfig = toml::from_str(
            r##"
            [publisher.selectors]
            title_input = "#my-title"
            "##,
        )
        .unwrap();

        let selectors = &config.publisher.selectors;
        let defaults = SurfaceSelectors::default();
        assert_eq!(selectors.title_input, "#my-title");
        assert_eq!(selectors.login_button, defaults.login_button);
        assert_eq!(selectors.confirm_button, defaults.confirm_button);
        assert_eq!(config.publisher.login_timeout_secs, 60);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = RelayConfig::default();
        config.source.listing_url = String::new();
        config.generator.body_min_chars = 10;
        config.generator.body_max_chars = 5;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("listing_url"));
        assert!(err.contains("body_min_chars"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RelayConfig::load_or_default(&dir.path().join("relay.toml")).unwrap();
        assert_eq!(config.publisher.blog_url, "https://reviewland.tistory.com");
    }

    #[test]
    fn test_write_then_load_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/relay.toml");
        RelayConfig::write_default(&path).unwrap();

        let loaded = RelayConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.generator.model, "gemini-2.5-flash");
        assert_eq!(loaded.browser.window_width, 1920);
    }

    #[test]
    fn test_load_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, "[source\nbroken").unwrap();

        let result = RelayConfig::load_or_default(&path);
        assert!(matches!(result, Err(RelayError::Configuration(_))));
    }

    #[test]
    fn test_credentials_report_all_missing() {
        let vars: HashMap<&str, &str> = [(ENV_USERNAME, "writer")].into_iter().collect();
        let err = Credentials::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap_err()
            .to_string();

        assert!(err.contains(ENV_API_KEY));
        assert!(err.contains(ENV_PASSWORD));
        assert!(!err.contains(ENV_USERNAME));
    }

    #[test]
    fn test_credentials_reject_blank_values() {
        assert!(Credentials::new("key", "  ", "pw").is_err());

        let creds = Credentials::new("key", "writer", "pw").unwrap();
        assert_eq!(creds.publisher.username, "writer");
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::new("secret-key", "writer", "hunter2").unwrap();
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("writer"));
    }
}
