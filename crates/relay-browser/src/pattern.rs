//! Glob-style URL matching
//!
//! Patterns use `*` for "any run of characters except `/`", so
//! `https://*.tistory.com/manage` matches any blog's manage page. A trailing
//! slash, query string or fragment on the URL is tolerated.

use regex::Regex;
use relay_core::{RelayError, Result};

#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    regex: Regex,
}

impl UrlPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("[^/]*");
        let regex = Regex::new(&format!("^{}/?(?:[?#].*)?$", body)).map_err(|e| {
            RelayError::Configuration(format!("Invalid URL pattern '{}': {}", pattern, e))
        })?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_subdomain() {
        let pattern = UrlPattern::new("https://*.tistory.com/manage").unwrap();
        assert!(pattern.matches("https://reviewland.tistory.com/manage"));
        assert!(pattern.matches("https://reviewland.tistory.com/manage/"));
        assert!(pattern.matches("https://reviewland.tistory.com/manage?tab=post"));
    }

    #[test]
    fn test_rejects_other_pages() {
        let pattern = UrlPattern::new("https://*.tistory.com/manage").unwrap();
        assert!(!pattern.matches("https://accounts.kakao.com/login"));
        assert!(!pattern.matches("https://reviewland.tistory.com/manage/newpost"));
        assert!(!pattern.matches("https://evil.example/x.tistory.com/manage"));
    }

    #[test]
    fn test_dots_are_literal() {
        let pattern = UrlPattern::new("https://a.b/c").unwrap();
        assert!(!pattern.matches("https://aXb/c"));
        assert_eq!(pattern.as_str(), "https://a.b/c");
    }
}
