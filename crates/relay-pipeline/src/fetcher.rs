//! Content fetcher: seen-filter, quality gate, first match wins
//!
//! Candidates are scanned once in listing order. The first unseen candidate
//! whose document passes the quality gate is returned; nothing is scored and
//! nothing already passed over is reconsidered.

use relay_core::{ContentSource, RelayError, Result, SeenSet, SourceDocument};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Resolve a listing href against the source's base URL
pub fn resolve_href(base: &str, href: &str) -> Result<String> {
    let base = Url::parse(base)
        .map_err(|e| RelayError::Configuration(format!("Invalid base URL '{}': {}", base, e)))?;
    let resolved = base
        .join(href.trim())
        .map_err(|e| RelayError::Source(format!("Invalid link '{}': {}", href, e)))?;
    Ok(resolved.to_string())
}

/// Find the first unseen candidate whose body is at least `min_body_chars` long
///
/// # Returns
/// * `Ok(Some(doc))` - a qualifying article
/// * `Ok(None)` - every candidate was seen or failed the quality gate
/// * `Err(_)` - the listing or a document fetch failed
pub async fn fetch_unseen_document(
    source: &dyn ContentSource,
    seen: &SeenSet,
    min_body_chars: usize,
) -> Result<Option<SourceDocument>> {
    let candidates = source.list_candidates().await?;
    let mut considered: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let identifier = match resolve_href(source.base_url(), &candidate.href) {
            Ok(url) => url,
            Err(RelayError::Source(message)) => {
                warn!("Skipping candidate: {}", message);
                continue;
            }
            Err(e) => return Err(e),
        };

        if !considered.insert(identifier.clone()) {
            continue;
        }
        if seen.contains(&identifier) {
            debug!("Already published: {}", identifier);
            continue;
        }

        info!("New article found: {}", identifier);
        let document = source.fetch_document(&identifier).await?;
        let title = document.title.trim();
        let body = document.body.trim();

        if title.is_empty() {
            info!("Skipping {}: no title", identifier);
            continue;
        }
        let length = body.chars().count();
        if length < min_body_chars {
            info!(
                "Skipping {}: body has {} characters, below {}",
                identifier, length, min_body_chars
            );
            continue;
        }

        return Ok(Some(SourceDocument {
            identifier,
            title: title.to_string(),
            body: body.to_string(),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::mock::MockSource;

    const BASE: &str = "https://news.example";

    fn long_body() -> String {
        "word ".repeat(200)
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        assert_eq!(
            resolve_href(BASE, "/health-news/sleep").unwrap(),
            "https://news.example/health-news/sleep"
        );
        assert_eq!(
            resolve_href(BASE, "https://other.example/a").unwrap(),
            "https://other.example/a"
        );
        assert!(matches!(
            resolve_href("not a url", "/a"),
            Err(RelayError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_everything_seen_returns_none() {
        let source = MockSource::new(BASE)
            .with_article("/a", "A", &long_body())
            .with_article("/b", "B", &long_body());
        let seen = SeenSet::from_ids(["https://news.example/a", "https://news.example/b"]);
        let before = seen.clone();

        let result = fetch_unseen_document(&source, &seen, 500).await.unwrap();
        assert!(result.is_none());
        assert!(source.fetched().is_empty());
        assert_eq!(seen, before);
    }

    #[tokio::test]
    async fn test_quality_gate_boundary() {
        let source = MockSource::new(BASE)
            .with_article("/short", "Short", &"x".repeat(499))
            .with_article("/exact", "Exact", &"y".repeat(500));

        let doc = fetch_unseen_document(&source, &SeenSet::new(), 500)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.identifier, "https://news.example/exact");
        assert_eq!(doc.body.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_only_short_candidates_returns_none() {
        let source = MockSource::new(BASE).with_article("/teaser", "Teaser", "Read more...");
        let result = fetch_unseen_document(&source, &SeenSet::new(), 500).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_first_match_policy() {
        let source = MockSource::new(BASE)
            .with_article("/a", "A", &long_body())
            .with_article("/b", "B", "too short")
            .with_article("/c", "C", &long_body())
            .with_article("/d", "D", &long_body());
        let seen = SeenSet::from_ids(["https://news.example/a"]);

        let doc = fetch_unseen_document(&source, &seen, 500).await.unwrap().unwrap();
        assert_eq!(doc.identifier, "https://news.example/c");
        assert_eq!(doc.title, "C");
        assert_eq!(
            source.fetched(),
            vec!["https://news.example/b", "https://news.example/c"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_links_fetched_once() {
        let source = MockSource::new(BASE)
            .with_article("/b", "B", "short")
            .with_candidate("https://news.example/b");

        let result = fetch_unseen_document(&source, &SeenSet::new(), 500).await.unwrap();
        assert!(result.is_none());
        assert_eq!(source.fetched().len(), 1);
    }

    #[tokio::test]
    async fn test_untitled_article_is_skipped() {
        let source = MockSource::new(BASE)
            .with_article("/untitled", "   ", &long_body())
            .with_article("/titled", "Titled", &long_body());

        let doc = fetch_unseen_document(&source, &SeenSet::new(), 500)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.title, "Titled");
    }

    #[tokio::test]
    async fn test_fetch_error_propagates() {
        let source = MockSource::new(BASE).with_candidate("/missing");
        let result = fetch_unseen_document(&source, &SeenSet::new(), 500).await;
        assert!(matches!(result, Err(RelayError::Source(_))));
    }

    #[tokio::test]
    async fn test_body_is_trimmed() {
        let body = format!("  {}  ", "z".repeat(600));
        let source = MockSource::new(BASE).with_article("/a", " A ", &body);

        let doc = fetch_unseen_document(&source, &SeenSet::new(), 500)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.title, "A");
        assert_eq!(doc.body, "z".repeat(600));
    }
}
