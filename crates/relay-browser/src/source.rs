//! Content sources
//!
//! Both sources read the same selectors from [`SourceConfig`]: the link
//! selector on the listing page, and title/body selectors on article pages.
//! [`BrowserSource`] drives the shared tab; [`HttpSource`] fetches and parses
//! the HTML directly, for sites that render server-side.

use crate::browser::BrowserSession;
use async_trait::async_trait;
use relay_core::{Candidate, ContentSource, FetchedDocument, RelayError, Result, SourceConfig};
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{debug, info};

/// Content source backed by the session's browser tab
pub struct BrowserSource {
    session: Arc<BrowserSession>,
    config: SourceConfig,
}

impl BrowserSource {
    pub fn new(session: Arc<BrowserSession>, config: SourceConfig) -> Self {
        Self { session, config }
    }
}

#[async_trait]
impl ContentSource for BrowserSource {
    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        self.session.navigate(&self.config.listing_url).await?;
        let hrefs = self.session.get_hrefs(&self.config.link_selector).await?;

        info!("Found {} candidate links on {}", hrefs.len(), self.config.listing_url);
        Ok(hrefs.into_iter().map(Candidate::new).collect())
    }

    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument> {
        self.session.navigate(url).await?;

        let title = self.session.get_text_content(&self.config.title_selector).await?;
        let body = self.session.get_text_content(&self.config.body_selector).await?;

        debug!("Read {} ({} body chars)", url, body.chars().count());
        Ok(FetchedDocument { title, body })
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

/// Content source using plain HTTP requests
pub struct HttpSource {
    http: reqwest::Client,
    config: SourceConfig,
}

impl HttpSource {
    pub fn new(config: SourceConfig, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ua) = user_agent {
            builder = builder.user_agent(ua);
        }
        let http = builder
            .build()
            .map_err(|e| RelayError::Source(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RelayError::Source(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Source(format!("{} returned {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| RelayError::Source(format!("Failed to read {}: {}", url, e)))
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let html = self.get(&self.config.listing_url).await?;
        let candidates = parse_listing(&html, &self.config.link_selector)?;

        info!("Found {} candidate links on {}", candidates.len(), self.config.listing_url);
        Ok(candidates)
    }

    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument> {
        let html = self.get(url).await?;
        parse_article(&html, &self.config.title_selector, &self.config.body_selector)
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| RelayError::Configuration(format!("Invalid selector '{}': {}", css, e)))
}

/// Extract `href`s of elements matching `link_selector`, in document order
pub fn parse_listing(html: &str, link_selector: &str) -> Result<Vec<Candidate>> {
    let links = selector(link_selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&links)
        .filter_map(|el| el.value().attr("href"))
        .map(Candidate::new)
        .collect())
}

/// Extract trimmed title and body text; missing elements yield empty strings
pub fn parse_article(html: &str, title_selector: &str, body_selector: &str) -> Result<FetchedDocument> {
    let title_sel = selector(title_selector)?;
    let body_sel = selector(body_selector)?;
    let document = Html::parse_document(html);

    let text_of = |sel: &Selector| {
        document
            .select(sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    };

    Ok(FetchedDocument {
        title: text_of(&title_sel),
        body: text_of(&body_sel),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <a class="css-a63gyd" href="/health-news/sleep">Sleep</a>
          <a class="nav" href="/about">About</a>
          <a class="css-a63gyd" href="https://www.healthline.com/health-news/diet">Diet</a>
          <a class="css-a63gyd">No href</a>
        </body></html>
    "#;

    const ARTICLE: &str = r#"
        <html><body>
          <h1 class="css-1q7njkh">  Better sleep, longer life </h1>
          <article class="article-body"><p>First.</p><p>Second.</p></article>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_keeps_order_and_filters() {
        let candidates = parse_listing(LISTING, "a.css-a63gyd").unwrap();
        assert_eq!(
            candidates,
            vec![
                Candidate::new("/health-news/sleep"),
                Candidate::new("https://www.healthline.com/health-news/diet"),
            ]
        );
    }

    #[test]
    fn test_parse_article() {
        let doc = parse_article(ARTICLE, "h1.css-1q7njkh", "article.article-body").unwrap();
        assert_eq!(doc.title, "Better sleep, longer life");
        assert_eq!(doc.body, "First.Second.");
    }

    #[test]
    fn test_parse_article_missing_elements() {
        let doc = parse_article("<html></html>", "h1", "article").unwrap();
        assert!(doc.title.is_empty());
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_configuration_error() {
        let result = parse_listing(LISTING, "a[[");
        assert!(matches!(result, Err(RelayError::Configuration(_))));
    }

    #[test]
    fn test_http_source_base_url() {
        let source = HttpSource::new(SourceConfig::default(), Some("relay-test")).unwrap();
        assert_eq!(source.base_url(), "https://www.healthline.com");
    }
}
