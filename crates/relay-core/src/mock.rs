//! Mock collaborators for testing
//!
//! Each mock records what was asked of it. Clones share their records, so a
//! test can keep a handle while the pipeline owns another.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::PublisherCredentials;
use crate::traits::{
    AutomationSession, ContentSource, PublishingSurface, SessionLauncher, TextGenerator,
};
use crate::types::{Candidate, FetchedDocument, TransformedContent};
use crate::{RelayError, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory listing and documents
#[derive(Clone)]
pub struct MockSource {
    base_url: String,
    candidates: Vec<Candidate>,
    documents: HashMap<String, FetchedDocument>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new("https://news.example")
    }
}

impl MockSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            candidates: Vec::new(),
            documents: HashMap::new(),
            fetched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a listed candidate together with the document served for its absolute URL
    pub fn with_article(mut self, href: &str, title: &str, body: &str) -> Self {
        self.candidates.push(Candidate::new(href));
        self.documents.insert(
            self.absolute(href),
            FetchedDocument {
                title: title.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    /// Add a listed candidate with no document behind it
    pub fn with_candidate(mut self, href: &str) -> Self {
        self.candidates.push(Candidate::new(href));
        self
    }

    /// URLs passed to `fetch_document`, in call order
    pub fn fetched(&self) -> Vec<String> {
        lock(&self.fetched).clone()
    }

    fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), href.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.candidates.clone())
    }

    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument> {
        lock(&self.fetched).push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| RelayError::Source(format!("No mock document for: {}", url)))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Generator returning a canned reply
#[derive(Clone)]
pub struct MockGenerator {
    reply: std::result::Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        lock(&self.prompts).push(prompt.to_string());
        self.reply.clone().map_err(RelayError::Api)
    }
}

/// Publishing surface that can be told to fail at one capability
#[derive(Clone, Default)]
pub struct MockSurface {
    fail_at: Option<&'static str>,
    fail_snapshot: bool,
    calls: Arc<Mutex<Vec<String>>>,
    composed: Arc<Mutex<Option<TransformedContent>>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the named capability: "authenticate", "compose" or "submit"
    pub fn failing_at(mut self, step: &'static str) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Make diagnostic snapshots fail as well
    pub fn with_broken_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }

    /// Capabilities invoked, in call order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Content passed to `compose`, if any
    pub fn composed(&self) -> Option<TransformedContent> {
        lock(&self.composed).clone()
    }

    fn record(&self, step: &'static str) -> Result<()> {
        lock(&self.calls).push(step.to_string());
        if self.fail_at == Some(step) {
            return Err(RelayError::Browser(format!("mock failure during {}", step)));
        }
        Ok(())
    }
}

#[async_trait]
impl PublishingSurface for MockSurface {
    async fn authenticate(&self, _credentials: &PublisherCredentials) -> Result<()> {
        self.record("authenticate")
    }

    async fn compose(&self, content: &TransformedContent) -> Result<()> {
        self.record("compose")?;
        *lock(&self.composed) = Some(content.clone());
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        self.record("submit")
    }

    async fn snapshot(&self) -> Result<Vec<u8>> {
        if self.fail_snapshot {
            return Err(RelayError::Browser("mock snapshot failure".to_string()));
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn dump_state(&self) -> Result<String> {
        Ok(format!("<div id=\"editor\">{}</div>", "x".repeat(2000)))
    }

    async fn location(&self) -> Result<String> {
        Ok("https://blog.example/manage/newpost".to_string())
    }
}

/// Session handing out the mock source and surface
pub struct MockSession {
    source: MockSource,
    surface: MockSurface,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl AutomationSession for MockSession {
    fn source(&self) -> &dyn ContentSource {
        &self.source
    }

    fn surface(&self) -> &dyn PublishingSurface {
        &self.surface
    }

    async fn close(self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launcher counting how many sessions were opened and closed
#[derive(Clone)]
pub struct MockLauncher {
    source: MockSource,
    surface: MockSurface,
    fail_open: bool,
    opens: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl MockLauncher {
    pub fn new(source: MockSource, surface: MockSurface) -> Self {
        Self {
            source,
            surface,
            fail_open: false,
            opens: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make `open` fail, as if the browser could not start
    pub fn failing_to_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    type Session = MockSession;

    async fn open(&self) -> Result<MockSession> {
        if self.fail_open {
            return Err(RelayError::Browser("mock launch failure".to_string()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            source: self.source.clone(),
            surface: self.surface.clone(),
            closes: Arc::clone(&self.closes),
        })
    }
}
