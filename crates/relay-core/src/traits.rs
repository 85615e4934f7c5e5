//! Collaborator interfaces
//!
//! The pipeline only ever sees these traits. Concrete drivers (Chrome,
//! HTTP scraping, the Gemini API) live in their own crates, and the mocks in
//! [`crate::mock`] stand in for them in tests.

use async_trait::async_trait;

use crate::config::PublisherCredentials;
use crate::types::{Candidate, FetchedDocument, TransformedContent};
use crate::Result;

/// Listing and document retrieval
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Candidate links in the listing's presentation order
    async fn list_candidates(&self) -> Result<Vec<Candidate>>;

    /// Retrieve title and body text of an absolute URL
    async fn fetch_document(&self, url: &str) -> Result<FetchedDocument>;

    /// Base URL relative hrefs are resolved against
    fn base_url(&self) -> &str;
}

/// Single-shot generative text service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Capability set of the publishing surface
#[async_trait]
pub trait PublishingSurface: Send + Sync {
    /// Establish an authenticated session
    async fn authenticate(&self, credentials: &PublisherCredentials) -> Result<()>;

    /// Open the editor and fill in the article
    async fn compose(&self, content: &TransformedContent) -> Result<()>;

    /// Trigger publish, choose public visibility, and confirm
    async fn submit(&self) -> Result<()>;

    /// Rendered image of the current surface (PNG)
    async fn snapshot(&self) -> Result<Vec<u8>>;

    /// Raw markup of the current surface
    async fn dump_state(&self) -> Result<String>;

    /// Current location (URL) of the surface
    async fn location(&self) -> Result<String>;
}

/// An open, externally-resourced automation session
#[async_trait]
pub trait AutomationSession: Send + Sync {
    fn source(&self) -> &dyn ContentSource;

    fn surface(&self) -> &dyn PublishingSurface;

    /// Release the session. Called exactly once per opened session.
    async fn close(self) -> Result<()>;
}

/// Opens automation sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Session: AutomationSession;

    async fn open(&self) -> Result<Self::Session>;
}
