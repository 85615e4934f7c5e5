//! Tistory publishing surface
//!
//! Drives the blog's admin UI through the shared tab. Every input target is a
//! selector from [`SurfaceSelectors`](relay_core::SurfaceSelectors), so markup
//! changes are a config edit rather than a code change.

use crate::browser::BrowserSession;
use crate::pattern::UrlPattern;
use crate::screenshot::{capture_png, CaptureArea};
use crate::session_state::restore_cookies;
use async_trait::async_trait;
use relay_core::fail_open::fail_open;
use relay_core::{
    PublisherConfig, PublisherCredentials, PublishingSurface, RelayError, Result,
    TransformedContent,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct TistorySurface {
    session: Arc<BrowserSession>,
    config: PublisherConfig,
    session_state: PathBuf,
}

impl TistorySurface {
    pub fn new(session: Arc<BrowserSession>, config: PublisherConfig, session_state: PathBuf) -> Self {
        Self {
            session,
            config,
            session_state,
        }
    }

    fn manage_url(&self) -> String {
        format!("{}/manage", self.config.blog_url.trim_end_matches('/'))
    }

    fn new_post_url(&self) -> String {
        format!("{}/manage/newpost", self.config.blog_url.trim_end_matches('/'))
    }

    async fn select_category(&self) -> Result<()> {
        let selectors = &self.config.selectors;
        self.session.click(&selectors.category_button).await?;

        let found = self
            .session
            .click_by_text(&selectors.category_item, &self.config.category)
            .await?;
        if !found {
            return Err(RelayError::ElementNotFound {
                selector: format!("{} with text '{}'", selectors.category_item, self.config.category),
            });
        }

        debug!("Selected category {}", self.config.category);
        Ok(())
    }
}

#[async_trait]
impl PublishingSurface for TistorySurface {
    async fn authenticate(&self, credentials: &PublisherCredentials) -> Result<()> {
        let pattern = UrlPattern::new(&self.config.manage_url_pattern)?;
        let manage_url = self.manage_url();

        if self.session_state.exists() {
            let restored = fail_open("restore_session_state", || {
                restore_cookies(&self.session, &self.session_state)
            })
            .await;
            if restored.is_some() {
                self.session.navigate(&manage_url).await?;
                if pattern.matches(&self.session.get_url()) {
                    info!("Authenticated from saved session state");
                    return Ok(());
                }
                debug!("Saved session state was not accepted, logging in");
            }
        }

        info!("Opening {}", manage_url);
        self.session.navigate(&manage_url).await?;

        let selectors = &self.config.selectors;
        self.session.click(&selectors.login_button).await?;
        self.session
            .type_into(&selectors.username_input, &credentials.username)
            .await?;
        self.session
            .type_into(&selectors.password_input, &credentials.password)
            .await?;
        self.session.click(&selectors.login_submit).await?;

        self.session
            .wait_for_url(&pattern, Duration::from_secs(self.config.login_timeout_secs))
            .await?;

        info!("Logged in as {}", credentials.username);
        Ok(())
    }

    async fn compose(&self, content: &TransformedContent) -> Result<()> {
        let selectors = &self.config.selectors;

        self.session.navigate(&self.new_post_url()).await?;
        self.select_category().await?;

        self.session.click(&selectors.editor_mode_button).await?;
        self.session.click(&selectors.markdown_mode_option).await?;
        debug!("Switched editor to markdown mode");

        self.session
            .type_into(&selectors.title_input, &content.title)
            .await?;
        self.session
            .replace_content(&selectors.body_input, &content.body)
            .await?;

        info!("Composed post: {}", content.title);
        Ok(())
    }

    async fn submit(&self) -> Result<()> {
        let selectors = &self.config.selectors;

        self.session.click(&selectors.publish_button).await?;
        self.session.click(&selectors.public_option).await?;
        self.session.click(&selectors.confirm_button).await?;

        info!("Post submitted");
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<u8>> {
        capture_png(&self.session, CaptureArea::FullPage).await
    }

    async fn dump_state(&self) -> Result<String> {
        self.session.body_html().await
    }

    async fn location(&self) -> Result<String> {
        Ok(self.session.get_url())
    }
}
