//! Per-run automation session
//!
//! One Chrome process and one tab per run. The content source (when it is
//! browser-driven) and the publishing surface share that tab.

use crate::browser::BrowserSession;
use crate::source::{BrowserSource, HttpSource};
use crate::surface::TistorySurface;
use async_trait::async_trait;
use relay_core::{
    AutomationSession, ContentSource, PublishingSurface, RelayConfig, Result, SessionLauncher,
    SourceDriver,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Launches Chrome with the configured settings
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: RelayConfig,
}

impl ChromeLauncher {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    async fn open(&self) -> Result<ChromeSession> {
        let browser = Arc::new(BrowserSession::launch_with_config(&self.config.browser).await?);

        let source: Box<dyn ContentSource> = match self.config.source.driver {
            SourceDriver::Browser => Box::new(BrowserSource::new(
                Arc::clone(&browser),
                self.config.source.clone(),
            )),
            SourceDriver::Http => Box::new(HttpSource::new(
                self.config.source.clone(),
                self.config.browser.user_agent.as_deref(),
            )?),
        };

        let surface = TistorySurface::new(
            Arc::clone(&browser),
            self.config.publisher.clone(),
            self.config.paths.session_state.clone(),
        );

        info!("Automation session opened ({:?} source)", self.config.source.driver);
        Ok(ChromeSession {
            browser,
            source,
            surface,
        })
    }
}

/// The open browser plus the collaborators bound to it
pub struct ChromeSession {
    browser: Arc<BrowserSession>,
    source: Box<dyn ContentSource>,
    surface: TistorySurface,
}

#[async_trait]
impl AutomationSession for ChromeSession {
    fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    fn surface(&self) -> &dyn PublishingSurface {
        &self.surface
    }

    async fn close(self) -> Result<()> {
        let ChromeSession {
            browser,
            source,
            surface,
        } = self;
        drop(source);
        drop(surface);

        match Arc::try_unwrap(browser) {
            Ok(browser) => browser.close().await,
            Err(_) => {
                warn!("Browser still referenced at close; it will shut down when released");
                Ok(())
            }
        }
    }
}
