//! Pipeline sequencer
//!
//! Wires the stages together for one run and owns the automation session.
//! The seen-set is written back only after a successful publish; any error
//! ends the run with the persisted set untouched.

use crate::diagnostics::DiagnosticsCollector;
use crate::fetcher::fetch_unseen_document;
use crate::publisher::Publisher;
use relay_agent::ContentTransformer;
use relay_core::fail_open::fail_open;
use relay_core::{
    AutomationSession, Credentials, PublishOutcome, RelayConfig, Result, SessionLauncher,
    TextGenerator,
};
use relay_store::{load_asset_pool, pick_assets, SeenSetStore};
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// How a run ended, when it did not end in an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every listed article was already published or failed the quality gate
    NothingToDo,
    /// The article was published and recorded in the seen-set
    Published { identifier: String },
    /// The publish attempt failed; the seen-set was left as it was
    PublishFailed {
        identifier: String,
        outcome: PublishOutcome,
    },
}

pub struct Sequencer<L: SessionLauncher, G: TextGenerator> {
    config: RelayConfig,
    credentials: Credentials,
    launcher: L,
    store: SeenSetStore,
    transformer: ContentTransformer<G>,
    publisher: Publisher,
}

impl<L: SessionLauncher, G: TextGenerator> Sequencer<L, G> {
    pub fn new(config: RelayConfig, credentials: Credentials, launcher: L, generator: G) -> Self {
        let store = SeenSetStore::new(&config.paths.seen_set);
        let transformer = ContentTransformer::new(generator, config.generator.clone());
        let publisher = Publisher::new(
            credentials.publisher.clone(),
            Duration::from_secs(config.publisher.settle_secs),
            DiagnosticsCollector::new(&config.paths.screenshot),
        );

        Self {
            config,
            credentials,
            launcher,
            store,
            transformer,
            publisher,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn store(&self) -> &SeenSetStore {
        &self.store
    }

    /// Checks that must pass before any external system is touched
    fn preflight(&self) -> Result<()> {
        self.config.validate()?;
        Credentials::new(
            self.credentials.api_key.as_str(),
            self.credentials.publisher.username.as_str(),
            self.credentials.publisher.password.as_str(),
        )?;
        Ok(())
    }

    /// Execute one pipeline run
    ///
    /// The automation session is opened once and closed once, whatever the
    /// stages return. A failure to close is logged, never raised.
    #[instrument(name = "run", skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn run(&self) -> Result<RunOutcome> {
        if let Err(e) = self.preflight() {
            error!("Preflight failed: {}", e);
            return Err(e);
        }

        info!("Opening automation session");
        let session = self.launcher.open().await.map_err(|e| {
            error!("Could not open automation session: {}", e);
            e
        })?;

        let result = self.run_stages(&session).await;

        if fail_open("session_close", || session.close()).await.is_some() {
            debug!("Automation session closed");
        }

        match &result {
            Ok(outcome) => info!("Run finished: {:?}", outcome),
            Err(e) => error!("Run failed: {}", e),
        }
        result
    }

    async fn run_stages(&self, session: &L::Session) -> Result<RunOutcome> {
        let seen = self.store.load().await?;
        info!("Loaded {} published identifiers", seen.len());

        let document = match fetch_unseen_document(
            session.source(),
            &seen,
            self.config.source.min_body_chars,
        )
        .await?
        {
            Some(document) => document,
            None => {
                info!("No new article to publish, nothing to do");
                return Ok(RunOutcome::NothingToDo);
            }
        };

        let pool = load_asset_pool(&self.config.paths.asset_pool).await?;
        let assets = pick_assets(&pool, self.config.generator.asset_count)?;

        let content = self
            .transformer
            .transform(&document.title, &document.body, &assets)
            .await?;

        let outcome = self.publisher.publish(session.surface(), &content).await;
        if !outcome.success {
            return Ok(RunOutcome::PublishFailed {
                identifier: document.identifier,
                outcome,
            });
        }

        let seen = seen.append(document.identifier.clone());
        self.store.persist(&seen).await?;
        info!("Recorded {} as published", document.identifier);

        Ok(RunOutcome::Published {
            identifier: document.identifier,
        })
    }
}
