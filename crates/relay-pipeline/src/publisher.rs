//! Publisher: drives a [`PublishingSurface`] through the publish state machine
//!
//! Single attempt. Every step error is turned into a `Failed` event, and the
//! failure is reported as a [`PublishOutcome`] carrying diagnostics. Nothing
//! escapes as an error.

use crate::diagnostics::DiagnosticsCollector;
use crate::publish_state::{transition, PublishEvent, PublishState, PublishStep};
use relay_core::{PublishOutcome, PublisherCredentials, PublishingSurface, TransformedContent};
use std::time::Duration;
use tracing::{error, info};

pub struct Publisher {
    credentials: PublisherCredentials,
    settle: Duration,
    diagnostics: DiagnosticsCollector,
}

impl Publisher {
    pub fn new(
        credentials: PublisherCredentials,
        settle: Duration,
        diagnostics: DiagnosticsCollector,
    ) -> Self {
        Self {
            credentials,
            settle,
            diagnostics,
        }
    }

    /// Publish `content` through `surface`
    pub async fn publish(
        &self,
        surface: &dyn PublishingSurface,
        content: &TransformedContent,
    ) -> PublishOutcome {
        info!("Publishing: {}", content.title);
        let mut state = PublishState::Unauthenticated;

        while let Some(step) = state.next_step() {
            let result = match step {
                PublishStep::Authenticate => surface.authenticate(&self.credentials).await,
                PublishStep::Compose => surface.compose(content).await,
                PublishStep::Submit => surface.submit().await,
                PublishStep::Settle => {
                    tokio::time::sleep(self.settle).await;
                    Ok(())
                }
            };

            let event = match result {
                Ok(()) => PublishEvent::Completed(step),
                Err(e) => PublishEvent::Failed {
                    step,
                    error: e.to_string(),
                },
            };
            state = transition(state, event);
            info!("Publish state: {:?}", state);
        }

        match state {
            PublishState::Published => {
                info!("Published: {}", content.title);
                PublishOutcome::published()
            }
            PublishState::Failed { step, error } => {
                error!("Publish failed at {}: {}", step, error);
                let diagnostics = self.diagnostics.collect(surface).await;
                PublishOutcome::failed(step.to_string(), error, diagnostics)
            }
            other => {
                let diagnostics = self.diagnostics.collect(surface).await;
                PublishOutcome::failed("settle", format!("stopped in {:?}", other), diagnostics)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::mock::MockSurface;

    fn publisher(dir: &tempfile::TempDir) -> Publisher {
        Publisher::new(
            PublisherCredentials {
                username: "writer".to_string(),
                password: "pw".to_string(),
            },
            Duration::ZERO,
            DiagnosticsCollector::new(dir.path().join("error_screenshot.png")),
        )
    }

    fn content() -> TransformedContent {
        TransformedContent {
            title: "Title".to_string(),
            body: "Body".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_success() {
        let dir = tempfile::tempdir().unwrap();
        let surface = MockSurface::new();

        let outcome = publisher(&dir).publish(&surface, &content()).await;

        assert!(outcome.success);
        assert!(outcome.diagnostics.is_none());
        assert_eq!(surface.calls(), vec!["authenticate", "compose", "submit"]);
        assert_eq!(surface.composed(), Some(content()));
        assert!(!dir.path().join("error_screenshot.png").exists());
    }

    #[tokio::test]
    async fn test_failure_stops_sequence_and_collects_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let surface = MockSurface::new().failing_at("compose");

        let outcome = publisher(&dir).publish(&surface, &content()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.failed_step.as_deref(), Some("compose"));
        assert!(outcome.error.unwrap().contains("mock failure during compose"));
        assert_eq!(surface.calls(), vec!["authenticate", "compose"]);

        let diagnostics = outcome.diagnostics.unwrap();
        assert!(diagnostics.screenshot.is_some());
        assert!(dir.path().join("error_screenshot.png").exists());
    }

    #[tokio::test]
    async fn test_authentication_failure() {
        let dir = tempfile::tempdir().unwrap();
        let surface = MockSurface::new().failing_at("authenticate");

        let outcome = publisher(&dir).publish(&surface, &content()).await;

        assert_eq!(outcome.failed_step.as_deref(), Some("authenticate"));
        assert_eq!(surface.calls(), vec!["authenticate"]);
        assert!(surface.composed().is_none());
    }

    #[tokio::test]
    async fn test_failure_with_broken_snapshot_is_still_reported() {
        let dir = tempfile::tempdir().unwrap();
        let surface = MockSurface::new()
            .failing_at("submit")
            .with_broken_snapshot();

        let outcome = publisher(&dir).publish(&surface, &content()).await;

        assert!(!outcome.success);
        let diagnostics = outcome.diagnostics.unwrap();
        assert!(diagnostics.screenshot.is_none());
        assert!(diagnostics.state_dump.is_some());
    }
}
