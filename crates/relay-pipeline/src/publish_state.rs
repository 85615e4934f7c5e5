//! Pure state machine for the publish sequence
//!
//! No async, no I/O. The [`Publisher`](crate::Publisher) asks the state which
//! step comes next, performs it, and feeds the result back as an event.
//! Invalid transitions go to `Failed` (never panic).

use std::fmt;

/// One step of the publish sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    /// Acquire an authenticated session
    Authenticate,
    /// Open the editor, pick the category, fill title and body
    Compose,
    /// Publish, choose public visibility, confirm
    Submit,
    /// Wait for the surface to finish processing
    Settle,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticate => write!(f, "authenticate"),
            Self::Compose => write!(f, "compose"),
            Self::Submit => write!(f, "submit"),
            Self::Settle => write!(f, "settle"),
        }
    }
}

/// Publish sequence state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishState {
    /// Nothing done yet
    Unauthenticated,
    /// Logged in, editor not opened
    Authenticated,
    /// Editor populated, awaiting submission
    Composing,
    /// Publish confirmed, surface settling
    Submitted,
    /// Post is live
    Published,
    /// Absorbing failure state
    Failed { step: PublishStep, error: String },
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishEvent {
    Completed(PublishStep),
    Failed { step: PublishStep, error: String },
}

impl PublishState {
    /// The step to perform from this state, or `None` if terminal
    pub fn next_step(&self) -> Option<PublishStep> {
        match self {
            Self::Unauthenticated => Some(PublishStep::Authenticate),
            Self::Authenticated => Some(PublishStep::Compose),
            Self::Composing => Some(PublishStep::Submit),
            Self::Submitted => Some(PublishStep::Settle),
            Self::Published | Self::Failed { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_step().is_none()
    }
}

/// Pure state transition function
pub fn transition(state: PublishState, event: PublishEvent) -> PublishState {
    match (state, event) {
        (state @ PublishState::Failed { .. }, _) => state,
        (PublishState::Published, event) => PublishState::Failed {
            step: PublishStep::Settle,
            error: format!("event {:?} after publishing", event),
        },

        (_, PublishEvent::Failed { step, error }) => PublishState::Failed { step, error },

        (PublishState::Unauthenticated, PublishEvent::Completed(PublishStep::Authenticate)) => {
            PublishState::Authenticated
        }
        (PublishState::Authenticated, PublishEvent::Completed(PublishStep::Compose)) => {
            PublishState::Composing
        }
        (PublishState::Composing, PublishEvent::Completed(PublishStep::Submit)) => {
            PublishState::Submitted
        }
        (PublishState::Submitted, PublishEvent::Completed(PublishStep::Settle)) => {
            PublishState::Published
        }

        (state, PublishEvent::Completed(step)) => PublishState::Failed {
            step,
            error: format!("{} completed out of order in state {:?}", step, state),
        },
    }
}
