//! # relay-pipeline
//!
//! The deduplicating content pipeline:
//!
//! ```text
//! load seen-set -> fetch unseen article -> pick assets -> transform -> publish
//!                                                          -> commit seen-set (success only)
//! ```
//!
//! Each stage is a separate function or type so it can be tested alone; the
//! [`Sequencer`] only wires them together and owns the automation session.

pub mod diagnostics;
pub mod fetcher;
pub mod publish_state;
pub mod publisher;
pub mod sequencer;

pub use diagnostics::{truncate_chars, DiagnosticsCollector, STATE_DUMP_LIMIT};
pub use fetcher::{fetch_unseen_document, resolve_href};
pub use publish_state::{transition, PublishEvent, PublishState, PublishStep};
pub use publisher::Publisher;
pub use sequencer::{RunOutcome, Sequencer};
