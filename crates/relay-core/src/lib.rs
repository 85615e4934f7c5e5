//! # relay-core
//!
//! Core types for the relay pipeline: scrape an article, rewrite it through a
//! generative text service, publish it to a blog, and remember what was
//! already published.
//!
//! ## Core Paradigm
//!
//! - Every stage talks to the outside world through a narrow trait
//! - Stages exchange the typed entities in [`types`], nothing else
//! - The seen-set is committed only after a confirmed publish
//! - One automation session per run, always released

mod config;
mod error;
pub mod fail_open;
pub mod mock;
mod traits;
mod types;

pub use config::*;
pub use error::{RelayError, Result};
pub use traits::*;
pub use types::*;
