//! # relay-agent
//!
//! Generative text side of the relay pipeline.
//!
//! - [`client`]: single-shot Gemini `generateContent` client
//! - [`transform`]: prompt construction and structured response parsing
//!
//! The transformer only depends on [`relay_core::TextGenerator`], so any
//! provider can be swapped in behind it.

pub mod client;
pub mod transform;
mod types;

pub use client::GeminiClient;
pub use transform::{build_prompt, missing_assets, parse_response, ContentTransformer, SEPARATOR};
pub use types::*;
