//! # relay-store
//!
//! File-backed state for the relay pipeline:
//!
//! - [`seen`]: the persisted seen-set of published source URLs
//! - [`assets`]: the read-only pool of image references
//! - [`picker`]: random selection of images from that pool

pub mod assets;
pub mod picker;
pub mod seen;

pub use assets::load_asset_pool;
pub use picker::{pick, pick_assets};
pub use seen::SeenSetStore;
