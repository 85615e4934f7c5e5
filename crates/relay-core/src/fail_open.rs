//! Fail-open helper for infrastructure operations
//!
//! Releasing the automation session and collecting failure diagnostics must
//! never turn a finished run into a crashed one. Those operations go through
//! [`fail_open`], which logs the error and yields `None`.
//!
//! DO NOT use fail-open for pipeline stages: fetch, transform, publish and the
//! seen-set commit all propagate their errors.

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Execute an operation that should fail open
///
/// Logs the error via `tracing::warn!` on failure and returns `None`.
///
/// ```no_run
/// use relay_core::fail_open::fail_open;
/// use relay_core::Result;
///
/// async fn release() -> Result<()> {
///     Ok(())
/// }
///
/// async fn example() {
///     let released = fail_open("session_close", || release()).await;
///     assert!(released.is_some());
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (fail-open): {}", operation_name, e);
            None
        }
    }
}
