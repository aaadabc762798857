use std::future::Future;

use anyhow::Result;

use crate::daemon::collection::KeyEvent;

/// Represents a handler of key press events. Handlers for different events run concurrently,
/// so implementations only take `&self`.
pub trait EventProcessor: Send + Sync + 'static {
    fn process_next(&self, event: KeyEvent) -> impl Future<Output = Result<()>> + Send;

    /// Called once after the last event was processed.
    fn finalize(&self) -> impl Future<Output = Result<()>> + Send;
}
