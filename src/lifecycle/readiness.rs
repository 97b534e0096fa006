//! Readiness probe for the scheduling service.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;

/// Ready once caches have synced, until shutdown begins. Cheap to clone; no I/O.
#[derive(Clone)]
pub struct ReadinessHandler {
    ready: Arc<AtomicBool>,
    shutdown_token: CancellationToken,
}

impl ReadinessHandler {
    pub(crate) fn new(ready: Arc<AtomicBool>, shutdown_token: CancellationToken) -> Self {
        Self {
            ready,
            shutdown_token,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst) && !self.shutdown_token.is_cancelled()
    }
}
