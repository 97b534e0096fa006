//! Informer drivers
//!
//! An informer is a background watch loop that keeps one [`Store`] in step
//! with a remote resource collection. The coordinator launches one driver per
//! tracked feed; each driver reports to the [`SyncGate`] once its informer
//! has loaded the initial listing.

use crate::cache::{FeedId, GateError, Store, SyncGate};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// A watch loop populating a single feed
#[async_trait]
pub trait Informer: Send + Sync {
    /// Feed this informer populates
    fn feed_id(&self) -> FeedId;

    /// Run until `shutdown` fires.
    ///
    /// Implementations write into `reporter.store()` and call
    /// [`FeedReporter::mark_synced`] once the first full listing is in place.
    async fn run(&self, reporter: FeedReporter, shutdown: CancellationToken);
}

/// Shared factory owning the secondary informers that are not tracked
/// individually by the coordinator
#[async_trait]
pub trait InformerFactory: Send + Sync {
    /// Launch every informer requested from this factory. Does not block.
    fn start(&self, shutdown: CancellationToken);

    /// Wait for the factory's informers to sync, or for `shutdown`.
    ///
    /// Returns the sync result per resource name.
    async fn wait_for_cache_sync(&self, shutdown: CancellationToken) -> HashMap<String, bool>;
}

/// Write side of a tracked feed, handed to its informer
#[derive(Clone)]
pub struct FeedReporter {
    feed: FeedId,
    store: Store,
    gate: Arc<SyncGate>,
}

impl FeedReporter {
    pub fn feed(&self) -> &FeedId {
        &self.feed
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Report the initial listing as loaded. Safe to call more than once.
    pub fn mark_synced(&self) -> bool {
        self.gate.mark_synced(&self.feed)
    }
}

/// Owns one informer and launches it as an independent task
pub struct InformerDriver {
    informer: Arc<dyn Informer>,
    reporter: FeedReporter,
}

impl InformerDriver {
    /// Register the informer's feed with `gate`
    pub fn new(informer: Arc<dyn Informer>, gate: Arc<SyncGate>) -> Result<Self, GateError> {
        let feed = informer.feed_id();
        let store = gate.register(feed.clone())?;
        Ok(Self {
            informer,
            reporter: FeedReporter { feed, store, gate },
        })
    }

    pub fn feed(&self) -> &FeedId {
        self.reporter.feed()
    }

    /// Spawn the informer loop; it stops when `shutdown` fires
    pub fn spawn(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let feed = self.reporter.feed.clone();
        self.reporter.gate.mark_running(&feed);

        let informer = Arc::clone(&self.informer);
        let reporter = self.reporter.clone();
        let span = tracing::info_span!("informer", feed = %feed);

        tokio::spawn(
            async move {
                tracing::debug!("Informer started");
                informer.run(reporter, shutdown).await;
                tracing::debug!("Informer stopped");
            }
            .instrument(span),
        )
    }
}
