//! Cache sync gate
//!
//! Aggregates the readiness of a fixed set of data feeds into a single
//! blocking predicate. Feeds are registered before startup; each informer
//! driver then marks its own feed synced once the initial listing is loaded.

use super::{FeedId, FeedState, Store, SyncedFeeds};
use std::collections::BTreeMap;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Errors raised while registering feeds
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Feed '{feed}' registered after the sync wait began")]
    Sealed { feed: FeedId },

    #[error("Feed '{feed}' is already registered")]
    Duplicate { feed: FeedId },
}

struct FeedEntry {
    state: FeedState,
    store: Store,
}

#[derive(Default)]
struct GateState {
    feeds: BTreeMap<FeedId, FeedEntry>,
    sealed: bool,
}

impl GateState {
    fn all_synced(&self) -> bool {
        self.feeds
            .values()
            .all(|entry| entry.state == FeedState::Synced)
    }
}

/// Readiness aggregation over registered feeds.
///
/// Every mutation goes through the watch channel's lock, so feeds reporting
/// at the same instant never lose an update, and waiters are woken by the
/// channel rather than by polling.
pub struct SyncGate {
    state: watch::Sender<GateState>,
}

impl Default for SyncGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(GateState::default());
        Self { state }
    }

    /// Register a feed to track and return its backing store.
    ///
    /// Fails once [`wait_for_sync`](Self::wait_for_sync) has been called.
    pub fn register(&self, feed: impl Into<FeedId>) -> Result<Store, GateError> {
        let feed = feed.into();
        let mut result = Err(GateError::Sealed { feed: feed.clone() });

        self.state.send_if_modified(|state| {
            if state.sealed {
                return false;
            }
            if state.feeds.contains_key(&feed) {
                result = Err(GateError::Duplicate { feed: feed.clone() });
                return false;
            }
            let store = Store::new();
            state.feeds.insert(
                feed.clone(),
                FeedEntry {
                    state: FeedState::NotStarted,
                    store: store.clone(),
                },
            );
            result = Ok(store);
            true
        });

        if result.is_ok() {
            tracing::debug!(feed = %feed, "Feed registered");
        }
        result
    }

    /// Record that a driver has started populating `feed`
    pub fn mark_running(&self, feed: &FeedId) {
        self.state.send_if_modified(|state| match state.feeds.get_mut(feed) {
            Some(entry) if entry.state == FeedState::NotStarted => {
                entry.state = FeedState::Running;
                true
            }
            _ => false,
        });
    }

    /// Mark `feed` as synced.
    ///
    /// Only the first call for a feed changes anything; it returns `true`.
    /// Repeated calls and unknown feeds return `false`.
    pub fn mark_synced(&self, feed: &FeedId) -> bool {
        let mut known = true;
        let transitioned = self
            .state
            .send_if_modified(|state| match state.feeds.get_mut(feed) {
                Some(entry) if entry.state != FeedState::Synced => {
                    entry.state = FeedState::Synced;
                    true
                }
                Some(_) => false,
                None => {
                    known = false;
                    false
                }
            });

        if transitioned {
            tracing::debug!(feed = %feed, "Feed synced");
        } else if !known {
            tracing::warn!(feed = %feed, "Ignoring sync report for unregistered feed");
        }
        transitioned
    }

    /// Wait until every registered feed has synced.
    ///
    /// Returns `true` once all feeds are synced, or `false` if `cancel` fires
    /// first. Calling this closes registration.
    pub async fn wait_for_sync(&self, cancel: &CancellationToken) -> bool {
        self.state.send_if_modified(|state| {
            let changed = !state.sealed;
            state.sealed = true;
            changed
        });

        let mut rx = self.state.subscribe();
        tokio::select! {
            biased;
            synced = rx.wait_for(GateState::all_synced) => synced.is_ok(),
            _ = cancel.cancelled() => false,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.state.borrow().all_synced()
    }

    pub fn state(&self, feed: &FeedId) -> Option<FeedState> {
        self.state.borrow().feeds.get(feed).map(|entry| entry.state)
    }

    /// Registered feeds and their current state, ordered by id
    pub fn feeds(&self) -> Vec<(FeedId, FeedState)> {
        self.state
            .borrow()
            .feeds
            .iter()
            .map(|(id, entry)| (id.clone(), entry.state))
            .collect()
    }

    /// Store for `feed`, available only once that feed has synced
    pub fn store(&self, feed: &FeedId) -> Option<Store> {
        self.state
            .borrow()
            .feeds
            .get(feed)
            .filter(|entry| entry.state == FeedState::Synced)
            .map(|entry| entry.store.clone())
    }

    /// Read-only view over every feed that has synced so far
    pub fn synced_feeds(&self) -> SyncedFeeds {
        let state = self.state.borrow();
        SyncedFeeds::new(
            state
                .feeds
                .iter()
                .filter(|(_, entry)| entry.state == FeedState::Synced)
                .map(|(id, entry)| (id.clone(), entry.store.clone())),
        )
    }
}
