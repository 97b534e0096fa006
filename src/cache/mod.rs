//! Informer-backed caches and the readiness gate in front of them.

mod gate;
mod store;

pub use gate::{GateError, SyncGate};
pub use store::{FeedId, FeedState, Store};

use std::collections::BTreeMap;

/// Stores of feeds that have completed their initial sync.
///
/// This is the only way the scheduler core sees a feed, so it can never read
/// a store that is still being filled by its first listing.
#[derive(Clone, Debug, Default)]
pub struct SyncedFeeds {
    stores: BTreeMap<FeedId, Store>,
}

impl SyncedFeeds {
    pub(crate) fn new(stores: impl IntoIterator<Item = (FeedId, Store)>) -> Self {
        Self {
            stores: stores.into_iter().collect(),
        }
    }

    pub fn get(&self, feed: &str) -> Option<&Store> {
        self.stores.get(&FeedId::from(feed))
    }

    pub fn ids(&self) -> impl Iterator<Item = &FeedId> {
        self.stores.keys()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
