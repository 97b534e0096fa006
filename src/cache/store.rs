use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a tracked data feed ("pods", "nodes", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedId(String);

impl FeedId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeedId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FeedId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Running state of a feed as seen by the sync gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FeedState {
    NotStarted,
    Running,
    Synced,
}

/// Locally cached snapshot of one resource collection, keyed by object key
/// (usually `namespace/name`).
///
/// Cloning is cheap: all clones share the same underlying map.
#[derive(Clone, Default)]
pub struct Store {
    items: Arc<DashMap<String, Value>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, object: Value) -> Option<Value> {
        self.items.insert(key.into(), object)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.items.remove(key).map(|(_, object)| object)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.items.get(key).map(|object| object.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.items.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn list(&self) -> Vec<Value> {
        self.items.iter().map(|e| e.value().clone()).collect()
    }

    /// Replace the whole contents with a fresh listing.
    ///
    /// Keys missing from `objects` are dropped; this is what an informer does
    /// after a full relist.
    pub fn replace<I, K>(&self, objects: I)
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let fresh: HashMap<String, Value> = objects
            .into_iter()
            .map(|(key, object)| (key.into(), object))
            .collect();
        self.items.retain(|key, _| fresh.contains_key(key));
        for (key, object) in fresh {
            self.items.insert(key, object);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("len", &self.len()).finish()
    }
}
