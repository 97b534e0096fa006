//! Seam to the external scheduler implementation.
//!
//! Nothing here schedules anything: these types describe what the scheduler
//! core is built from and how it is driven.

use crate::cache::SyncedFeeds;
use crate::client::ClusterClient;
use crate::config::{AlgorithmSource, ComponentConfig, Extender, Profile};
use crate::error::BoxError;
use crate::events::RecorderFactory;
use crate::informer::{Informer, InformerFactory};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Plugins registered outside the scheduler's built-in set, by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Value>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `name` was already registered
    pub fn register(&mut self, name: impl Into<String>, args: Value) -> bool {
        let name = name.into();
        if self.plugins.contains_key(&name) {
            return false;
        }
        self.plugins.insert(name, args);
        true
    }

    pub fn args(&self, name: &str) -> Option<&Value> {
        self.plugins.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Construction options passed to the scheduler core
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerOptions {
    pub profiles: Vec<Profile>,
    pub algorithm_source: AlgorithmSource,
    pub disable_preemption: bool,
    pub percentage_of_nodes_to_score: u32,
    pub bind_timeout: Duration,
    pub pod_initial_backoff: Duration,
    pub pod_max_backoff: Duration,
    pub out_of_tree_registry: PluginRegistry,
    pub extenders: Vec<Extender>,
}

impl From<&ComponentConfig> for SchedulerOptions {
    fn from(config: &ComponentConfig) -> Self {
        Self {
            profiles: config.profiles.clone(),
            algorithm_source: config.algorithm_source.clone(),
            disable_preemption: config.disable_preemption,
            percentage_of_nodes_to_score: config.percentage_of_nodes_to_score,
            bind_timeout: config.bind_timeout(),
            pod_initial_backoff: config.pod_initial_backoff(),
            pod_max_backoff: config.pod_max_backoff(),
            out_of_tree_registry: PluginRegistry::new(),
            extenders: config.extenders.clone(),
        }
    }
}

impl SchedulerOptions {
    pub fn with_out_of_tree_registry(mut self, registry: PluginRegistry) -> Self {
        self.out_of_tree_registry = registry;
        self
    }
}

/// Everything the scheduler core is constructed from
pub struct SchedulerDeps {
    pub client: Arc<dyn ClusterClient>,
    pub informer_factory: Arc<dyn InformerFactory>,
    pub pod_informer: Arc<dyn Informer>,
    pub recorder_factory: RecorderFactory,
    pub shutdown: CancellationToken,
    pub options: SchedulerOptions,
}

/// The scheduling loop
#[async_trait]
pub trait SchedulerCore: Send + Sync {
    /// Schedule until `shutdown` fires. Only synced feeds are passed in.
    async fn run(&self, feeds: SyncedFeeds, shutdown: CancellationToken);
}

/// Constructs the scheduler core
pub trait SchedulerBuilder: Send + Sync {
    fn build(&self, deps: SchedulerDeps) -> Result<Arc<dyn SchedulerCore>, BoxError>;
}

impl<F> SchedulerBuilder for F
where
    F: Fn(SchedulerDeps) -> Result<Arc<dyn SchedulerCore>, BoxError> + Send + Sync,
{
    fn build(&self, deps: SchedulerDeps) -> Result<Arc<dyn SchedulerCore>, BoxError> {
        self(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_from_component_config() {
        let config = ComponentConfig {
            disable_preemption: true,
            percentage_of_nodes_to_score: 30,
            pod_initial_backoff_seconds: 2,
            pod_max_backoff_seconds: 20,
            ..Default::default()
        };

        let options = SchedulerOptions::from(&config);
        assert!(options.disable_preemption);
        assert_eq!(options.percentage_of_nodes_to_score, 30);
        assert_eq!(options.bind_timeout, Duration::from_secs(600));
        assert_eq!(options.pod_initial_backoff, Duration::from_secs(2));
        assert_eq!(options.pod_max_backoff, Duration::from_secs(20));
        assert!(options.out_of_tree_registry.is_empty());
        assert_eq!(options.profiles, config.profiles);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = PluginRegistry::new();
        assert!(registry.register("Coscheduling", json!({"permitWaitingTimeSeconds": 10})));
        assert!(!registry.register("Coscheduling", json!({})));

        let options = SchedulerOptions::from(&ComponentConfig::default())
            .with_out_of_tree_registry(registry);
        assert_eq!(
            options.out_of_tree_registry.names().collect::<Vec<_>>(),
            vec!["Coscheduling"]
        );
        assert_eq!(
            options.out_of_tree_registry.args("Coscheduling").unwrap()["permitWaitingTimeSeconds"],
            10
        );
    }
}
