mod component;

pub use component::{
    AlgorithmSource, ComponentConfig, DEFAULT_PROVIDER, DEFAULT_SCHEDULER_NAME, Extender,
    PolicySource, Profile,
};

use crate::client::ClusterClient;
use crate::error::{Error, Result};
use crate::events::{EventSink, LegacyBroadcaster, RecorderSelection};
use crate::informer::{Informer, InformerFactory};
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Key/value configuration source, seeded from the process environment
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }

    /// Parse `key` if present. A value that does not parse is a configuration error.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|e| {
                Error::configuration(format!("{}: invalid value '{}': {}", key, raw, e))
            }),
        }
    }
}

/// Startup configuration as assembled by the caller.
///
/// Collaborators are optional here so that a partially built configuration
/// can be rejected with a useful message; [`Config::complete`] turns it into
/// a [`CompletedConfig`].
#[derive(Clone, Default)]
pub struct Config {
    pub component_config: ComponentConfig,
    pub client: Option<Arc<dyn ClusterClient>>,
    pub informer_factory: Option<Arc<dyn InformerFactory>>,
    pub pod_informer: Option<Arc<dyn Informer>>,
    /// Further feeds tracked individually, next to the pod informer
    pub informers: Vec<Arc<dyn Informer>>,
    pub event_client: Option<Arc<dyn EventSink>>,
    pub core_broadcaster: Option<Arc<dyn LegacyBroadcaster>>,
    pub recorder_selection: RecorderSelection,
}

impl Config {
    pub fn new(component_config: ComponentConfig) -> Self {
        Self {
            component_config,
            ..Default::default()
        }
    }

    pub fn with_client(mut self, client: Arc<dyn ClusterClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_informer_factory(mut self, factory: Arc<dyn InformerFactory>) -> Self {
        self.informer_factory = Some(factory);
        self
    }

    pub fn with_pod_informer(mut self, informer: Arc<dyn Informer>) -> Self {
        self.pod_informer = Some(informer);
        self
    }

    pub fn with_informer(mut self, informer: Arc<dyn Informer>) -> Self {
        self.informers.push(informer);
        self
    }

    pub fn with_event_client(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_client = Some(sink);
        self
    }

    pub fn with_core_broadcaster(mut self, broadcaster: Arc<dyn LegacyBroadcaster>) -> Self {
        self.core_broadcaster = Some(broadcaster);
        self
    }

    pub fn with_recorder_selection(mut self, selection: RecorderSelection) -> Self {
        self.recorder_selection = selection;
        self
    }

    /// Check every required collaborator is present and the component
    /// configuration is well formed
    pub fn complete(self) -> Result<CompletedConfig> {
        let mut missing = Vec::new();
        if self.client.is_none() {
            missing.push("client");
        }
        if self.informer_factory.is_none() {
            missing.push("informer_factory");
        }
        if self.pod_informer.is_none() {
            missing.push("pod_informer");
        }
        if self.core_broadcaster.is_none() {
            missing.push("core_broadcaster");
        }

        match (
            self.client,
            self.informer_factory,
            self.pod_informer,
            self.core_broadcaster,
        ) {
            (Some(client), Some(informer_factory), Some(pod_informer), Some(core_broadcaster)) => {
                self.component_config.validate()?;
                Ok(CompletedConfig {
                    component_config: self.component_config,
                    client,
                    informer_factory,
                    pod_informer,
                    informers: self.informers,
                    event_client: self.event_client,
                    core_broadcaster,
                    recorder_selection: self.recorder_selection,
                })
            }
            _ => Err(Error::configuration(format!(
                "missing required fields: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Configuration with every required collaborator present
#[derive(Clone)]
pub struct CompletedConfig {
    pub component_config: ComponentConfig,
    pub client: Arc<dyn ClusterClient>,
    pub informer_factory: Arc<dyn InformerFactory>,
    pub pod_informer: Arc<dyn Informer>,
    pub informers: Vec<Arc<dyn Informer>>,
    pub event_client: Option<Arc<dyn EventSink>>,
    pub core_broadcaster: Arc<dyn LegacyBroadcaster>,
    pub recorder_selection: RecorderSelection,
}
