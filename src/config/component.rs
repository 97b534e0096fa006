use super::ConfigService;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_SCHEDULER_NAME: &str = "default-scheduler";
pub const DEFAULT_PROVIDER: &str = "DefaultProvider";

const ENV_PERCENTAGE_OF_NODES_TO_SCORE: &str = "MULTISCHED_PERCENTAGE_OF_NODES_TO_SCORE";
const ENV_BIND_TIMEOUT_SECONDS: &str = "MULTISCHED_BIND_TIMEOUT_SECONDS";
const ENV_POD_INITIAL_BACKOFF_SECONDS: &str = "MULTISCHED_POD_INITIAL_BACKOFF_SECONDS";
const ENV_POD_MAX_BACKOFF_SECONDS: &str = "MULTISCHED_POD_MAX_BACKOFF_SECONDS";
const ENV_DISABLE_PREEMPTION: &str = "MULTISCHED_DISABLE_PREEMPTION";

/// Scheduler component configuration.
///
/// Immutable once handed to the coordinator; changing any of it means
/// building a new scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentConfig {
    pub profiles: Vec<Profile>,
    pub algorithm_source: AlgorithmSource,
    pub disable_preemption: bool,
    /// 0 lets the scheduler pick an adaptive percentage
    pub percentage_of_nodes_to_score: u32,
    pub bind_timeout_seconds: u64,
    pub pod_initial_backoff_seconds: u64,
    pub pod_max_backoff_seconds: u64,
    pub extenders: Vec<Extender>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self {
            profiles: vec![Profile::new(DEFAULT_SCHEDULER_NAME)],
            algorithm_source: AlgorithmSource::default(),
            disable_preemption: false,
            percentage_of_nodes_to_score: 0,
            bind_timeout_seconds: 600,
            pod_initial_backoff_seconds: 1,
            pod_max_backoff_seconds: 10,
            extenders: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub scheduler_name: String,
    /// Plugins enabled on top of the provider's defaults
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl Profile {
    pub fn new(scheduler_name: impl Into<String>) -> Self {
        Self {
            scheduler_name: scheduler_name.into(),
            plugins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlgorithmSource {
    /// Named algorithm provider
    Provider(String),
    /// Policy read from a file or a config map
    Policy(PolicySource),
}

impl Default for AlgorithmSource {
    fn default() -> Self {
        Self::Provider(DEFAULT_PROVIDER.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicySource {
    File { path: String },
    ConfigMap { namespace: String, name: String },
}

/// Out-of-process scheduler extender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extender {
    pub url_prefix: String,
    #[serde(default)]
    pub filter_verb: Option<String>,
    #[serde(default)]
    pub prioritize_verb: Option<String>,
    #[serde(default)]
    pub bind_verb: Option<String>,
    #[serde(default)]
    pub weight: i64,
    #[serde(default = "default_extender_timeout")]
    pub http_timeout_seconds: u64,
    #[serde(default)]
    pub enable_https: bool,
    #[serde(default)]
    pub ignorable: bool,
}

fn default_extender_timeout() -> u64 {
    30
}

impl ComponentConfig {
    /// Parse a JSON component configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::configuration(format!("failed to parse component config: {}", e)))
    }

    /// Check the configuration is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(Error::configuration("at least one profile is required"));
        }
        let mut names = HashSet::new();
        for profile in &self.profiles {
            if profile.scheduler_name.is_empty() {
                return Err(Error::configuration("profiles: schedulerName is required"));
            }
            if !names.insert(profile.scheduler_name.as_str()) {
                return Err(Error::configuration(format!(
                    "profiles: duplicate schedulerName '{}'",
                    profile.scheduler_name
                )));
            }
        }

        if self.percentage_of_nodes_to_score > 100 {
            return Err(Error::configuration(format!(
                "percentageOfNodesToScore must be in [0, 100], got {}",
                self.percentage_of_nodes_to_score
            )));
        }
        if self.bind_timeout_seconds == 0 {
            return Err(Error::configuration("bindTimeoutSeconds must be positive"));
        }
        if self.pod_initial_backoff_seconds == 0 {
            return Err(Error::configuration(
                "podInitialBackoffSeconds must be positive",
            ));
        }
        if self.pod_initial_backoff_seconds > self.pod_max_backoff_seconds {
            return Err(Error::configuration(format!(
                "podMaxBackoffSeconds ({}) must not be less than podInitialBackoffSeconds ({})",
                self.pod_max_backoff_seconds, self.pod_initial_backoff_seconds
            )));
        }

        for (i, extender) in self.extenders.iter().enumerate() {
            if extender.url_prefix.is_empty() {
                return Err(Error::configuration(format!(
                    "extenders[{}]: urlPrefix is required",
                    i
                )));
            }
            if extender.prioritize_verb.is_some() && extender.weight <= 0 {
                return Err(Error::configuration(format!(
                    "extenders[{}]: weight must be positive when prioritizeVerb is set",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Overlay values present in `env`
    pub fn apply_overrides(&mut self, env: &ConfigService) -> Result<()> {
        if let Some(value) = env.parse(ENV_PERCENTAGE_OF_NODES_TO_SCORE)? {
            self.percentage_of_nodes_to_score = value;
        }
        if let Some(value) = env.parse(ENV_BIND_TIMEOUT_SECONDS)? {
            self.bind_timeout_seconds = value;
        }
        if let Some(value) = env.parse(ENV_POD_INITIAL_BACKOFF_SECONDS)? {
            self.pod_initial_backoff_seconds = value;
        }
        if let Some(value) = env.parse(ENV_POD_MAX_BACKOFF_SECONDS)? {
            self.pod_max_backoff_seconds = value;
        }
        if let Some(value) = env.parse(ENV_DISABLE_PREEMPTION)? {
            self.disable_preemption = value;
        }
        Ok(())
    }

    pub fn bind_timeout(&self) -> Duration {
        Duration::from_secs(self.bind_timeout_seconds)
    }

    pub fn pod_initial_backoff(&self) -> Duration {
        Duration::from_secs(self.pod_initial_backoff_seconds)
    }

    pub fn pod_max_backoff(&self) -> Duration {
        Duration::from_secs(self.pod_max_backoff_seconds)
    }
}
