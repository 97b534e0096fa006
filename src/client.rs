//! Cluster API client surface used by the coordinator.
//!
//! Only discovery is needed here; the handle is otherwise passed through to
//! the scheduler core untouched.

use crate::error::BoxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Resources served under one API group/version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceList {
    pub group_version: String,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub namespaced: bool,
    #[serde(default)]
    pub verbs: Vec<String>,
}

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Discovery probe for a single group/version, e.g. `events.k8s.io/v1beta1`.
    ///
    /// An error means the group/version is not served (or discovery failed).
    async fn server_resources_for_group_version(
        &self,
        group_version: &str,
    ) -> Result<ApiResourceList, BoxError>;
}
