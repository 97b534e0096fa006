use super::{
    Broadcaster, EventRecorder, EventRecorderAdapter, EventSink, EventSource, LegacyBroadcaster,
};
use crate::client::ClusterClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Group/version whose presence selects the structured recorder
pub const EVENTS_GROUP_VERSION: &str = "events.k8s.io/v1beta1";

/// How the recorder flavour is chosen
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SelectionMode {
    /// Structured recorder if discovery serves the group/version
    #[default]
    Probe,
    ForceBroadcast,
    ForceCompat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecorderSelection {
    pub group_version: String,
    pub mode: SelectionMode,
}

impl Default for RecorderSelection {
    fn default() -> Self {
        Self {
            group_version: EVENTS_GROUP_VERSION.to_string(),
            mode: SelectionMode::Probe,
        }
    }
}

/// Produces recorders bound to component names.
///
/// Chosen once at construction and never re-evaluated.
#[derive(Clone)]
pub enum RecorderFactory {
    /// Structured events through a broadcaster writing to the event sink
    Broadcast(Arc<Broadcaster>),
    /// Legacy recorders wrapped in [`EventRecorderAdapter`]
    Compat(Arc<dyn LegacyBroadcaster>),
}

impl RecorderFactory {
    pub fn recorder(&self, component: &str) -> Arc<dyn EventRecorder> {
        match self {
            Self::Broadcast(broadcaster) => broadcaster.new_recorder(component),
            Self::Compat(core) => Arc::new(EventRecorderAdapter::new(
                core.new_recorder(EventSource::component(component)),
            )),
        }
    }

    /// Broadcaster that must be started for structured events to be delivered
    pub fn broadcaster(&self) -> Option<&Arc<Broadcaster>> {
        match self {
            Self::Broadcast(broadcaster) => Some(broadcaster),
            Self::Compat(_) => None,
        }
    }

    pub fn is_compat(&self) -> bool {
        matches!(self, Self::Compat(_))
    }
}

impl fmt::Debug for RecorderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast(_) => f.write_str("RecorderFactory::Broadcast"),
            Self::Compat(_) => f.write_str("RecorderFactory::Compat"),
        }
    }
}

/// Pick the recorder flavour for this process.
///
/// A failed probe is the normal outcome on older clusters and is not an
/// error. The structured path also needs an event client; without one the
/// legacy recorder is used regardless of the probe.
pub async fn resolve_recorder_factory(
    client: &dyn ClusterClient,
    selection: &RecorderSelection,
    event_client: Option<&Arc<dyn EventSink>>,
    core_broadcaster: Arc<dyn LegacyBroadcaster>,
) -> RecorderFactory {
    let group_version = selection.group_version.as_str();
    let structured = match selection.mode {
        SelectionMode::ForceBroadcast => true,
        SelectionMode::ForceCompat => false,
        SelectionMode::Probe => match client
            .server_resources_for_group_version(group_version)
            .await
        {
            Ok(_) => {
                tracing::debug!(group_version, "Events API served");
                true
            }
            Err(e) => {
                tracing::debug!(group_version, error = %e, "Events API not served");
                false
            }
        },
    };

    match (structured, event_client) {
        (true, Some(sink)) => {
            tracing::info!(mode = %selection.mode, "Using structured event recorder");
            RecorderFactory::Broadcast(Arc::new(Broadcaster::new(Arc::clone(sink))))
        }
        (true, None) => {
            tracing::warn!(
                "Events API available but no event client configured, using legacy recorder"
            );
            RecorderFactory::Compat(core_broadcaster)
        }
        (false, _) => {
            tracing::info!(mode = %selection.mode, "Using legacy event recorder");
            RecorderFactory::Compat(core_broadcaster)
        }
    }
}
