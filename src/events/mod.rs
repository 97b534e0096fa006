//! Event recording
//!
//! Two recorder flavours exist on clusters in the wild: the structured
//! `events.k8s.io` recorder and the legacy core recorder. The scheduler core
//! only speaks the structured [`EventRecorder`] interface; [`RecorderFactory`]
//! hides which one is actually behind it.

mod adapter;
mod broadcaster;
mod factory;

pub use adapter::EventRecorderAdapter;
pub use broadcaster::Broadcaster;
pub use factory::{
    EVENTS_GROUP_VERSION, RecorderFactory, RecorderSelection, SelectionMode,
    resolve_recorder_factory,
};

use crate::error::BoxError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event broadcaster is already recording to its sink")]
    AlreadyRecording,

    #[error("Event sink rejected event: {0}")]
    Sink(#[source] BoxError),
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
pub enum EventType {
    Normal,
    Warning,
}

/// Reference to the object an event is about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
}

impl ObjectReference {
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
            uid: String::new(),
        }
    }
}

/// Component (and optionally host) that emitted an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    pub component: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
}

impl EventSource {
    pub fn component(name: impl Into<String>) -> Self {
        Self {
            component: name.into(),
            host: String::new(),
        }
    }
}

/// Structured event as delivered to an [`EventSink`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    pub event_time: DateTime<Utc>,
    pub reporting_controller: String,
    pub regarding: ObjectReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<ObjectReference>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub reason: String,
    pub action: String,
    pub note: String,
}

impl Event {
    pub fn new(
        reporting_controller: impl Into<String>,
        regarding: ObjectReference,
        related: Option<ObjectReference>,
        event_type: EventType,
        reason: impl Into<String>,
        action: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        let name = format!("{}.{}", regarding.name, Uuid::new_v4().simple());
        Self {
            name,
            event_time: Utc::now(),
            reporting_controller: reporting_controller.into(),
            regarding,
            related,
            event_type,
            reason: reason.into(),
            action: action.into(),
            note: note.into(),
        }
    }
}

/// Structured recorder used by the scheduler core
pub trait EventRecorder: Send + Sync {
    fn eventf(
        &self,
        regarding: &ObjectReference,
        related: Option<&ObjectReference>,
        event_type: EventType,
        reason: &str,
        action: &str,
        note: &str,
    );
}

/// Legacy core recorder
pub trait LegacyRecorder: Send + Sync {
    fn event(&self, object: &ObjectReference, event_type: EventType, reason: &str, message: &str);
}

/// Broadcaster for the legacy event API, supplied by the caller
pub trait LegacyBroadcaster: Send + Sync {
    fn new_recorder(&self, source: EventSource) -> Arc<dyn LegacyRecorder>;
}

/// Destination for structured events
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn create(&self, event: Event) -> Result<(), BoxError>;
}
