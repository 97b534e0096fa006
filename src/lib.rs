//! # Multisched
//!
//! Lifecycle coordinator for a cluster scheduler supplied from outside.
//!
//! This crate does not schedule anything. It validates configuration,
//! constructs the scheduler core through a [`scheduler::SchedulerBuilder`],
//! starts the informers that feed it, holds the scheduler back until every
//! tracked cache has synced, and tears everything down on a single
//! shutdown token.
//!
//! ## Features
//!
//! - **Cache sync gate**: event-driven "all feeds synced" predicate, no polling
//! - **Informer drivers**: one task per tracked feed, all sharing one shutdown token
//! - **Recorder selection**: structured or legacy recorder, picked once by discovery
//! - **Coordinated shutdown**: `run` returns when the token fires; `drain` bounds teardown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use multisched::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> multisched::Result<()> {
//!     let config = Config::new(ComponentConfig::default())
//!         .with_client(client)
//!         .with_informer_factory(factory)
//!         .with_pod_informer(pod_informer)
//!         .with_informer(node_informer)
//!         .with_core_broadcaster(core_broadcaster);
//!
//!     let shutdown = CancellationToken::new();
//!     ShutdownHandler::new(shutdown.clone()).spawn();
//!
//!     let mut scheduler = Scheduler::new(config, shutdown, &builder).await?;
//!     scheduler.run(CancellationToken::new()).await?;
//!     scheduler.drain(std::time::Duration::from_secs(30)).await
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod informer;
pub mod lifecycle;
pub mod scheduler;

// Re-export core types
pub use error::{BoxError, Error, Result};
pub use lifecycle::Scheduler;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
///
/// ```
/// use multisched::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cache::{FeedId, FeedState, Store, SyncGate, SyncedFeeds};
    pub use crate::client::{ApiResourceList, ClusterClient};
    pub use crate::config::{ComponentConfig, Config, ConfigService, Profile};
    pub use crate::error::{BoxError, Error, Result};
    pub use crate::events::{
        EventRecorder, EventSink, EventSource, EventType, LegacyBroadcaster, LegacyRecorder,
        ObjectReference, RecorderFactory, RecorderSelection, SelectionMode,
    };
    pub use crate::informer::{FeedReporter, Informer, InformerFactory};
    pub use crate::lifecycle::{ReadinessHandler, Scheduler, ShutdownHandler, shutdown_signal};
    pub use crate::scheduler::{SchedulerBuilder, SchedulerCore, SchedulerDeps, SchedulerOptions};
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
    pub use tokio_util::sync::CancellationToken;
}
