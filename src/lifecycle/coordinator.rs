//! Scheduler service coordinator
//!
//! Owns the startup → ready → run → shutdown sequence around the external
//! scheduler core.

use super::ReadinessHandler;
use crate::cache::{FeedState, SyncGate};
use crate::config::{ComponentConfig, Config};
use crate::error::{Error, Result};
use crate::events::{EventSink, RecorderFactory, resolve_recorder_factory};
use crate::informer::{InformerDriver, InformerFactory};
use crate::scheduler::{
    PluginRegistry, SchedulerBuilder, SchedulerCore, SchedulerDeps, SchedulerOptions,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Handle to a constructed scheduling service.
///
/// # Example
///
/// ```rust,ignore
/// use multisched::lifecycle::{Scheduler, ShutdownHandler};
/// use tokio_util::sync::CancellationToken;
///
/// let shutdown = CancellationToken::new();
/// ShutdownHandler::new(shutdown.clone()).spawn();
///
/// let mut scheduler = Scheduler::new(config, shutdown, &builder).await?;
/// scheduler.run(CancellationToken::new()).await?;
/// scheduler.drain(Duration::from_secs(30)).await?;
/// ```
pub struct Scheduler {
    component_config: ComponentConfig,
    core: Arc<dyn SchedulerCore>,
    informer_factory: Arc<dyn InformerFactory>,
    drivers: Vec<InformerDriver>,
    gate: Arc<SyncGate>,
    recorder_factory: RecorderFactory,
    event_client: Option<Arc<dyn EventSink>>,
    shutdown: CancellationToken,
    ready: Arc<AtomicBool>,
    started: bool,
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl Scheduler {
    /// Validate `config`, pick the event recorder and build the scheduler core.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if a required collaborator is missing, the
    ///   component configuration is malformed, or two informers share a feed.
    ///   The builder is not called in that case.
    /// - [`Error::Construction`] with the builder's own error if it fails.
    pub async fn new(
        config: Config,
        shutdown: CancellationToken,
        builder: &dyn SchedulerBuilder,
    ) -> Result<Self> {
        let config = config.complete()?;

        let recorder_factory = resolve_recorder_factory(
            config.client.as_ref(),
            &config.recorder_selection,
            config.event_client.as_ref(),
            Arc::clone(&config.core_broadcaster),
        )
        .await;

        let gate = Arc::new(SyncGate::new());
        let mut drivers = Vec::with_capacity(config.informers.len() + 1);
        for informer in std::iter::once(&config.pod_informer).chain(&config.informers) {
            let driver = InformerDriver::new(Arc::clone(informer), Arc::clone(&gate))
                .map_err(|e| Error::configuration(e.to_string()))?;
            drivers.push(driver);
        }

        let options = SchedulerOptions::from(&config.component_config)
            .with_out_of_tree_registry(PluginRegistry::new());
        let core = builder
            .build(SchedulerDeps {
                client: Arc::clone(&config.client),
                informer_factory: Arc::clone(&config.informer_factory),
                pod_informer: Arc::clone(&config.pod_informer),
                recorder_factory: recorder_factory.clone(),
                shutdown: shutdown.clone(),
                options,
            })
            .map_err(|e| {
                tracing::error!("Failed to build scheduler: {}", e);
                Error::construction(e)
            })?;

        tracing::info!(
            profiles = config.component_config.profiles.len(),
            feeds = drivers.len(),
            recorder = ?recorder_factory,
            "Scheduler constructed"
        );

        Ok(Self {
            component_config: config.component_config,
            core,
            informer_factory: config.informer_factory,
            drivers,
            gate,
            recorder_factory,
            event_client: config.event_client,
            shutdown,
            ready: Arc::new(AtomicBool::new(false)),
            started: false,
            tasks: Vec::new(),
        })
    }

    /// Start the informers, wait for their caches, then run the scheduler
    /// until the shutdown token fires.
    ///
    /// `ctx` bounds only the cache sync wait. Cancelling it before every
    /// tracked feed has synced returns [`Error::CacheSyncTimeout`]; it does not
    /// stop the informers, which keep running until the shutdown token fires.
    ///
    /// Returns `Ok(())` only after a successful sync followed by shutdown.
    ///
    /// A handle runs at most once. Later calls return [`Error::AlreadyStarted`]
    /// without starting anything; retrying after a timeout needs a new
    /// [`Scheduler`].
    pub async fn run(&mut self, ctx: CancellationToken) -> Result<()> {
        if self.started {
            tracing::warn!("Scheduler already started, ignoring run");
            return Err(Error::AlreadyStarted);
        }
        self.started = true;

        if let (Some(broadcaster), Some(_)) =
            (self.recorder_factory.broadcaster(), self.event_client.as_ref())
        {
            match broadcaster.start_recording_to_sink(self.shutdown.clone()) {
                Ok(task) => self.tasks.push(("event-broadcaster".to_string(), task)),
                Err(e) => tracing::warn!("Event broadcaster not started: {}", e),
            }
        }

        for driver in &self.drivers {
            let task = driver.spawn(self.shutdown.clone());
            self.tasks.push((format!("informer/{}", driver.feed()), task));
        }
        self.informer_factory.start(self.shutdown.clone());

        tracing::info!(feeds = self.drivers.len(), "Waiting for caches to sync");
        let synced = tokio::select! {
            biased;
            _ = ctx.cancelled() => false,
            synced = self.wait_for_caches(&ctx) => synced,
        };
        if !synced {
            let pending: Vec<String> = self
                .gate
                .feeds()
                .into_iter()
                .filter(|(_, state)| *state != FeedState::Synced)
                .map(|(feed, state)| format!("{}={}", feed, state))
                .collect();
            tracing::error!(?pending, "Failed to wait cache sync");
            return Err(Error::CacheSyncTimeout);
        }

        let feeds = self.gate.synced_feeds();
        let feed_count = feeds.len();
        let core = Arc::clone(&self.core);
        let shutdown = self.shutdown.clone();
        let task = tokio::spawn(
            async move { core.run(feeds, shutdown).await }
                .instrument(tracing::info_span!("scheduler")),
        );
        self.tasks.push(("scheduler".to_string(), task));

        self.ready.store(true, Ordering::SeqCst);
        tracing::info!(feeds = feed_count, "Caches synced, scheduler running");

        self.shutdown.cancelled().await;
        self.ready.store(false, Ordering::SeqCst);
        tracing::info!("Shutdown signal received, scheduler stopping");
        Ok(())
    }

    async fn wait_for_caches(&self, ctx: &CancellationToken) -> bool {
        let factory = self
            .informer_factory
            .wait_for_cache_sync(self.shutdown.clone())
            .await;
        let mut unsynced: Vec<&str> = factory
            .iter()
            .filter(|(_, synced)| !**synced)
            .map(|(resource, _)| resource.as_str())
            .collect();
        if !unsynced.is_empty() {
            unsynced.sort_unstable();
            tracing::warn!(?unsynced, "Informer factory caches not synced");
        }

        self.gate.wait_for_sync(ctx).await
    }

    /// Wait for every task started by [`run`](Self::run) to finish.
    ///
    /// Tasks still running after `timeout` are aborted and reported in
    /// [`Error::ShutdownTimeout`]. Meant to be called after the shutdown
    /// token has fired.
    pub async fn drain(&mut self, timeout: Duration) -> Result<()> {
        let started = tokio::time::Instant::now();
        let deadline = started + timeout;
        let mut remaining = Vec::new();

        for (name, mut task) in std::mem::take(&mut self.tasks) {
            match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(Ok(())) => tracing::debug!(task = %name, "Task stopped"),
                Ok(Err(e)) => tracing::warn!(task = %name, "Task ended abnormally: {}", e),
                Err(_) => {
                    task.abort();
                    remaining.push(name);
                }
            }
        }

        if remaining.is_empty() {
            tracing::info!("Scheduler drained");
            Ok(())
        } else {
            tracing::warn!(?remaining, "Drain timed out, aborted remaining tasks");
            Err(Error::ShutdownTimeout {
                elapsed: started.elapsed(),
                remaining,
            })
        }
    }

    /// Probe reporting whether the scheduler is past its cache sync and not
    /// yet shutting down
    pub fn readiness_handler(&self) -> ReadinessHandler {
        ReadinessHandler::new(Arc::clone(&self.ready), self.shutdown.clone())
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst) && !self.shutdown.is_cancelled()
    }

    pub fn component_config(&self) -> &ComponentConfig {
        &self.component_config
    }

    pub fn recorder_factory(&self) -> &RecorderFactory {
        &self.recorder_factory
    }

    pub fn sync_gate(&self) -> &Arc<SyncGate> {
        &self.gate
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }
}
