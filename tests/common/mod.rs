#![allow(dead_code)]

use multisched::events::Event;
use multisched::prelude::*;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

pub struct FakeClient {
    events_served: bool,
}

impl FakeClient {
    pub fn new(events_served: bool) -> Arc<Self> {
        Arc::new(Self { events_served })
    }
}

#[async_trait]
impl ClusterClient for FakeClient {
    async fn server_resources_for_group_version(
        &self,
        group_version: &str,
    ) -> std::result::Result<ApiResourceList, BoxError> {
        if self.events_served {
            Ok(ApiResourceList {
                group_version: group_version.to_string(),
                resources: Vec::new(),
            })
        } else {
            Err(format!(
                "the server could not find the requested resource ({})",
                group_version
            )
            .into())
        }
    }
}

// ---------------------------------------------------------------------------
// Informers
// ---------------------------------------------------------------------------

/// Lists `objects` after `sync_after`, then idles until shutdown.
/// `sync_after = None` never completes the initial listing.
pub struct ScriptedInformer {
    feed: &'static str,
    sync_after: Option<Duration>,
    objects: Vec<(String, Value)>,
    runs: AtomicUsize,
    stopped: AtomicBool,
}

impl ScriptedInformer {
    pub fn syncing(feed: &'static str, after: Duration) -> Arc<Self> {
        Arc::new(Self {
            feed,
            sync_after: Some(after),
            objects: vec![(format!("{}-0", feed), json!({"feed": feed}))],
            runs: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn never_syncing(feed: &'static str) -> Arc<Self> {
        Arc::new(Self {
            feed,
            sync_after: None,
            objects: Vec::new(),
            runs: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Informer for ScriptedInformer {
    fn feed_id(&self) -> FeedId {
        self.feed.into()
    }

    async fn run(&self, reporter: FeedReporter, shutdown: CancellationToken) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(after) = self.sync_after {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    self.stopped.store(true, Ordering::SeqCst);
                    return;
                }
                _ = tokio::time::sleep(after) => {}
            }
            reporter.store().replace(self.objects.clone());
            reporter.mark_synced();
            // Resyncs report again; the gate must tolerate it
            reporter.mark_synced();
        }
        shutdown.cancelled().await;
        self.stopped.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeFactory {
    starts: AtomicUsize,
    synced: HashMap<String, bool>,
}

impl FakeFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_result(synced: &[(&str, bool)]) -> Arc<Self> {
        Arc::new(Self {
            starts: AtomicUsize::new(0),
            synced: synced
                .iter()
                .map(|(name, ok)| (name.to_string(), *ok))
                .collect(),
        })
    }

    pub fn started(&self) -> bool {
        self.starts() > 0
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InformerFactory for FakeFactory {
    fn start(&self, _shutdown: CancellationToken) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    async fn wait_for_cache_sync(&self, _shutdown: CancellationToken) -> HashMap<String, bool> {
        self.synced.clone()
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn create(&self, event: Event) -> std::result::Result<(), BoxError> {
        self.tx.send(event).map_err(|e| e.to_string().into())
    }
}

#[derive(Default)]
pub struct FakeCoreBroadcaster {
    pub messages: Arc<Mutex<Vec<String>>>,
}

struct FakeLegacyRecorder {
    component: String,
    messages: Arc<Mutex<Vec<String>>>,
}

impl LegacyRecorder for FakeLegacyRecorder {
    fn event(&self, object: &ObjectReference, event_type: EventType, reason: &str, message: &str) {
        self.messages.lock().unwrap().push(format!(
            "{} {} {} {}: {}",
            self.component, event_type, object.name, reason, message
        ));
    }
}

impl LegacyBroadcaster for FakeCoreBroadcaster {
    fn new_recorder(&self, source: EventSource) -> Arc<dyn LegacyRecorder> {
        Arc::new(FakeLegacyRecorder {
            component: source.component,
            messages: Arc::clone(&self.messages),
        })
    }
}

// ---------------------------------------------------------------------------
// Scheduler core
// ---------------------------------------------------------------------------

/// Records what it was started with and emits one event per run
pub struct RecordingCore {
    recorder: Arc<dyn EventRecorder>,
    ignore_shutdown: bool,
    pub seen: Mutex<Option<HashMap<String, usize>>>,
    pub stopped: AtomicBool,
}

#[async_trait]
impl SchedulerCore for RecordingCore {
    async fn run(&self, feeds: SyncedFeeds, shutdown: CancellationToken) {
        let seen = feeds
            .ids()
            .map(|id| (id.to_string(), feeds.get(id.as_str()).map_or(0, |s| s.len())))
            .collect();
        *self.seen.lock().unwrap() = Some(seen);

        let pod = ObjectReference::new("Pod", "default", "web-0");
        self.recorder.eventf(
            &pod,
            None,
            EventType::Normal,
            "Scheduled",
            "Binding",
            "Successfully assigned default/web-0 to node-1",
        );

        if self.ignore_shutdown {
            std::future::pending::<()>().await;
        }
        shutdown.cancelled().await;
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Builder that counts invocations and keeps the core it built
#[derive(Default)]
pub struct TestBuilder {
    pub calls: AtomicUsize,
    pub fail_with: Option<&'static str>,
    pub ignore_shutdown: bool,
    pub core: Mutex<Option<Arc<RecordingCore>>>,
    pub options: Mutex<Option<SchedulerOptions>>,
}

impl TestBuilder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn core(&self) -> Arc<RecordingCore> {
        self.core.lock().unwrap().clone().expect("core not built")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct BuildFailure(pub &'static str);

impl SchedulerBuilder for TestBuilder {
    fn build(&self, deps: SchedulerDeps) -> std::result::Result<Arc<dyn SchedulerCore>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.fail_with {
            return Err(Box::new(BuildFailure(reason)));
        }
        *self.options.lock().unwrap() = Some(deps.options.clone());
        let core = Arc::new(RecordingCore {
            recorder: deps.recorder_factory.recorder("default-scheduler"),
            ignore_shutdown: self.ignore_shutdown,
            seen: Mutex::new(None),
            stopped: AtomicBool::new(false),
        });
        *self.core.lock().unwrap() = Some(Arc::clone(&core));
        Ok(core)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub fn config_with(
    client: Arc<FakeClient>,
    pods: Arc<ScriptedInformer>,
    nodes: Arc<ScriptedInformer>,
) -> Config {
    Config::new(ComponentConfig::default())
        .with_client(client)
        .with_informer_factory(FakeFactory::new())
        .with_pod_informer(pods)
        .with_informer(nodes)
        .with_core_broadcaster(Arc::new(FakeCoreBroadcaster::default()))
}
