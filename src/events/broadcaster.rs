use super::{Event, EventError, EventRecorder, EventSink, EventType, ObjectReference};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const DEFAULT_CAPACITY: usize = 1000;

/// Fans structured events from any number of recorders out to a sink
pub struct Broadcaster {
    sink: Arc<dyn EventSink>,
    sender: broadcast::Sender<Event>,
    recording: AtomicBool,
}

impl Broadcaster {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self::with_capacity(sink, DEFAULT_CAPACITY)
    }

    /// `capacity` is clamped to at least one buffered event
    pub fn with_capacity(sink: Arc<dyn EventSink>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sink,
            sender,
            recording: AtomicBool::new(false),
        }
    }

    /// Recorder stamping events with `component` as reporting controller
    pub fn new_recorder(&self, component: impl Into<String>) -> Arc<dyn EventRecorder> {
        Arc::new(BroadcastRecorder {
            component: component.into(),
            sender: self.sender.clone(),
        })
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Forward every recorded event to the sink until `shutdown` fires.
    ///
    /// Events recorded before this call are not delivered. Sink failures are
    /// logged and the event is dropped.
    pub fn start_recording_to_sink(
        &self,
        shutdown: CancellationToken,
    ) -> Result<JoinHandle<()>, EventError> {
        if self.recording.swap(true, Ordering::SeqCst) {
            return Err(EventError::AlreadyRecording);
        }

        let mut events = self.sender.subscribe();
        let sink = Arc::clone(&self.sink);

        Ok(tokio::spawn(async move {
            tracing::debug!("Recording events to sink");
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    received = events.recv() => match received {
                        Ok(event) => {
                            if let Err(e) = sink.create(event).await {
                                tracing::warn!("{}", EventError::Sink(e));
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Event recorder lagged, events dropped");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("Stopped recording events");
        }))
    }
}

struct BroadcastRecorder {
    component: String,
    sender: broadcast::Sender<Event>,
}

impl EventRecorder for BroadcastRecorder {
    fn eventf(
        &self,
        regarding: &ObjectReference,
        related: Option<&ObjectReference>,
        event_type: EventType,
        reason: &str,
        action: &str,
        note: &str,
    ) {
        let event = Event::new(
            self.component.clone(),
            regarding.clone(),
            related.cloned(),
            event_type,
            reason,
            action,
            note,
        );
        // No receiver means nobody is recording yet
        if self.sender.send(event).is_err() {
            tracing::trace!(reason, "Dropping event, broadcaster not recording");
        }
    }
}
