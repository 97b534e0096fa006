use super::{EventRecorder, EventType, LegacyRecorder, ObjectReference};
use std::sync::Arc;

/// Presents a legacy recorder through the structured [`EventRecorder`] interface.
///
/// The legacy API has no notion of a related object or an action, so both are
/// dropped; the note becomes the event message.
pub struct EventRecorderAdapter {
    recorder: Arc<dyn LegacyRecorder>,
}

impl EventRecorderAdapter {
    pub fn new(recorder: Arc<dyn LegacyRecorder>) -> Self {
        Self { recorder }
    }
}

impl EventRecorder for EventRecorderAdapter {
    fn eventf(
        &self,
        regarding: &ObjectReference,
        _related: Option<&ObjectReference>,
        event_type: EventType,
        reason: &str,
        _action: &str,
        note: &str,
    ) {
        self.recorder.event(regarding, event_type, reason, note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Captured {
        calls: Mutex<Vec<(String, EventType, String, String)>>,
    }

    impl LegacyRecorder for Captured {
        fn event(
            &self,
            object: &ObjectReference,
            event_type: EventType,
            reason: &str,
            message: &str,
        ) {
            self.calls.lock().unwrap().push((
                object.name.clone(),
                event_type,
                reason.to_string(),
                message.to_string(),
            ));
        }
    }

    #[test]
    fn test_adapter_forwards_note_as_message() {
        let legacy = Arc::new(Captured::default());
        let adapter = EventRecorderAdapter::new(legacy.clone());

        let pod = ObjectReference::new("Pod", "default", "web-0");
        let node = ObjectReference::new("Node", "", "node-1");
        adapter.eventf(
            &pod,
            Some(&node),
            EventType::Normal,
            "Scheduled",
            "Binding",
            "assigned to node-1",
        );

        let calls = legacy.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(
                "web-0".to_string(),
                EventType::Normal,
                "Scheduled".to_string(),
                "assigned to node-1".to_string()
            )]
        );
    }
}
