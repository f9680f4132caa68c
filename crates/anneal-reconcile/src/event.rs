//! Event recording seam

use anneal_types::{EventSeverity, Release, ReleaseEventEnvelope};
use tokio::sync::broadcast;

/// Records events about a declared object
pub trait EventRecorder: Send + Sync {
    fn record(&self, object: &Release, severity: EventSeverity, reason: &str, message: String);
}

/// Event recorder backed by a broadcast channel
///
/// Wraps each event in a timestamped envelope and fans it out to any
/// subscribed observability consumers. Sending never blocks; events are
/// dropped when no receiver is subscribed.
pub struct BroadcastEventRecorder {
    tx: broadcast::Sender<ReleaseEventEnvelope>,
}

impl BroadcastEventRecorder {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to recorded events
    pub fn subscribe(&self) -> broadcast::Receiver<ReleaseEventEnvelope> {
        self.tx.subscribe()
    }
}

impl EventRecorder for BroadcastEventRecorder {
    fn record(&self, object: &Release, severity: EventSeverity, reason: &str, message: String) {
        let envelope = ReleaseEventEnvelope::new(
            severity,
            reason,
            message,
            object.name.clone(),
            object.namespace.clone(),
        );
        let _ = self.tx.send(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anneal_types::ChartSpec;

    #[test]
    fn test_broadcast_recorder_delivers_envelopes() {
        let recorder = BroadcastEventRecorder::new(16);
        let mut rx = recorder.subscribe();

        let obj = Release::new(
            "podinfo",
            "default",
            ChartSpec::new("podinfo", "https://charts.example.com"),
        );
        recorder.record(
            &obj,
            EventSeverity::Warning,
            "DriftDetected",
            "state drifted".into(),
        );

        let event = rx.try_recv().unwrap();
        assert_eq!(event.reason, "DriftDetected");
        assert_eq!(event.namespace, "default");
        assert_eq!(event.severity, EventSeverity::Warning);
    }

    #[test]
    fn test_recording_without_subscribers_does_not_panic() {
        let recorder = BroadcastEventRecorder::new(1);
        let obj = Release::new(
            "podinfo",
            "default",
            ChartSpec::new("podinfo", "https://charts.example.com"),
        );
        recorder.record(&obj, EventSeverity::Info, "Tested", "ok".into());
    }
}
