//! Event envelope for release lifecycle observability

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reason attached to drift warning events
pub const REASON_DRIFT_DETECTED: &str = "DriftDetected";

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Informational event
    Info,

    /// Warning event
    Warning,

    /// Error event
    Error,
}

/// Envelope wrapping a single release event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseEventEnvelope {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Event severity
    pub severity: EventSeverity,

    /// Machine-readable reason, e.g. `DriftDetected`
    pub reason: String,

    /// Human-readable body
    pub message: String,

    /// Name of the declared object the event concerns
    pub release_name: String,

    /// Namespace of the declared object
    pub namespace: String,
}

impl ReleaseEventEnvelope {
    pub fn new(
        severity: EventSeverity,
        reason: impl Into<String>,
        message: impl Into<String>,
        release_name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            severity,
            reason: reason.into(),
            message: message.into(),
            release_name: release_name.into(),
            namespace: namespace.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_carries_identity() {
        let event = ReleaseEventEnvelope::new(
            EventSeverity::Warning,
            REASON_DRIFT_DETECTED,
            "drifted",
            "podinfo",
            "default",
        );

        assert_eq!(event.severity, EventSeverity::Warning);
        assert_eq!(event.reason, "DriftDetected");
        assert_eq!(event.release_name, "podinfo");
    }
}
