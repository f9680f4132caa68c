//! Typed conditions maintained on the declared object
//!
//! Conditions are boolean-with-reason assertions keyed by type name. The
//! reconciler owns exactly the types listed in [`OWNED_CONDITIONS`]; any
//! other condition present on the object belongs to a third party and is
//! preserved untouched.

use serde::{Deserialize, Serialize};

/// The release action completed
pub const RELEASED: &str = "Released";

/// A remediation action completed
pub const REMEDIATED: &str = "Remediated";

/// Tests for the current revision succeeded
pub const TEST_SUCCESS: &str = "TestSuccess";

/// The reconciler is actively working on the object
pub const RECONCILING: &str = "Reconciling";

/// Summary readiness of the release
pub const READY: &str = "Ready";

/// Remediation retries are spent; reconciliation is halted until the spec
/// changes
pub const STALLED: &str = "Stalled";

/// Condition types owned by the release reconciler
pub const OWNED_CONDITIONS: [&str; 6] = [
    RELEASED,
    REMEDIATED,
    TEST_SUCCESS,
    RECONCILING,
    READY,
    STALLED,
];

/// Status of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

/// A single condition on the declared object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Condition type name
    #[serde(rename = "type")]
    pub type_: String,

    /// Current status
    pub status: ConditionStatus,

    /// Machine-readable reason for the status
    pub reason: String,

    /// Human-readable detail
    pub message: String,

    /// When the status last changed
    pub last_transition_time: chrono::DateTime<chrono::Utc>,
}

/// Mutable set of conditions keyed by type name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions(Vec<Condition>);

impl Conditions {
    /// Look up a condition by type
    pub fn get(&self, type_: &str) -> Option<&Condition> {
        self.0.iter().find(|c| c.type_ == type_)
    }

    /// Set a condition to True
    pub fn mark_true(&mut self, type_: &str, reason: &str, message: impl Into<String>) {
        self.set(type_, ConditionStatus::True, reason, message.into());
    }

    /// Set a condition to False
    pub fn mark_false(&mut self, type_: &str, reason: &str, message: impl Into<String>) {
        self.set(type_, ConditionStatus::False, reason, message.into());
    }

    /// Set a condition to Unknown
    pub fn mark_unknown(&mut self, type_: &str, reason: &str, message: impl Into<String>) {
        self.set(type_, ConditionStatus::Unknown, reason, message.into());
    }

    /// Remove a condition by type
    pub fn delete(&mut self, type_: &str) {
        self.0.retain(|c| c.type_ != type_);
    }

    /// Whether the condition exists with status True
    pub fn is_true(&self, type_: &str) -> bool {
        matches!(self.get(type_), Some(c) if c.status == ConditionStatus::True)
    }

    /// Whether the condition exists at all
    pub fn has(&self, type_: &str) -> bool {
        self.get(type_).is_some()
    }

    /// Whether the object carries Ready=True
    pub fn is_ready(&self) -> bool {
        self.is_true(READY)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    fn set(&mut self, type_: &str, status: ConditionStatus, reason: &str, message: String) {
        let now = chrono::Utc::now();
        match self.0.iter_mut().find(|c| c.type_ == type_) {
            Some(existing) => {
                if existing.status != status {
                    existing.last_transition_time = now;
                }
                existing.status = status;
                existing.reason = reason.to_string();
                existing.message = message;
            }
            None => self.0.push(Condition {
                type_: type_.to_string(),
                status,
                reason: reason.to_string(),
                message,
                last_transition_time: now,
            }),
        }
    }
}
