//! Observed release state
//!
//! The state observer classifies the current world - the declared object
//! plus the live release engine - into one of a closed set of states the
//! action selector dispatches on.

use crate::request::Request;
use anneal_types::DiffSet;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Classification of the current release relative to the declared spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedState {
    /// A current release exists, its recorded inputs match the declared
    /// spec, required tests have succeeded, and there is no drift
    InSync,

    /// A release exists but is stuck in a pending transactional state
    Locked,

    /// No release exists under the declared name and namespace
    Absent,

    /// A release exists but lacks this controller's ownership markers;
    /// its history cannot be trusted
    Unmanaged,

    /// A current release exists but its recorded inputs diverge from the
    /// declared spec
    OutOfSync,

    /// Recorded inputs match but live cluster state has diverged from the
    /// rendered manifests
    Drifted,

    /// The release matches spec but enabled tests have not run for the
    /// current revision
    Untested,

    /// The most recent attempted release operation failed
    Failed,
}

impl fmt::Display for ObservedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObservedState::InSync => "in-sync",
            ObservedState::Locked => "locked",
            ObservedState::Absent => "absent",
            ObservedState::Unmanaged => "unmanaged",
            ObservedState::OutOfSync => "out-of-sync",
            ObservedState::Drifted => "drifted",
            ObservedState::Untested => "untested",
            ObservedState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Observed state with supporting detail
#[derive(Debug, Clone)]
pub struct ReleaseState {
    /// The classification
    pub status: ObservedState,

    /// Short human-readable reason for the classification
    pub reason: String,

    /// Observed divergences; populated only for [`ObservedState::Drifted`]
    pub diff: DiffSet,
}

impl ReleaseState {
    pub fn new(status: ObservedState) -> Self {
        Self {
            status,
            reason: String::new(),
            diff: DiffSet::default(),
        }
    }

    pub fn with_reason(status: ObservedState, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            diff: DiffSet::default(),
        }
    }

    pub fn drifted(diff: DiffSet) -> Self {
        Self {
            status: ObservedState::Drifted,
            reason: String::new(),
            diff,
        }
    }
}

/// Errors while determining the release state
///
/// All observer errors are transient; the driver surfaces them for the
/// caller to retry with backoff.
#[derive(Debug, Error)]
pub enum ObserveError {
    #[error("release engine unavailable: {0}")]
    Engine(String),

    #[error("release storage error: {0}")]
    Storage(String),
}

/// Computes the observed state for a request
#[async_trait]
pub trait StateObserver: Send + Sync {
    async fn observe(&self, req: &Request) -> Result<ReleaseState, ObserveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anneal_types::{DiffEntry, DiffKind};

    #[test]
    fn test_display_names() {
        assert_eq!(ObservedState::InSync.to_string(), "in-sync");
        assert_eq!(ObservedState::OutOfSync.to_string(), "out-of-sync");
        assert_eq!(ObservedState::Failed.to_string(), "failed");
    }

    #[test]
    fn test_drifted_state_carries_diff() {
        let state = ReleaseState::drifted(DiffSet::from(vec![DiffEntry::new(
            DiffKind::Update,
            "apps/v1/Deployment/default/podinfo",
        )]));
        assert_eq!(state.status, ObservedState::Drifted);
        assert_eq!(state.diff.len(), 1);
    }
}
