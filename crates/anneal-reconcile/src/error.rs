//! Reconciliation error types
//!
//! Terminal, transient, and flow-control errors live in disjoint variants
//! so the wrapping controller can route them - stall, backoff, or
//! out-of-interval requeue - without string matching.

use crate::action::ActionError;
use crate::patch::PatchError;
use crate::state::ObserveError;
use crate::verify::VerifyError;
use thiserror::Error;

/// Reconciliation errors
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Remediation retries are spent; the object is marked Stalled and
    /// should not be requeued until the spec changes
    #[error("exceeded maximum retries: {context}")]
    ExceededMaxRetries { context: String },

    /// Not a failure: more work remains, requeue outside the normal
    /// interval to continue progress
    #[error("must requeue to continue reconciliation")]
    MustRequeue,

    /// The observed release status cannot be acted upon; indicates
    /// version skew at the observer boundary
    #[error("unknown release status: {0}")]
    UnknownReleaseStatus(String),

    /// The configured remediation strategy cannot be acted upon
    #[error("unknown remediation strategy: {0}")]
    UnknownRemediationStrategy(String),

    /// The release state could not be determined
    #[error("cannot determine release state: {0}")]
    State(#[from] ObserveError),

    /// The rollback target could not be verified for a transient reason
    #[error("cannot verify previous release to roll back to: {0}")]
    Verify(#[source] VerifyError),

    /// An action failed against the release engine
    #[error("'{action}' action failed: {source}")]
    Action {
        action: &'static str,
        #[source]
        source: ActionError,
    },

    /// The status patch failed
    #[error("status patch failed: {0}")]
    Patch(#[from] PatchError),

    /// The ambient cancellation fired
    #[error("atomic release canceled")]
    Canceled,
}

impl ReconcileError {
    /// Whether the error is terminal: retrying without a spec or code
    /// change will not help
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReconcileError::ExceededMaxRetries { .. }
                | ReconcileError::UnknownReleaseStatus(_)
                | ReconcileError::UnknownRemediationStrategy(_)
        )
    }

    /// Whether the caller should requeue out of the normal interval
    pub fn is_must_requeue(&self) -> bool {
        matches!(self, ReconcileError::MustRequeue)
    }
}

/// Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(ReconcileError::ExceededMaxRetries {
            context: "cannot install release".into()
        }
        .is_terminal());
        assert!(ReconcileError::UnknownReleaseStatus("bogus".into()).is_terminal());
        assert!(ReconcileError::UnknownRemediationStrategy("bogus".into()).is_terminal());

        assert!(!ReconcileError::MustRequeue.is_terminal());
        assert!(!ReconcileError::Canceled.is_terminal());
        assert!(!ReconcileError::State(ObserveError::Engine("down".into())).is_terminal());
    }

    #[test]
    fn test_must_requeue_classification() {
        assert!(ReconcileError::MustRequeue.is_must_requeue());
        assert!(!ReconcileError::Canceled.is_must_requeue());
    }
}
