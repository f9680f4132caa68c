//! Rollback target verification seam
//!
//! Before instructing a rollback, the selector verifies the target snapshot
//! is still present and unmodified in engine storage. The four corruption
//! errors cause a fall back to upgrade; anything else is transient.

use anneal_types::Snapshot;
use async_trait::async_trait;
use thiserror::Error;

/// Errors while verifying a snapshot against engine storage
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("release not found in storage")]
    NotFound,

    #[error("release disappeared from storage")]
    Disappeared,

    #[error("release not observed to be made for this object")]
    NotObserved,

    #[error("release digest does not match storage")]
    DigestMismatch,

    #[error("storage error: {0}")]
    Storage(String),
}

impl VerifyError {
    /// Whether the rollback target itself is corrupt, making an upgrade
    /// the safer remediation
    pub fn target_corrupt(&self) -> bool {
        matches!(
            self,
            VerifyError::NotFound
                | VerifyError::Disappeared
                | VerifyError::NotObserved
                | VerifyError::DigestMismatch
        )
    }
}

/// Verifies a snapshot is intact in engine storage
#[async_trait]
pub trait SnapshotVerifier: Send + Sync {
    async fn verify(&self, snapshot: &Snapshot) -> Result<(), VerifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corruption_classification() {
        assert!(VerifyError::NotFound.target_corrupt());
        assert!(VerifyError::Disappeared.target_corrupt());
        assert!(VerifyError::NotObserved.target_corrupt());
        assert!(VerifyError::DigestMismatch.target_corrupt());
        assert!(!VerifyError::Storage("connection refused".into()).target_corrupt());
    }
}
