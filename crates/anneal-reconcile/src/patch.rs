//! Object persistence seam
//!
//! The driver persists condition changes between steps through a patcher.
//! Patches are scoped to the condition types the reconciler owns and carry
//! a stable field-owner identity so third-party writers are preserved.

use anneal_types::{Release, OWNED_CONDITIONS};
use async_trait::async_trait;
use thiserror::Error;

/// Scope and identity for one patch
#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    /// Condition types this patch may create, update, or remove
    pub owned_conditions: Vec<String>,

    /// Field-owner identity declared on the patch
    pub field_owner: Option<String>,
}

impl PatchOptions {
    /// Options scoped to the reconciler's owned conditions
    pub fn owned(field_owner: impl Into<String>) -> Self {
        Self {
            owned_conditions: OWNED_CONDITIONS.iter().map(|c| c.to_string()).collect(),
            field_owner: Some(field_owner.into()),
        }
    }
}

/// Errors while patching the declared object
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("api error: {0}")]
    Api(String),
}

/// Persists the declared object's status
#[async_trait]
pub trait Patcher: Send + Sync {
    async fn patch(&self, object: &Release, opts: PatchOptions) -> Result<(), PatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anneal_types::condition;

    #[test]
    fn test_owned_options_cover_all_owned_conditions() {
        let opts = PatchOptions::owned("anneal-release-controller");
        assert_eq!(opts.field_owner.as_deref(), Some("anneal-release-controller"));
        for owned in OWNED_CONDITIONS {
            assert!(opts.owned_conditions.iter().any(|c| c == owned));
        }
        assert!(opts
            .owned_conditions
            .iter()
            .any(|c| c == condition::RECONCILING));
    }
}
