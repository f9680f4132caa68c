//! Actions the reconciler can take against the release engine
//!
//! The action set is closed; each variant carries its own name, kind, and
//! timeout lookup. Running an action is delegated to an [`ActionRunner`],
//! the seam behind which the release-engine adapters live.

use crate::request::Request;
use anneal_types::Release;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Kind of an action, used by the release strategy to gate progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilerKind {
    /// Mutates the release toward the declared spec (install, upgrade)
    Release,

    /// Runs tests against the current revision
    Test,

    /// Corrects a failed release (rollback, uninstall)
    Remediate,

    /// Clears a stuck transactional state
    Unlock,
}

impl fmt::Display for ReconcilerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReconcilerKind::Release => "release",
            ReconcilerKind::Test => "test",
            ReconcilerKind::Remediate => "remediate",
            ReconcilerKind::Unlock => "unlock",
        };
        write!(f, "{s}")
    }
}

/// Ordered record of the action kinds run during one driver invocation
#[derive(Debug, Clone, Default)]
pub struct KindSet(Vec<ReconcilerKind>);

impl KindSet {
    pub fn contains(&self, kind: ReconcilerKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn record(&mut self, kind: ReconcilerKind) {
        self.0.push(kind);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An action the driver can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Install,
    Upgrade,
    Test,
    RollbackRemediation,
    UninstallRemediation,
    Unlock,
}

impl Action {
    /// Short identifier used in conditions, logs, and errors
    pub fn name(&self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Upgrade => "upgrade",
            Action::Test => "test",
            Action::RollbackRemediation => "rollback",
            Action::UninstallRemediation => "uninstall",
            Action::Unlock => "unlock",
        }
    }

    /// Kind dispatched on by the release strategy
    pub fn kind(&self) -> ReconcilerKind {
        match self {
            Action::Install | Action::Upgrade => ReconcilerKind::Release,
            Action::Test => ReconcilerKind::Test,
            Action::RollbackRemediation | Action::UninstallRemediation => {
                ReconcilerKind::Remediate
            }
            Action::Unlock => ReconcilerKind::Unlock,
        }
    }

    /// Timeout for the action: the matching policy's override, then the
    /// object's spec timeout, then the configured default
    pub fn timeout(&self, object: &Release, default_timeout: Duration) -> Duration {
        let default = object.timeout_or(default_timeout);
        match self {
            Action::Install => object.install().timeout_or(default),
            Action::Upgrade => object.upgrade().timeout_or(default),
            Action::Test => object.test().timeout_or(default),
            Action::RollbackRemediation => object.rollback().timeout_or(default),
            Action::UninstallRemediation => object.uninstall().timeout_or(default),
            Action::Unlock => default,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors from running an action against the release engine
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("release engine failure: {0}")]
    Engine(String),

    #[error("timed out after {}s waiting for {operation}", timeout.as_secs())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    #[error("action interrupted")]
    Interrupted,
}

/// Runs actions against the release engine
///
/// Implementations wrap the engine client and are expected to record the
/// outcome on the request object (history, failure counters, the
/// `Released`/`Remediated`/`TestSuccess` conditions) as a side effect.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    async fn run(&self, action: Action, req: &mut Request) -> Result<(), ActionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use anneal_types::{ChartSpec, InstallSpec, Release};

    #[test]
    fn test_kind_set_records_order_and_membership() {
        let mut set = KindSet::default();
        assert!(set.is_empty());

        set.record(ReconcilerKind::Release);
        set.record(ReconcilerKind::Test);

        assert!(set.contains(ReconcilerKind::Release));
        assert!(set.contains(ReconcilerKind::Test));
        assert!(!set.contains(ReconcilerKind::Remediate));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_action_kinds() {
        assert_eq!(Action::Install.kind(), ReconcilerKind::Release);
        assert_eq!(Action::Upgrade.kind(), ReconcilerKind::Release);
        assert_eq!(Action::Test.kind(), ReconcilerKind::Test);
        assert_eq!(Action::RollbackRemediation.kind(), ReconcilerKind::Remediate);
        assert_eq!(
            Action::UninstallRemediation.kind(),
            ReconcilerKind::Remediate
        );
        assert_eq!(Action::Unlock.kind(), ReconcilerKind::Unlock);
    }

    #[test]
    fn test_action_timeout_prefers_policy_override() {
        let configured = Duration::from_secs(300);
        let mut obj = Release::new(
            "podinfo",
            "default",
            ChartSpec::new("podinfo", "https://charts.example.com"),
        );
        obj.spec.timeout = Some(Duration::from_secs(600));
        obj.spec.install = Some(InstallSpec {
            timeout: Some(Duration::from_secs(120)),
            ..Default::default()
        });

        assert_eq!(
            Action::Install.timeout(&obj, configured),
            Duration::from_secs(120)
        );
        // No upgrade policy configured; falls back to the object default.
        assert_eq!(
            Action::Upgrade.timeout(&obj, configured),
            Duration::from_secs(600)
        );
        // Unlock always uses the object default.
        assert_eq!(
            Action::Unlock.timeout(&obj, configured),
            Duration::from_secs(600)
        );
    }

    #[test]
    fn test_action_timeout_falls_back_to_configured_default() {
        let obj = Release::new(
            "podinfo",
            "default",
            ChartSpec::new("podinfo", "https://charts.example.com"),
        );

        // Neither a policy override nor a spec timeout is declared.
        assert_eq!(
            Action::Upgrade.timeout(&obj, Duration::from_secs(300)),
            Duration::from_secs(300)
        );
        assert_eq!(
            Action::Test.timeout(&obj, Duration::from_secs(42)),
            Duration::from_secs(42)
        );
    }
}
