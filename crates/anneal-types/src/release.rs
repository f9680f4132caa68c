//! The declared object
//!
//! A Release binds a name and namespace to a [`ReleaseSpec`] and the
//! [`ReleaseStatus`] recorded for it. Policy accessors substitute defaults
//! for absent blocks so callers never branch on optional configuration.

use crate::remediation::Remediation;
use crate::spec::{
    DriftDetectionSpec, InstallSpec, ReleaseSpec, RollbackSpec, TestSpec, UninstallSpec,
    UpgradeSpec,
};
use crate::status::{ReleaseAction, ReleaseStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for release engine operations
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// A declared release and its recorded status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    /// Object name; doubles as the release name in the engine
    pub name: String,

    /// Namespace the release is managed in
    pub namespace: String,

    /// Generation of the declared spec
    #[serde(default)]
    pub generation: i64,

    /// Desired state
    pub spec: ReleaseSpec,

    /// Recorded state
    #[serde(default)]
    pub status: ReleaseStatus,
}

impl Release {
    /// Create a declared release with an empty status
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        chart: crate::spec::ChartSpec,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            generation: 1,
            spec: ReleaseSpec::new(chart),
            status: ReleaseStatus::default(),
        }
    }

    /// Install policy, or its zero value
    pub fn install(&self) -> InstallSpec {
        self.spec.install.clone().unwrap_or_default()
    }

    /// Upgrade policy, or its zero value
    pub fn upgrade(&self) -> UpgradeSpec {
        self.spec.upgrade.clone().unwrap_or_default()
    }

    /// Test policy, or its zero value
    pub fn test(&self) -> TestSpec {
        self.spec.test.clone().unwrap_or_default()
    }

    /// Rollback policy, or its zero value
    pub fn rollback(&self) -> RollbackSpec {
        self.spec.rollback.clone().unwrap_or_default()
    }

    /// Uninstall policy, or its zero value
    pub fn uninstall(&self) -> UninstallSpec {
        self.spec.uninstall.clone().unwrap_or_default()
    }

    /// Drift detection policy, or its zero value
    pub fn drift_detection(&self) -> DriftDetectionSpec {
        self.spec.drift_detection.clone().unwrap_or_default()
    }

    /// Timeout for engine operations: the spec timeout, or the given
    /// default when none is declared
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.spec.timeout.unwrap_or(default)
    }

    /// The remediation policy that applies to the current failure, if any
    ///
    /// Follows the most recent attempted release action: install
    /// remediation after an install, upgrade remediation after an upgrade.
    /// Absent until a release action has been attempted.
    pub fn active_remediation(&self) -> Option<Remediation> {
        match self.status.last_attempted_release_action? {
            ReleaseAction::Install => Some(Remediation::Install(self.install().remediation())),
            ReleaseAction::Upgrade => Some(Remediation::Upgrade(self.upgrade().remediation())),
        }
    }

    /// Whether the object carries Ready=True
    pub fn is_ready(&self) -> bool {
        self.status.conditions.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remediation::{Remediation, UpgradeRemediation};
    use crate::spec::ChartSpec;

    fn release() -> Release {
        Release::new(
            "podinfo",
            "default",
            ChartSpec::new("podinfo", "https://charts.example.com"),
        )
    }

    #[test]
    fn test_policy_accessors_default() {
        let obj = release();
        assert!(!obj.test().enable);
        assert_eq!(obj.timeout_or(DEFAULT_TIMEOUT), DEFAULT_TIMEOUT);
        assert_eq!(obj.install().remediation().retries, 0);
    }

    #[test]
    fn test_spec_timeout_wins_over_default() {
        let mut obj = release();
        obj.spec.timeout = Some(Duration::from_secs(600));
        assert_eq!(obj.timeout_or(DEFAULT_TIMEOUT), Duration::from_secs(600));
    }

    #[test]
    fn test_active_remediation_absent_without_attempt() {
        let obj = release();
        assert!(obj.active_remediation().is_none());
    }

    #[test]
    fn test_active_remediation_follows_last_attempt() {
        let mut obj = release();
        obj.spec.upgrade = Some(UpgradeSpec {
            remediation: Some(UpgradeRemediation {
                retries: 3,
                ..Default::default()
            }),
            ..Default::default()
        });

        obj.status.last_attempted_release_action = Some(ReleaseAction::Install);
        assert!(matches!(
            obj.active_remediation(),
            Some(Remediation::Install(_))
        ));

        obj.status.last_attempted_release_action = Some(ReleaseAction::Upgrade);
        match obj.active_remediation() {
            Some(Remediation::Upgrade(rem)) => assert_eq!(rem.retries, 3),
            other => panic!("unexpected remediation: {other:?}"),
        }
    }
}
