//! Remediation policies for failed release actions
//!
//! A remediation describes the corrective action taken after an install or
//! upgrade failure, and how many failures may accumulate before the
//! reconciler gives up.

use crate::release::Release;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Corrective strategy applied to a failed release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemediationStrategy {
    /// Roll back to the previous successful snapshot
    Rollback,

    /// Uninstall the release
    Uninstall,
}

impl fmt::Display for RemediationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemediationStrategy::Rollback => write!(f, "rollback"),
            RemediationStrategy::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// Remediation policy for failed installs
///
/// Installs can only be remediated by uninstalling; the strategy is fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallRemediation {
    /// Number of failures tolerated before giving up; negative means
    /// unlimited retries
    #[serde(default)]
    pub retries: i64,

    /// Override for the test policy's ignore_failures during remediation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_test_failures: Option<bool>,

    /// Remediate the final failure even when retries are spent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediate_last_failure: Option<bool>,
}

impl InstallRemediation {
    pub fn retries_exhausted(&self, object: &Release) -> bool {
        self.retries >= 0 && object.status.install_failures > self.retries
    }

    pub fn must_remediate_last_failure(&self) -> bool {
        self.remediate_last_failure.unwrap_or(false)
    }

    pub fn must_ignore_test_failures(&self, default: bool) -> bool {
        self.ignore_test_failures.unwrap_or(default)
    }
}

/// Remediation policy for failed upgrades
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeRemediation {
    /// Number of failures tolerated before giving up; negative means
    /// unlimited retries
    #[serde(default)]
    pub retries: i64,

    /// Override for the test policy's ignore_failures during remediation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_test_failures: Option<bool>,

    /// Remediate the final failure even when retries are spent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediate_last_failure: Option<bool>,

    /// Strategy used to remediate; defaults to rollback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<RemediationStrategy>,
}

impl UpgradeRemediation {
    pub fn strategy(&self) -> RemediationStrategy {
        self.strategy.unwrap_or(RemediationStrategy::Rollback)
    }

    pub fn retries_exhausted(&self, object: &Release) -> bool {
        self.retries >= 0 && object.status.upgrade_failures > self.retries
    }

    /// When unset, a configured retry budget implies the last failure is
    /// remediated as well
    pub fn must_remediate_last_failure(&self) -> bool {
        self.remediate_last_failure.unwrap_or(self.retries > 0)
    }

    pub fn must_ignore_test_failures(&self, default: bool) -> bool {
        self.ignore_test_failures.unwrap_or(default)
    }
}

/// The remediation policy active for the declared object
///
/// Which policy applies follows the most recent attempted release action:
/// install remediation after an install, upgrade remediation after an
/// upgrade. See [`Release::active_remediation`].
#[derive(Debug, Clone)]
pub enum Remediation {
    Install(InstallRemediation),
    Upgrade(UpgradeRemediation),
}

impl Remediation {
    /// Strategy used to remediate a failure
    pub fn strategy(&self) -> RemediationStrategy {
        match self {
            Remediation::Install(_) => RemediationStrategy::Uninstall,
            Remediation::Upgrade(up) => up.strategy(),
        }
    }

    /// Accounted failures for the action this remediation covers
    pub fn failure_count(&self, object: &Release) -> i64 {
        match self {
            Remediation::Install(_) => object.status.install_failures,
            Remediation::Upgrade(_) => object.status.upgrade_failures,
        }
    }

    /// Whether the failure budget is spent
    pub fn retries_exhausted(&self, object: &Release) -> bool {
        match self {
            Remediation::Install(rem) => rem.retries_exhausted(object),
            Remediation::Upgrade(rem) => rem.retries_exhausted(object),
        }
    }

    /// Whether the final failure must be remediated even with retries spent
    pub fn must_remediate_last_failure(&self) -> bool {
        match self {
            Remediation::Install(rem) => rem.must_remediate_last_failure(),
            Remediation::Upgrade(rem) => rem.must_remediate_last_failure(),
        }
    }

    /// Resolve the effective ignore-test-failures predicate
    pub fn must_ignore_test_failures(&self, default: bool) -> bool {
        match self {
            Remediation::Install(rem) => rem.must_ignore_test_failures(default),
            Remediation::Upgrade(rem) => rem.must_ignore_test_failures(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::Release;
    use crate::spec::ChartSpec;

    fn release() -> Release {
        Release::new("podinfo", "default", ChartSpec::new("podinfo", "https://charts.example.com"))
    }

    #[test]
    fn test_install_retries_exhausted() {
        let mut obj = release();
        let rem = InstallRemediation {
            retries: 2,
            ..Default::default()
        };

        obj.status.install_failures = 2;
        assert!(!rem.retries_exhausted(&obj));

        obj.status.install_failures = 3;
        assert!(rem.retries_exhausted(&obj));
    }

    #[test]
    fn test_negative_retries_never_exhaust() {
        let mut obj = release();
        obj.status.upgrade_failures = 1_000;

        let rem = UpgradeRemediation {
            retries: -1,
            ..Default::default()
        };
        assert!(!rem.retries_exhausted(&obj));
    }

    #[test]
    fn test_upgrade_remediate_last_failure_follows_retries() {
        let rem = UpgradeRemediation::default();
        assert!(!rem.must_remediate_last_failure());

        let rem = UpgradeRemediation {
            retries: 3,
            ..Default::default()
        };
        assert!(rem.must_remediate_last_failure());

        let rem = UpgradeRemediation {
            retries: 3,
            remediate_last_failure: Some(false),
            ..Default::default()
        };
        assert!(!rem.must_remediate_last_failure());
    }

    #[test]
    fn test_install_remediate_last_failure_defaults_false() {
        let rem = InstallRemediation {
            retries: 3,
            ..Default::default()
        };
        assert!(!rem.must_remediate_last_failure());
    }

    #[test]
    fn test_ignore_test_failures_override() {
        let rem = Remediation::Upgrade(UpgradeRemediation::default());
        assert!(rem.must_ignore_test_failures(true));
        assert!(!rem.must_ignore_test_failures(false));

        let rem = Remediation::Upgrade(UpgradeRemediation {
            ignore_test_failures: Some(true),
            ..Default::default()
        });
        assert!(rem.must_ignore_test_failures(false));
    }

    #[test]
    fn test_strategy_defaults() {
        assert_eq!(
            Remediation::Install(InstallRemediation::default()).strategy(),
            RemediationStrategy::Uninstall
        );
        assert_eq!(
            Remediation::Upgrade(UpgradeRemediation::default()).strategy(),
            RemediationStrategy::Rollback
        );
    }
}
