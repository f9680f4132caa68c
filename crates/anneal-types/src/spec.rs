//! Declared release specification and per-action policies
//!
//! A ReleaseSpec describes the desired release: the chart to render, the
//! values to render it with, and the policies governing each action the
//! reconciler may take. Every policy is optional; accessors on
//! [`crate::Release`] substitute zero-value defaults so callers never deal
//! with absent policy blocks.

use crate::remediation::{InstallRemediation, UpgradeRemediation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Desired state of a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSpec {
    /// Chart to release
    pub chart: ChartSpec,

    /// Values the chart is rendered with
    #[serde(default)]
    pub values: serde_json::Value,

    /// Default timeout for release engine operations, overridable per action
    #[serde(default, with = "duration_serde")]
    pub timeout: Option<Duration>,

    /// Install policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallSpec>,

    /// Upgrade policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade: Option<UpgradeSpec>,

    /// Test policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestSpec>,

    /// Rollback policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackSpec>,

    /// Uninstall policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall: Option<UninstallSpec>,

    /// Drift detection policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_detection: Option<DriftDetectionSpec>,
}

impl ReleaseSpec {
    /// Create a spec for the given chart with all policies defaulted
    pub fn new(chart: ChartSpec) -> Self {
        Self {
            chart,
            values: serde_json::Value::Null,
            timeout: None,
            install: None,
            upgrade: None,
            test: None,
            rollback: None,
            uninstall: None,
            drift_detection: None,
        }
    }

    /// Validate the spec before it is acted upon
    pub fn validate(&self) -> Result<(), SpecValidationError> {
        if self.chart.chart.trim().is_empty() {
            return Err(SpecValidationError::EmptyChart);
        }
        if self.chart.repository.trim().is_empty() {
            return Err(SpecValidationError::EmptyRepository);
        }
        Ok(())
    }
}

/// Reference to the chart a release is rendered from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart name
    pub chart: String,

    /// Version requirement, e.g. `^1.2`
    #[serde(default = "any_version")]
    pub version: semver::VersionReq,

    /// Repository the chart is fetched from
    pub repository: String,
}

impl ChartSpec {
    /// Create a chart reference accepting any version
    pub fn new(chart: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            chart: chart.into(),
            version: semver::VersionReq::STAR,
            repository: repository.into(),
        }
    }
}

fn any_version() -> semver::VersionReq {
    semver::VersionReq::STAR
}

/// Spec validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecValidationError {
    #[error("chart name must not be empty")]
    EmptyChart,

    #[error("chart repository must not be empty")]
    EmptyRepository,
}

/// Install policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallSpec {
    /// Timeout override for the install action
    #[serde(default, with = "duration_serde")]
    pub timeout: Option<Duration>,

    /// Remediation applied when an install fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<InstallRemediation>,

    /// Create the target namespace if it does not exist
    #[serde(default)]
    pub create_namespace: bool,

    /// Skip waiting for resources to become ready
    #[serde(default)]
    pub disable_wait: bool,

    /// Skip lifecycle hooks
    #[serde(default)]
    pub disable_hooks: bool,
}

impl InstallSpec {
    /// The configured remediation, or its zero value
    pub fn remediation(&self) -> InstallRemediation {
        self.remediation.clone().unwrap_or_default()
    }

    /// The configured timeout, or the given default
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Upgrade policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeSpec {
    /// Timeout override for the upgrade action
    #[serde(default, with = "duration_serde")]
    pub timeout: Option<Duration>,

    /// Remediation applied when an upgrade fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<UpgradeRemediation>,

    /// Force resource updates through replacement
    #[serde(default)]
    pub force: bool,

    /// Allow deletion of new resources created during a failed upgrade
    #[serde(default)]
    pub cleanup_on_fail: bool,

    /// Skip waiting for resources to become ready
    #[serde(default)]
    pub disable_wait: bool,

    /// Skip lifecycle hooks
    #[serde(default)]
    pub disable_hooks: bool,
}

impl UpgradeSpec {
    /// The configured remediation, or its zero value
    pub fn remediation(&self) -> UpgradeRemediation {
        self.remediation.clone().unwrap_or_default()
    }

    /// The configured timeout, or the given default
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Test policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSpec {
    /// Run tests after install and upgrade actions
    #[serde(default)]
    pub enable: bool,

    /// Treat test failures as non-fatal
    #[serde(default)]
    pub ignore_failures: bool,

    /// Timeout override for the test action
    #[serde(default, with = "duration_serde")]
    pub timeout: Option<Duration>,
}

impl TestSpec {
    /// The configured timeout, or the given default
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Rollback policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollbackSpec {
    /// Timeout override for the rollback action
    #[serde(default, with = "duration_serde")]
    pub timeout: Option<Duration>,

    /// Recreate resources instead of updating in place
    #[serde(default)]
    pub recreate: bool,

    /// Force resource updates through replacement
    #[serde(default)]
    pub force: bool,

    /// Allow deletion of new resources created during a failed rollback
    #[serde(default)]
    pub cleanup_on_fail: bool,

    /// Skip waiting for resources to become ready
    #[serde(default)]
    pub disable_wait: bool,

    /// Skip lifecycle hooks
    #[serde(default)]
    pub disable_hooks: bool,
}

impl RollbackSpec {
    /// The configured timeout, or the given default
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Uninstall policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UninstallSpec {
    /// Timeout override for the uninstall action
    #[serde(default, with = "duration_serde")]
    pub timeout: Option<Duration>,

    /// Keep the release history in engine storage after uninstall
    #[serde(default)]
    pub keep_history: bool,

    /// Skip waiting for resources to be deleted
    #[serde(default)]
    pub disable_wait: bool,

    /// Skip lifecycle hooks
    #[serde(default)]
    pub disable_hooks: bool,
}

impl UninstallSpec {
    /// The configured timeout, or the given default
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Drift detection policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftDetectionSpec {
    /// Detection mode
    #[serde(default)]
    pub mode: DriftDetectionMode,
}

/// Drift detection mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftDetectionMode {
    /// Detect drift and correct it through an upgrade
    Enabled,

    /// Detect drift and surface it without correcting
    Warn,

    /// No drift detection
    #[default]
    Disabled,
}

/// Serde helper for optional durations
pub(crate) mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
