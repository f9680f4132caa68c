//! Recorded status of the declared object

use crate::condition::Conditions;
use crate::history::History;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The release-kind action most recently attempted against the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseAction {
    Install,
    Upgrade,
}

impl fmt::Display for ReleaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseAction::Install => write!(f, "install"),
            ReleaseAction::Upgrade => write!(f, "upgrade"),
        }
    }
}

/// Observed status recorded on the declared object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseStatus {
    /// Prior release snapshots, most recent last
    #[serde(default)]
    pub history: History,

    /// Most recent release-kind action tried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempted_release_action: Option<ReleaseAction>,

    /// Chart version of the latest in-sync release
    ///
    /// Deprecated compatibility projection; written only when the release
    /// is observed in-sync and scheduled for removal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_applied_revision: Option<String>,

    /// Accounted install failures since the last success
    #[serde(default)]
    pub install_failures: i64,

    /// Accounted upgrade failures since the last success
    #[serde(default)]
    pub upgrade_failures: i64,

    /// Conditions maintained on the object
    #[serde(default)]
    pub conditions: Conditions,

    /// Generation most recently acted upon, written by the caller
    #[serde(default)]
    pub observed_generation: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_action_display() {
        assert_eq!(ReleaseAction::Install.to_string(), "install");
        assert_eq!(ReleaseAction::Upgrade.to_string(), "upgrade");
    }

    #[test]
    fn test_default_status_is_empty() {
        let status = ReleaseStatus::default();
        assert!(status.history.is_empty());
        assert!(status.last_attempted_release_action.is_none());
        assert_eq!(status.install_failures, 0);
        assert_eq!(status.upgrade_failures, 0);
    }
}
