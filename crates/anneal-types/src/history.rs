//! Release history and snapshots
//!
//! The history records prior release operations as snapshots, most recent
//! last. The reconciler reads it to pick rollback targets and prunes it
//! through the narrow operations defined here; any broader mutation belongs
//! to the action adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one prior release operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Release name in the engine
    pub name: String,

    /// Namespace the release lives in
    pub namespace: String,

    /// Engine revision of this release
    pub version: u64,

    /// Name of the chart that was released
    pub chart_name: String,

    /// Concrete chart version that was released
    pub chart_version: semver::Version,

    /// Digest of the values the chart was rendered with
    pub config_digest: String,

    /// Digest of the release content in engine storage
    pub digest: String,

    /// When the release was first deployed
    pub first_deployed: chrono::DateTime<chrono::Utc>,

    /// When the release was last deployed
    pub last_deployed: chrono::DateTime<chrono::Utc>,

    /// Engine status of the release
    pub status: SnapshotStatus,

    /// Test runs observed for this revision; absent when tests have not run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<TestRun>>,
}

impl Snapshot {
    /// Stable identifier of the release revision, e.g. `default/podinfo.v4`
    pub fn full_release_name(&self) -> String {
        format!("{}/{}.v{}", self.namespace, self.name, self.version)
    }

    /// Whether the snapshot reached a deployed state
    pub fn deployed(&self) -> bool {
        matches!(
            self.status,
            SnapshotStatus::Deployed | SnapshotStatus::Superseded
        )
    }

    /// Whether tests have run for this revision
    pub fn has_been_tested(&self) -> bool {
        self.tests.is_some()
    }

    /// Whether all recorded test runs succeeded
    pub fn tests_succeeded(&self) -> bool {
        match &self.tests {
            Some(runs) => runs.iter().all(|r| r.phase == TestPhase::Succeeded),
            None => false,
        }
    }

    /// Whether this snapshot qualifies as a rollback target
    pub fn ready_for_rollback(&self, ignore_test_failures: bool) -> bool {
        if !self.deployed() {
            return false;
        }
        if ignore_test_failures || !self.has_been_tested() {
            return true;
        }
        self.tests_succeeded()
    }

    /// Record a test run against this snapshot
    pub fn record_test(&mut self, run: TestRun) {
        self.tests.get_or_insert_with(Vec::new).push(run);
    }
}

/// Engine status of a release revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotStatus {
    Deployed,
    Superseded,
    Failed,
    Uninstalled,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
    Uninstalling,
    Unknown,
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SnapshotStatus::Deployed => "deployed",
            SnapshotStatus::Superseded => "superseded",
            SnapshotStatus::Failed => "failed",
            SnapshotStatus::Uninstalled => "uninstalled",
            SnapshotStatus::PendingInstall => "pending-install",
            SnapshotStatus::PendingUpgrade => "pending-upgrade",
            SnapshotStatus::PendingRollback => "pending-rollback",
            SnapshotStatus::Uninstalling => "uninstalling",
            SnapshotStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

impl SnapshotStatus {
    /// Whether the release is stuck in a transactional state
    pub fn pending(&self) -> bool {
        matches!(
            self,
            SnapshotStatus::PendingInstall
                | SnapshotStatus::PendingUpgrade
                | SnapshotStatus::PendingRollback
        )
    }
}

/// One test hook execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    /// Hook name
    pub name: String,

    /// Outcome of the run
    pub phase: TestPhase,

    /// When the run completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Outcome of a test hook execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestPhase {
    Succeeded,
    Failed,
    Unknown,
}

/// Ordered record of release snapshots, most recent last
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Snapshot>);

impl History {
    /// The most recent snapshot
    pub fn latest(&self) -> Option<&Snapshot> {
        self.0.last()
    }

    /// The most recent rollback target before the latest snapshot
    pub fn previous(&self, ignore_test_failures: bool) -> Option<&Snapshot> {
        let (_, rest) = self.0.split_last()?;
        rest.iter()
            .rev()
            .find(|s| s.ready_for_rollback(ignore_test_failures))
    }

    /// Drop snapshots older than the most recent rollback target
    ///
    /// The latest snapshot is always preserved. When no prior snapshot
    /// qualifies as a rollback target, everything but the latest is
    /// dropped.
    pub fn truncate(&mut self, ignore_test_failures: bool) {
        if self.0.len() < 2 {
            return;
        }
        let last = self.0.len() - 1;
        let keep_from = self.0[..last]
            .iter()
            .rposition(|s| s.ready_for_rollback(ignore_test_failures))
            .unwrap_or(last);
        self.0.drain(..keep_from);
    }

    /// Forget all recorded snapshots
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Append a snapshot as the most recent entry
    pub fn record(&mut self, snapshot: Snapshot) {
        self.0.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.0.iter()
    }
}

impl From<Vec<Snapshot>> for History {
    fn from(snapshots: Vec<Snapshot>) -> Self {
        Self(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(version: u64, status: SnapshotStatus) -> Snapshot {
        Snapshot {
            name: "podinfo".into(),
            namespace: "default".into(),
            version,
            chart_name: "podinfo".into(),
            chart_version: semver::Version::new(6, 0, version),
            config_digest: format!("sha256:cfg{version}"),
            digest: format!("sha256:rel{version}"),
            first_deployed: chrono::Utc::now(),
            last_deployed: chrono::Utc::now(),
            status,
            tests: None,
        }
    }

    fn tested(mut snap: Snapshot, phase: TestPhase) -> Snapshot {
        snap.record_test(TestRun {
            name: "smoke".into(),
            phase,
            completed_at: Some(chrono::Utc::now()),
        });
        snap
    }

    #[test]
    fn test_latest_is_most_recent() {
        let history = History::from(vec![
            snapshot(1, SnapshotStatus::Superseded),
            snapshot(2, SnapshotStatus::Deployed),
        ]);
        assert_eq!(history.latest().unwrap().version, 2);
    }

    #[test]
    fn test_previous_skips_failed_snapshots() {
        let history = History::from(vec![
            snapshot(1, SnapshotStatus::Superseded),
            snapshot(2, SnapshotStatus::Failed),
            snapshot(3, SnapshotStatus::Deployed),
        ]);
        assert_eq!(history.previous(false).unwrap().version, 1);
    }

    #[test]
    fn test_previous_respects_test_failures() {
        let history = History::from(vec![
            snapshot(1, SnapshotStatus::Superseded),
            tested(snapshot(2, SnapshotStatus::Superseded), TestPhase::Failed),
            snapshot(3, SnapshotStatus::Deployed),
        ]);

        // A snapshot with failed tests is not a rollback target unless
        // failures are ignored.
        assert_eq!(history.previous(false).unwrap().version, 1);
        assert_eq!(history.previous(true).unwrap().version, 2);
    }

    #[test]
    fn test_previous_requires_two_entries() {
        let history = History::from(vec![snapshot(1, SnapshotStatus::Deployed)]);
        assert!(history.previous(false).is_none());
    }

    #[test]
    fn test_truncate_keeps_latest_and_rollback_target() {
        let mut history = History::from(vec![
            snapshot(1, SnapshotStatus::Superseded),
            snapshot(2, SnapshotStatus::Superseded),
            snapshot(3, SnapshotStatus::Failed),
            snapshot(4, SnapshotStatus::Deployed),
        ]);
        history.truncate(false);

        let versions: Vec<u64> = history.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![2, 3, 4]);
    }

    #[test]
    fn test_truncate_without_target_keeps_only_latest() {
        let mut history = History::from(vec![
            snapshot(1, SnapshotStatus::Failed),
            snapshot(2, SnapshotStatus::Failed),
            snapshot(3, SnapshotStatus::Failed),
        ]);
        history.truncate(false);

        let versions: Vec<u64> = history.iter().map(|s| s.version).collect();
        assert_eq!(versions, vec![3]);
    }

    #[test]
    fn test_truncate_single_entry_is_noop() {
        let mut history = History::from(vec![snapshot(1, SnapshotStatus::Deployed)]);
        history.truncate(false);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut history = History::from(vec![snapshot(1, SnapshotStatus::Deployed)]);
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_full_release_name() {
        let snap = snapshot(4, SnapshotStatus::Deployed);
        assert_eq!(snap.full_release_name(), "default/podinfo.v4");
    }

    #[test]
    fn test_pending_statuses_detected() {
        assert!(SnapshotStatus::PendingUpgrade.pending());
        assert!(!SnapshotStatus::Deployed.pending());
    }
}
