//! Continue-stop policy for the driver loop

use crate::action::{KindSet, ReconcilerKind};

/// Decides whether the driver proceeds before an action and stops after it
pub trait ReleaseStrategy: Send + Sync {
    /// Called before running the current action; true means proceed
    fn must_continue(&self, current: ReconcilerKind, previous: &KindSet) -> bool;

    /// Called after running the current action; true means stop
    fn must_stop(&self, current: ReconcilerKind, previous: &KindSet) -> bool;
}

/// Default strategy: each action kind runs at most once per invocation,
/// and any remediation ends the pass so the next tick observes the
/// remediated state
#[derive(Debug, Default)]
pub struct CleanReleaseStrategy;

impl ReleaseStrategy for CleanReleaseStrategy {
    fn must_continue(&self, current: ReconcilerKind, previous: &KindSet) -> bool {
        !previous.contains(current)
    }

    fn must_stop(&self, current: ReconcilerKind, _previous: &KindSet) -> bool {
        current == ReconcilerKind::Remediate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_must_continue_until_kind_repeats() {
        let strategy = CleanReleaseStrategy;
        let mut previous = KindSet::default();

        assert!(strategy.must_continue(ReconcilerKind::Release, &previous));
        previous.record(ReconcilerKind::Release);

        assert!(!strategy.must_continue(ReconcilerKind::Release, &previous));
        assert!(strategy.must_continue(ReconcilerKind::Test, &previous));
    }

    #[test]
    fn test_must_stop_only_after_remediation() {
        let strategy = CleanReleaseStrategy;
        let previous = KindSet::default();

        assert!(strategy.must_stop(ReconcilerKind::Remediate, &previous));
        assert!(!strategy.must_stop(ReconcilerKind::Release, &previous));
        assert!(!strategy.must_stop(ReconcilerKind::Test, &previous));
        assert!(!strategy.must_stop(ReconcilerKind::Unlock, &previous));
    }
}
