//! Action selection
//!
//! Maps the observed release state and the declared object to the next
//! action, or to none when the release is settled, or to a terminal error
//! when the retry budget is spent.

use crate::action::Action;
use crate::diff::DiffSummarizer;
use crate::error::ReconcileError;
use crate::event::EventRecorder;
use crate::request::Request;
use crate::state::{ObservedState, ReleaseState};
use crate::verify::SnapshotVerifier;
use anneal_types::events::REASON_DRIFT_DETECTED;
use anneal_types::{DiffKind, EventSeverity, RemediationStrategy};
use std::sync::Arc;
use tracing::{debug, info};

/// Selects the next action for an observed state
pub struct ActionSelector {
    recorder: Arc<dyn EventRecorder>,
    verifier: Arc<dyn SnapshotVerifier>,
    summarizer: Arc<dyn DiffSummarizer>,
}

impl ActionSelector {
    pub fn new(
        recorder: Arc<dyn EventRecorder>,
        verifier: Arc<dyn SnapshotVerifier>,
        summarizer: Arc<dyn DiffSummarizer>,
    ) -> Self {
        Self {
            recorder,
            verifier,
            summarizer,
        }
    }

    /// Decide the next action based on the observed state
    ///
    /// `Ok(None)` means the release is settled for this pass. History is
    /// only rewritten here, through truncate and clear.
    pub async fn select(
        &self,
        req: &mut Request,
        state: &ReleaseState,
    ) -> Result<Option<Action>, ReconcileError> {
        match state.status {
            ObservedState::InSync => {
                info!("release in-sync with desired state");

                // Hold on to the previous release result so a rollback
                // target remains available when e.g. tests are enabled
                // without further changes to the release.
                let mut ignore_failures = req.object.test().ignore_failures;
                if let Some(remediation) = req.object.active_remediation() {
                    ignore_failures = remediation.must_ignore_test_failures(ignore_failures);
                }
                req.object.status.history.truncate(ignore_failures);

                // TODO: last_applied_revision keeps existing UIs working;
                // drop the projection once they read history.
                if let Some(latest) = req.object.status.history.latest() {
                    let revision = latest.chart_version.to_string();
                    req.object.status.last_applied_revision = Some(revision);
                }

                Ok(None)
            }
            ObservedState::Locked => {
                info!(reason = %state.reason, "release locked");
                Ok(Some(Action::Unlock))
            }
            ObservedState::Absent => {
                info!(reason = %state.reason, "release not installed");

                if req
                    .object
                    .install()
                    .remediation()
                    .retries_exhausted(&req.object)
                {
                    return Err(ReconcileError::ExceededMaxRetries {
                        context: "cannot install release".into(),
                    });
                }

                Ok(Some(Action::Install))
            }
            ObservedState::Unmanaged => {
                info!(reason = %state.reason, "release not managed by controller");

                // The recorded history describes a release this controller
                // did not make; it can no longer be relied on.
                req.object.status.history.clear();

                Ok(Some(Action::Upgrade))
            }
            ObservedState::OutOfSync => {
                info!(reason = %state.reason, "release out-of-sync with desired state");

                if req
                    .object
                    .upgrade()
                    .remediation()
                    .retries_exhausted(&req.object)
                {
                    return Err(ReconcileError::ExceededMaxRetries {
                        context: "cannot upgrade release".into(),
                    });
                }

                Ok(Some(Action::Upgrade))
            }
            ObservedState::Drifted => {
                info!(
                    summary = %self.summarizer.summarize_brief(&state.diff),
                    "detected changes in cluster state"
                );

                let full_name = req
                    .object
                    .status
                    .history
                    .latest()
                    .map(|s| s.full_release_name())
                    .unwrap_or_else(|| {
                        format!("{}/{}", req.object.namespace, req.object.name)
                    });
                self.recorder.record(
                    &req.object,
                    EventSeverity::Warning,
                    REASON_DRIFT_DETECTED,
                    format!(
                        "Cluster state of release {} has drifted from the desired state:\n{}",
                        full_name,
                        self.summarizer.summarize(&state.diff)
                    ),
                );

                if req.object.drift_detection().mode
                    == anneal_types::DriftDetectionMode::Enabled
                {
                    return Ok(Some(Action::Upgrade));
                }

                for entry in state.diff.iter() {
                    if entry.kind != DiffKind::Delete {
                        debug!(kind = %entry.kind, path = %entry.path, "observed change in cluster state");
                    }
                }

                Ok(None)
            }
            ObservedState::Untested => {
                info!(reason = %state.reason, "release has not been tested");
                Ok(Some(Action::Test))
            }
            ObservedState::Failed => {
                info!(reason = %state.reason, "release is in a failed state");
                self.action_for_failure(req).await
            }
        }
    }

    /// Decide the remediation path for a failed release
    async fn action_for_failure(
        &self,
        req: &mut Request,
    ) -> Result<Option<Action>, ReconcileError> {
        // Without a remediation policy, re-attempting the upgrade is the
        // only forward motion available.
        let Some(remediation) = req.object.active_remediation() else {
            debug!("no active remediation strategy");
            return Ok(Some(Action::Upgrade));
        };

        // Without an accounted failure, the conditions under which the
        // failure occurred must have changed; attempt the release again.
        if remediation.failure_count(&req.object) <= 0 {
            info!("release conditions have changed since last failure");
            return Ok(Some(Action::Upgrade));
        }

        if remediation.retries_exhausted(&req.object)
            && !remediation.must_remediate_last_failure()
        {
            return Err(ReconcileError::ExceededMaxRetries {
                context: "cannot remediate failed release".into(),
            });
        }

        // Reset the history up to the point the failure occurred, so
        // failures do not accumulate.
        let ignore_failures =
            remediation.must_ignore_test_failures(req.object.test().ignore_failures);
        req.object.status.history.truncate(ignore_failures);

        match remediation.strategy() {
            RemediationStrategy::Rollback => {
                let Some(previous) = req.object.status.history.previous(ignore_failures).cloned()
                else {
                    info!("no previous release to roll back to, attempting upgrade");
                    return Ok(Some(Action::Upgrade));
                };

                // Verify the target is still in storage and unmodified
                // before instructing to roll back to it.
                if let Err(err) = self.verifier.verify(&previous).await {
                    if err.target_corrupt() {
                        info!(
                            error = %err,
                            "unable to verify previous release in storage to roll back to"
                        );
                        return Ok(Some(Action::Upgrade));
                    }
                    return Err(ReconcileError::Verify(err));
                }

                Ok(Some(Action::RollbackRemediation))
            }
            RemediationStrategy::Uninstall => Ok(Some(Action::UninstallRemediation)),
        }
    }
}
