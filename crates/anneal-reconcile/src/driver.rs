//! Atomic release driver
//!
//! The driver ties the observer, selector, strategy, and action runner
//! together into a single reconciliation loop. It determines the next
//! action from the observed state and runs it, repeating until no action
//! remains, an action kind would repeat, or a remediation was run. Before
//! each action the object is marked Reconciling=True and patched; the
//! condition is removed when the loop settles.
//!
//! When the selector reports the remediation retry budget as spent, the
//! object is marked Stalled=True and [`ReconcileError::ExceededMaxRetries`]
//! is returned; the caller should not requeue until the spec changes. A
//! return of [`ReconcileError::MustRequeue`] asks the caller to requeue
//! outside the normal interval to continue progress. Any other error
//! should be retried with backoff.
//!
//! The caller is expected to patch the object one final time with the
//! request result, as it will already do so to record observations such
//! as the observed generation.

use crate::action::{ActionRunner, KindSet, ReconcilerKind};
use crate::config::ReconcilerConfig;
use crate::diff::{DiffSummarizer, PlainDiffSummarizer};
use crate::error::{ReconcileError, Result};
use crate::event::EventRecorder;
use crate::patch::{PatchOptions, Patcher};
use crate::request::Request;
use crate::selector::ActionSelector;
use crate::state::StateObserver;
use crate::strategy::{CleanReleaseStrategy, ReleaseStrategy};
use crate::summary::summarize;
use crate::verify::SnapshotVerifier;
use anneal_types::condition;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Drives a declared release toward the observed engine state
pub struct AtomicRelease {
    observer: Arc<dyn StateObserver>,
    runner: Arc<dyn ActionRunner>,
    patcher: Arc<dyn Patcher>,
    recorder: Arc<dyn EventRecorder>,
    verifier: Arc<dyn SnapshotVerifier>,
    summarizer: Arc<dyn DiffSummarizer>,
    strategy: Box<dyn ReleaseStrategy>,
    config: ReconcilerConfig,
}

impl AtomicRelease {
    /// Create a driver with the default clean-release strategy and plain
    /// diff rendering
    pub fn new(
        observer: Arc<dyn StateObserver>,
        runner: Arc<dyn ActionRunner>,
        patcher: Arc<dyn Patcher>,
        recorder: Arc<dyn EventRecorder>,
        verifier: Arc<dyn SnapshotVerifier>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            observer,
            runner,
            patcher,
            recorder,
            verifier,
            summarizer: Arc::new(PlainDiffSummarizer),
            strategy: Box::new(CleanReleaseStrategy),
            config,
        }
    }

    /// Substitute the continue-stop strategy
    pub fn with_strategy(mut self, strategy: Box<dyn ReleaseStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Substitute the diff renderer used for drift events
    pub fn with_diff_summarizer(mut self, summarizer: Arc<dyn DiffSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn name(&self) -> &'static str {
        "atomic-release"
    }

    pub fn kind(&self) -> ReconcilerKind {
        ReconcilerKind::Release
    }

    /// Run the reconciliation loop for one request
    #[instrument(
        skip(self, cancel, req),
        fields(release = %req.object.name, namespace = %req.object.namespace)
    )]
    pub async fn reconcile(&self, cancel: &CancellationToken, req: &mut Request) -> Result<()> {
        let mut previous = KindSet::default();
        let selector = ActionSelector::new(
            self.recorder.clone(),
            self.verifier.clone(),
            self.summarizer.clone(),
        );

        loop {
            // Never start a new action once the ambient cancellation has
            // fired; persist the last observation on a short detached
            // deadline so the next pass does not misclassify.
            if cancel.is_cancelled() {
                self.patch_after_cancellation(req).await;
                return Err(ReconcileError::Canceled);
            }

            debug!("determining current state of the release");
            let state = match self.observer.observe(req).await {
                Ok(state) => state,
                Err(err) => {
                    req.object.status.conditions.mark_false(
                        condition::READY,
                        "StateError",
                        format!("Could not determine release state: {err}"),
                    );
                    return Err(ReconcileError::State(err));
                }
            };

            debug!(state = %state.status, "determining next action based on current state");
            let next = match selector.select(req, &state).await {
                Ok(next) => next,
                Err(err) => {
                    if matches!(err, ReconcileError::ExceededMaxRetries { .. }) {
                        self.mark_stalled(req);
                    }
                    return Err(err);
                }
            };

            // No next action: the release has settled.
            let Some(next) = next else {
                req.object.status.conditions.delete(condition::RECONCILING);

                // Always summarize; this restores transient errors written
                // to Ready.
                summarize(&mut req.object);

                return Ok(());
            };

            if !self.strategy.must_continue(next.kind(), &previous) {
                debug!(
                    kind = %next.kind(),
                    action = next.name(),
                    "instructed to stop before running action"
                );
                req.object.status.conditions.delete(condition::RECONCILING);
                return self.stop_result(req);
            }

            // Mark the release as reconciling before the action runs, to
            // show continuous progress while long-running engine
            // operations are in flight.
            let timeout = next.timeout(&req.object, self.config.default_timeout());
            let progress_msg = format!(
                "Running '{}' action with timeout of {}s",
                next.name(),
                timeout.as_secs()
            );
            req.object.status.conditions.mark_true(
                condition::RECONCILING,
                "Progressing",
                progress_msg.clone(),
            );

            // Only release actions reset readiness; doing so for other
            // kinds would overwrite more important failure state from an
            // earlier action.
            if next.kind() == ReconcilerKind::Release {
                req.object.status.conditions.mark_unknown(
                    condition::READY,
                    "Progressing",
                    progress_msg,
                );
            }

            self.patch_progress(req).await?;

            info!(action = next.name(), timeout_secs = timeout.as_secs(), "running action");
            if let Err(err) = self.runner.run(next, req).await {
                if req.object.is_ready() {
                    req.object.status.conditions.mark_false(
                        condition::READY,
                        "ReconcileError",
                        err.to_string(),
                    );
                }
                return Err(ReconcileError::Action {
                    action: next.name(),
                    source: err,
                });
            }

            if self.strategy.must_stop(next.kind(), &previous) {
                debug!(
                    kind = %next.kind(),
                    action = next.name(),
                    "instructed to stop after running action"
                );
                req.object.status.conditions.delete(condition::RECONCILING);
                return self.stop_result(req);
            }

            previous.record(next.kind());
            self.patch_progress(req).await?;
        }
    }

    /// Outcome when the strategy ends the pass early: requeue out of the
    /// normal interval while an active remediation still has retries left
    fn stop_result(&self, req: &Request) -> Result<()> {
        match req.object.active_remediation() {
            Some(remediation) if !remediation.retries_exhausted(&req.object) => {
                Err(ReconcileError::MustRequeue)
            }
            _ => Ok(()),
        }
    }

    fn mark_stalled(&self, req: &mut Request) {
        let action = req
            .object
            .status
            .last_attempted_release_action
            .map(|a| a.to_string())
            .unwrap_or_else(|| "release".to_string());
        let failures = req
            .object
            .active_remediation()
            .map(|r| r.failure_count(&req.object))
            .unwrap_or_default();
        req.object.status.conditions.mark_true(
            condition::STALLED,
            "RetriesExceeded",
            format!("Failed to {action} after {failures} attempt(s)"),
        );
    }

    async fn patch_progress(&self, req: &Request) -> Result<()> {
        self.patcher
            .patch(&req.object, PatchOptions::owned(&self.config.field_owner))
            .await
            .map_err(ReconcileError::Patch)
    }

    /// Best-effort final patch on a deadline detached from the cancelled
    /// token; failures are logged, not returned
    async fn patch_after_cancellation(&self, req: &Request) {
        let deadline = Duration::from_secs(self.config.cancel_patch_timeout_secs);
        let patch = self
            .patcher
            .patch(&req.object, PatchOptions::owned(&self.config.field_owner));
        match tokio::time::timeout(deadline, patch).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(error = %err, "failed to patch release after cancellation");
            }
            Err(_) => {
                error!(
                    deadline_secs = deadline.as_secs(),
                    "timed out patching release after cancellation"
                );
            }
        }
    }
}
