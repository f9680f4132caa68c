//! Anneal Types - Core types for the anneal release control plane
//!
//! Anneal drives a user-declared release of a templated application toward
//! the actual state of a downstream release engine. This crate holds the
//! declared object model shared by the reconciler and its collaborators.
//!
//! ## Key Concepts
//!
//! - **Release**: The declared object; a chart reference, values, and the
//!   policies governing install, upgrade, test, rollback, uninstall, and
//!   drift detection.
//! - **History**: The ordered record of release snapshots persisted on the
//!   object, used to pick rollback targets.
//! - **Remediation**: The corrective policy that applies after a failed
//!   release action (roll back to a previous snapshot, or uninstall).
//! - **Conditions**: Typed boolean-with-reason assertions maintained on the
//!   object by the reconciler.
//! - **Events**: Unified observability stream for release lifecycle
//!   activity.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod condition;
pub mod diff;
pub mod events;
pub mod history;
pub mod release;
pub mod remediation;
pub mod spec;
pub mod status;

// Re-export main types
pub use condition::{Condition, ConditionStatus, Conditions, OWNED_CONDITIONS};
pub use diff::{DiffEntry, DiffKind, DiffSet};
pub use events::{EventSeverity, ReleaseEventEnvelope};
pub use history::{History, Snapshot, SnapshotStatus, TestPhase, TestRun};
pub use release::Release;
pub use remediation::{
    InstallRemediation, Remediation, RemediationStrategy, UpgradeRemediation,
};
pub use spec::{
    ChartSpec, DriftDetectionMode, DriftDetectionSpec, InstallSpec, ReleaseSpec, RollbackSpec,
    SpecValidationError, TestSpec, UninstallSpec, UpgradeSpec,
};
pub use status::{ReleaseAction, ReleaseStatus};
