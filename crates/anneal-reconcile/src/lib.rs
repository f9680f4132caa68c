//! Anneal Reconcile - Atomic release reconciliation core
//!
//! Drives a declared [`anneal_types::Release`] toward the actual state of
//! the downstream release engine. The driver observes the current state,
//! selects a single next action (install, upgrade, test, rollback,
//! uninstall, unlock), runs it through the injected action runner, records
//! progress on the object, and loops until the release settles, the retry
//! budget is spent, or control must yield to the caller.
//!
//! ## Architectural Boundaries
//!
//! - This crate owns: state classification contracts, action selection,
//!   the continue-stop strategy, the driver loop, and the conditions
//!   listed in [`anneal_types::OWNED_CONDITIONS`].
//! - The release-engine adapters own: engine mutations and recording
//!   their outcome (history, failure counters, result conditions) behind
//!   [`ActionRunner`].
//! - The wrapping controller owns: the work queue, requeue scheduling and
//!   backoff, and the final status patch per pass.
//!
//! ## Key Principle
//!
//! Reconciliation MUST call through interfaces, not embed engine logic.
//! The driver decides *what* runs next; adapters decide *how* it runs.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod action;
pub mod config;
pub mod diff;
pub mod driver;
pub mod error;
pub mod event;
pub mod patch;
pub mod request;
pub mod selector;
pub mod state;
pub mod strategy;
pub mod summary;
pub mod verify;

// Re-exports
pub use action::{Action, ActionError, ActionRunner, KindSet, ReconcilerKind};
pub use config::ReconcilerConfig;
pub use diff::{DiffSummarizer, PlainDiffSummarizer};
pub use driver::AtomicRelease;
pub use error::{ReconcileError, Result};
pub use event::{BroadcastEventRecorder, EventRecorder};
pub use patch::{PatchError, PatchOptions, Patcher};
pub use request::Request;
pub use selector::ActionSelector;
pub use state::{ObserveError, ObservedState, ReleaseState, StateObserver};
pub use strategy::{CleanReleaseStrategy, ReleaseStrategy};
pub use summary::summarize;
pub use verify::{SnapshotVerifier, VerifyError};
