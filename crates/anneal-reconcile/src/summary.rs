//! Ready condition summarization
//!
//! When the driver exits with no next action, the owned conditions are
//! folded into a single Ready condition. This also restores Ready after a
//! transient error overwrote it on an earlier pass.

use anneal_types::{condition, ConditionStatus, Release};

/// Recompute the Ready condition from the owned conditions
///
/// Precedence: a stalled object is never ready; a remediated release is
/// not ready until a new release succeeds; failed tests block readiness
/// unless the test policy ignores failures; otherwise Ready mirrors the
/// Released condition. With no owned condition present the release is
/// in-sync and ready.
pub fn summarize(object: &mut Release) {
    if let Some(stalled) = object.status.conditions.get(condition::STALLED).cloned() {
        if stalled.status == ConditionStatus::True {
            object
                .status
                .conditions
                .mark_false(condition::READY, &stalled.reason, stalled.message);
            return;
        }
    }

    if let Some(remediated) = object.status.conditions.get(condition::REMEDIATED).cloned() {
        object
            .status
            .conditions
            .mark_false(condition::READY, &remediated.reason, remediated.message);
        return;
    }

    let test = object.test();
    if test.enable && !test.ignore_failures {
        if let Some(tested) = object.status.conditions.get(condition::TEST_SUCCESS).cloned() {
            if tested.status == ConditionStatus::False {
                object
                    .status
                    .conditions
                    .mark_false(condition::READY, &tested.reason, tested.message);
                return;
            }
        }
    }

    if let Some(released) = object.status.conditions.get(condition::RELEASED).cloned() {
        match released.status {
            ConditionStatus::True => {
                object
                    .status
                    .conditions
                    .mark_true(condition::READY, &released.reason, released.message);
                return;
            }
            ConditionStatus::False => {
                object
                    .status
                    .conditions
                    .mark_false(condition::READY, &released.reason, released.message);
                return;
            }
            ConditionStatus::Unknown => {}
        }
    }

    object.status.conditions.mark_true(
        condition::READY,
        "InSync",
        "Release is in-sync with the desired state",
    );
}
