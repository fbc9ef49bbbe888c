use serde::Serialize;

use super::domain::{DecisionKind, DecisionSnapshot, ViolationStatus};

/// Actions that drive a violation along the lifecycle graph.
///
/// Creation is not listed: a report enters directly in `AWAITING_OWNER` with
/// its decision pre-stamped, so there is no guarded source status for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    OwnerAccept,
    OwnerObject,
    OfficerConfirm,
    OfficerOverride,
}

impl LifecycleAction {
    pub const fn label(self) -> &'static str {
        match self {
            LifecycleAction::OwnerAccept => "accept",
            LifecycleAction::OwnerObject => "object",
            LifecycleAction::OfficerConfirm => "confirm",
            LifecycleAction::OfficerOverride => "override",
        }
    }

    /// Source status this action's guard requires.
    pub const fn required_status(self) -> ViolationStatus {
        match self {
            LifecycleAction::OwnerAccept | LifecycleAction::OwnerObject => {
                ViolationStatus::AwaitingOwner
            }
            LifecycleAction::OfficerConfirm | LifecycleAction::OfficerOverride => {
                ViolationStatus::Objected
            }
        }
    }
}

/// A guarded action was attempted outside its source status. The record is
/// left untouched; re-attempting an already-performed transition fails the
/// same way rather than silently succeeding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {} a violation in status {}", .action.label(), .found.label())]
pub struct InvalidTransition {
    pub action: LifecycleAction,
    pub found: ViolationStatus,
}

pub(crate) fn guard(
    action: LifecycleAction,
    current: ViolationStatus,
) -> Result<(), InvalidTransition> {
    if current == action.required_status() {
        Ok(())
    } else {
        Err(InvalidTransition {
            action,
            found: current,
        })
    }
}

/// How an owner's acceptance settles, once the guard has passed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AcceptResolution {
    /// The decision carried a fine: escalate, record a payment, mark paid.
    Settle { base_amount: f64 },
    /// Notice/review decisions close without a payment.
    Close,
}

pub(crate) fn settlement(decision: &DecisionSnapshot) -> AcceptResolution {
    match decision.decision {
        DecisionKind::Fine => AcceptResolution::Settle {
            base_amount: decision.amount,
        },
        _ => AcceptResolution::Close,
    }
}

/// Owner objection: status moves to OBJECTED and the decision is replaced by
/// a human-flagged copy of itself. Rule provenance is untouched.
pub(crate) fn apply_objection(
    current: ViolationStatus,
    decision: &DecisionSnapshot,
) -> Result<(ViolationStatus, DecisionSnapshot), InvalidTransition> {
    guard(LifecycleAction::OwnerObject, current)?;
    Ok((ViolationStatus::Objected, decision.flagged_for_human()))
}

/// Officer upholds the decision: CLOSED, decision CONFIRMED, amount kept.
pub(crate) fn apply_confirmation(
    current: ViolationStatus,
    decision: &DecisionSnapshot,
) -> Result<(ViolationStatus, DecisionSnapshot), InvalidTransition> {
    guard(LifecycleAction::OfficerConfirm, current)?;
    Ok((ViolationStatus::Closed, decision.confirmed()))
}

/// Officer strikes the decision down: CLOSED, decision OVERRIDDEN, amount
/// zeroed, reason recorded.
pub(crate) fn apply_override(
    current: ViolationStatus,
    decision: &DecisionSnapshot,
    reason: String,
) -> Result<(ViolationStatus, DecisionSnapshot), InvalidTransition> {
    guard(LifecycleAction::OfficerOverride, current)?;
    Ok((ViolationStatus::Closed, decision.overridden(reason)))
}
