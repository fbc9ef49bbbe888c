use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::decision::{DecisionConfig, DecisionEngine};
use super::domain::{UserId, ViolationId, ViolationReport, ViolationStatus};
use super::escalation;
use super::intake::{self, IntakeGuard, ValidationError};
use super::repository::{
    CommitOutcome, DecisionNotice, DecisionNotifier, LedgerError, NotifyError, PaymentLedger,
    PaymentRecord, PropertyDirectory, RepositoryError, ViolationRecord, ViolationRepository,
};
use super::rules::{RuleLookupError, RuleRepository};
use super::transitions::{self, AcceptResolution, InvalidTransition, LifecycleAction};

static VIOLATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static RECEIPT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static TRANSACTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_violation_id() -> ViolationId {
    let id = VIOLATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ViolationId(format!("vio-{id:06}"))
}

fn next_receipt_number() -> String {
    let id = RECEIPT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("RCPT-{id:08}")
}

fn next_transaction_id() -> String {
    let id = TRANSACTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("TXN-{id:010}")
}

/// Service composing intake, decisioning, the lifecycle transitions, and the
/// storage seams.
pub struct EnforcementService<R, L, N> {
    intake: IntakeGuard,
    rules: Arc<dyn RuleRepository>,
    properties: Arc<dyn PropertyDirectory>,
    repository: Arc<R>,
    ledger: Arc<L>,
    notifier: Arc<N>,
    engine: DecisionEngine,
}

impl<R, L, N> EnforcementService<R, L, N>
where
    R: ViolationRepository + 'static,
    L: PaymentLedger + 'static,
    N: DecisionNotifier + 'static,
{
    pub fn new(
        rules: Arc<dyn RuleRepository>,
        properties: Arc<dyn PropertyDirectory>,
        repository: Arc<R>,
        ledger: Arc<L>,
        notifier: Arc<N>,
        config: DecisionConfig,
    ) -> Self {
        Self {
            intake: IntakeGuard::default(),
            rules,
            properties,
            repository,
            ledger,
            notifier,
            engine: DecisionEngine::new(config),
        }
    }

    /// Admit a citizen report, stamp the automated decision, and persist the
    /// violation awaiting the owner's response.
    pub fn create_violation(
        &self,
        report: ViolationReport,
    ) -> Result<ViolationRecord, EnforcementError> {
        let admitted = self.intake.admit(report)?;

        let mut addressed_owner = None;
        let mut property_entity_type = None;
        if let Some(property_id) = &admitted.related_property {
            let property = self
                .properties
                .fetch(property_id)?
                .ok_or_else(|| NotFoundError::Property(property_id.0.clone()))?;
            if !property.standing.is_active() {
                return Err(NotFoundError::PropertyInactive(property_id.0.clone()).into());
            }
            addressed_owner = Some(property.owner);
            property_entity_type = Some(property.entity_type);
        }

        let entity_hint = admitted
            .entity_type
            .as_deref()
            .or(property_entity_type.as_deref());
        let decision = self.engine.decide(
            self.rules.as_ref(),
            &admitted.violation_type,
            entity_hint,
            Some(&admitted.description),
        )?;

        let now = Utc::now();
        let record = ViolationRecord {
            id: next_violation_id(),
            reported_by: admitted.reported_by,
            related_property: admitted.related_property,
            addressed_owner,
            violation_type: admitted.violation_type,
            description: admitted.description,
            location: admitted.location,
            media: admitted.media,
            decision,
            status: ViolationStatus::AwaitingOwner,
            objection_reason: None,
            reported_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        info!(
            violation = %stored.id.0,
            violation_type = %stored.violation_type,
            decision = stored.decision.decision.label(),
            "violation admitted"
        );

        self.notifier.publish(DecisionNotice {
            violation: stored.id.clone(),
            decision: stored.decision.decision,
            amount: stored.decision.amount,
            requires_human: stored.decision.requires_human,
            addressed_owner: stored.addressed_owner.clone(),
        })?;

        Ok(stored)
    }

    /// Owner accepts the decision. Fines settle at the escalated amount and
    /// produce a payment record; notice/review decisions simply close.
    pub fn owner_accept(
        &self,
        id: &ViolationId,
        acting_owner: &UserId,
    ) -> Result<ViolationRecord, EnforcementError> {
        let record = self.fetch_record(id)?;
        transitions::guard(LifecycleAction::OwnerAccept, record.status)?;
        self.authorize_owner(&record, acting_owner)?;

        let mut updated = record;
        updated.updated_at = Utc::now();
        if updated.addressed_owner.is_none() {
            updated.addressed_owner = Some(acting_owner.clone());
        }

        let payment = match transitions::settlement(&updated.decision) {
            AcceptResolution::Settle { base_amount } => {
                let prior = self.repository.settled_count_for_owner(acting_owner, id)?;
                let final_amount = escalation::escalate(base_amount, prior);
                updated.decision = updated.decision.with_amount(final_amount);
                updated.status = ViolationStatus::Paid;
                Some(PaymentRecord {
                    violation: id.clone(),
                    payer: acting_owner.clone(),
                    amount: final_amount,
                    receipt_number: next_receipt_number(),
                    transaction_id: next_transaction_id(),
                    recorded_at: updated.updated_at,
                })
            }
            AcceptResolution::Close => {
                updated.status = ViolationStatus::Closed;
                None
            }
        };

        self.commit_transition(
            ViolationStatus::AwaitingOwner,
            updated.clone(),
            LifecycleAction::OwnerAccept,
        )?;

        if let Some(payment) = payment {
            self.ledger.record(payment.clone())?;
            info!(
                violation = %id.0,
                amount = payment.amount,
                receipt = %payment.receipt_number,
                "fine settled"
            );
        } else {
            info!(violation = %id.0, "violation closed on acceptance");
        }

        Ok(updated)
    }

    /// Owner objects to the decision; the record moves to the officer queue.
    pub fn owner_object(
        &self,
        id: &ViolationId,
        acting_owner: &UserId,
        reason: &str,
    ) -> Result<ViolationRecord, EnforcementError> {
        let reason = intake::require_objection_reason(reason)?;
        let record = self.fetch_record(id)?;
        transitions::guard(LifecycleAction::OwnerObject, record.status)?;
        self.authorize_owner(&record, acting_owner)?;

        let (status, decision) = transitions::apply_objection(record.status, &record.decision)?;
        let mut updated = record;
        updated.status = status;
        updated.decision = decision;
        updated.objection_reason = Some(reason);
        if updated.addressed_owner.is_none() {
            updated.addressed_owner = Some(acting_owner.clone());
        }
        updated.updated_at = Utc::now();

        self.commit_transition(
            ViolationStatus::AwaitingOwner,
            updated.clone(),
            LifecycleAction::OwnerObject,
        )?;
        info!(violation = %id.0, "objection recorded");

        Ok(updated)
    }

    /// Officer upholds the objected decision and closes the record.
    pub fn officer_confirm(&self, id: &ViolationId) -> Result<ViolationRecord, EnforcementError> {
        let record = self.fetch_record(id)?;
        let (status, decision) = transitions::apply_confirmation(record.status, &record.decision)?;

        let mut updated = record;
        updated.status = status;
        updated.decision = decision;
        updated.updated_at = Utc::now();

        self.commit_transition(
            ViolationStatus::Objected,
            updated.clone(),
            LifecycleAction::OfficerConfirm,
        )?;
        info!(violation = %id.0, "objection rejected, decision confirmed");

        Ok(updated)
    }

    /// Officer strikes the objected decision down and closes the record.
    pub fn officer_override(
        &self,
        id: &ViolationId,
        reason: &str,
    ) -> Result<ViolationRecord, EnforcementError> {
        let reason = intake::require_override_reason(reason)?;
        let record = self.fetch_record(id)?;
        let (status, decision) =
            transitions::apply_override(record.status, &record.decision, reason)?;

        let mut updated = record;
        updated.status = status;
        updated.decision = decision;
        updated.updated_at = Utc::now();

        self.commit_transition(
            ViolationStatus::Objected,
            updated.clone(),
            LifecycleAction::OfficerOverride,
        )?;
        info!(violation = %id.0, "decision overridden, record closed");

        Ok(updated)
    }

    /// Fetch a single violation for API responses.
    pub fn violation(&self, id: &ViolationId) -> Result<ViolationRecord, EnforcementError> {
        self.fetch_record(id)
    }

    /// Violations waiting on a permit holder's response.
    pub fn awaiting_owner(&self) -> Result<Vec<ViolationRecord>, EnforcementError> {
        Ok(self.repository.by_status(ViolationStatus::AwaitingOwner)?)
    }

    /// Objected violations queued for officer adjudication.
    pub fn objected(&self) -> Result<Vec<ViolationRecord>, EnforcementError> {
        Ok(self.repository.by_status(ViolationStatus::Objected)?)
    }

    /// Payments recorded against a violation.
    pub fn payments_for(&self, id: &ViolationId) -> Result<Vec<PaymentRecord>, EnforcementError> {
        self.fetch_record(id)?;
        Ok(self.ledger.for_violation(id)?)
    }

    fn fetch_record(&self, id: &ViolationId) -> Result<ViolationRecord, EnforcementError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| NotFoundError::Violation(id.0.clone()).into())
    }

    /// An addressed owner must act in person; unaddressed violations accept
    /// the first permit holder who responds as the addressed party.
    fn authorize_owner(
        &self,
        record: &ViolationRecord,
        acting_owner: &UserId,
    ) -> Result<(), Forbidden> {
        match &record.addressed_owner {
            Some(owner) if owner != acting_owner => Err(Forbidden {
                actor: acting_owner.0.clone(),
                violation: record.id.0.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn commit_transition(
        &self,
        expected: ViolationStatus,
        record: ViolationRecord,
        action: LifecycleAction,
    ) -> Result<(), EnforcementError> {
        match self.repository.commit(expected, record)? {
            CommitOutcome::Applied => Ok(()),
            CommitOutcome::Superseded(found) => Err(InvalidTransition { action, found }.into()),
        }
    }
}

/// Errors surfaced by the enforcement facade, grouped by who must handle
/// them. Domain errors are expected outcomes and never retried; only the
/// infrastructure class is a candidate for caller-side retry, and then only
/// because the compare-and-swap commit makes a blind retry safe to reject.
#[derive(Debug, thiserror::Error)]
pub enum EnforcementError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Forbidden(#[from] Forbidden),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),
}

/// Referenced entity missing from its registry.
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    #[error("violation {0} not found")]
    Violation(String),
    #[error("property {0} not found")]
    Property(String),
    #[error("property {0} is not active")]
    PropertyInactive(String),
}

/// Actor lacks authority over the violation it tried to act on.
#[derive(Debug, thiserror::Error)]
#[error("user {actor} is not the addressed owner of violation {violation}")]
pub struct Forbidden {
    pub actor: String,
    pub violation: String,
}

/// Persistence or collaborator failure: not a domain outcome.
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    #[error(transparent)]
    Store(#[from] RepositoryError),
    #[error(transparent)]
    Rules(#[from] RuleLookupError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl From<RepositoryError> for EnforcementError {
    fn from(value: RepositoryError) -> Self {
        Self::Infrastructure(value.into())
    }
}

impl From<RuleLookupError> for EnforcementError {
    fn from(value: RuleLookupError) -> Self {
        Self::Infrastructure(value.into())
    }
}

impl From<LedgerError> for EnforcementError {
    fn from(value: LedgerError) -> Self {
        Self::Infrastructure(value.into())
    }
}

impl From<NotifyError> for EnforcementError {
    fn from(value: NotifyError) -> Self {
        Self::Infrastructure(value.into())
    }
}
