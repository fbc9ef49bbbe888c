use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    DecisionKind, DecisionSnapshot, GeoPoint, MediaAttachment, PropertyId, UserId, ViolationId,
    ViolationStatus,
};

/// Stored violation document: the central entity other layers read. Field
/// names on the wire are the persisted contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRecord {
    pub id: ViolationId,
    pub reported_by: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_property: Option<PropertyId>,
    /// Permit holder the notice is addressed to, denormalized from the
    /// property registry at creation. Empty until someone responds when the
    /// report named no property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addressed_owner: Option<UserId>,
    pub violation_type: String,
    pub description: String,
    pub location: GeoPoint,
    pub media: Vec<MediaAttachment>,
    pub decision: DecisionSnapshot,
    pub status: ViolationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objection_reason: Option<String>,
    pub reported_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ViolationRecord {
    pub fn status_view(&self) -> ViolationStatusView {
        ViolationStatusView {
            id: self.id.clone(),
            status: self.status.label(),
            decision: self.decision.decision.label(),
            amount: self.decision.amount,
            requires_human: self.decision.requires_human,
        }
    }
}

/// Sanitized status projection for list endpoints and dashboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationStatusView {
    pub id: ViolationId,
    pub status: &'static str,
    pub decision: &'static str,
    pub amount: f64,
    pub requires_human: bool,
}

/// Result of a conditional status commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// Another writer moved the record first; carries the status found.
    Superseded(ViolationStatus),
}

/// Storage seam for violation documents.
///
/// `commit` is the compare-and-swap write that serializes transitions on a
/// single record: the update lands only while the stored status still equals
/// the caller's expectation, so two concurrent transitions cannot both
/// succeed. No cross-record coordination is offered or needed.
pub trait ViolationRepository: Send + Sync {
    fn insert(&self, record: ViolationRecord) -> Result<ViolationRecord, RepositoryError>;
    fn fetch(&self, id: &ViolationId) -> Result<Option<ViolationRecord>, RepositoryError>;
    fn commit(
        &self,
        expected: ViolationStatus,
        record: ViolationRecord,
    ) -> Result<CommitOutcome, RepositoryError>;
    fn by_status(&self, status: ViolationStatus) -> Result<Vec<ViolationRecord>, RepositoryError>;
    /// Settled (PAID or CLOSED) violations addressed to `owner`, excluding
    /// the record currently being settled. A consistency read: concurrent
    /// settlements of the same owner may observe a stale count.
    fn settled_count_for_owner(
        &self,
        owner: &UserId,
        excluding: &ViolationId,
    ) -> Result<u32, RepositoryError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Property registry lookup used to resolve `relatedProperty` references.
pub trait PropertyDirectory: Send + Sync {
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertySummary>, RepositoryError>;
}

/// Slice of the property registry the workflow needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: PropertyId,
    pub owner: UserId,
    pub entity_type: String,
    pub standing: PropertyStanding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyStanding {
    Active,
    Suspended,
    Retired,
}

impl PropertyStanding {
    pub const fn is_active(self) -> bool {
        matches!(self, PropertyStanding::Active)
    }
}

/// Payment entry written once when a fine settles. Receipt and transaction
/// identifiers are opaque generated strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub violation: ViolationId,
    pub payer: UserId,
    pub amount: f64,
    pub receipt_number: String,
    pub transaction_id: String,
    pub recorded_at: DateTime<Utc>,
}

/// Ledger seam for settled fines.
pub trait PaymentLedger: Send + Sync {
    fn record(&self, payment: PaymentRecord) -> Result<(), LedgerError>;
    fn for_violation(&self, id: &ViolationId) -> Result<Vec<PaymentRecord>, LedgerError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("payment ledger unavailable: {0}")]
    Unavailable(String),
}

/// Event handed to the notification collaborator when a decision is reached.
/// Delivery to the owner is a downstream concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionNotice {
    pub violation: ViolationId,
    pub decision: DecisionKind,
    pub amount: f64,
    pub requires_human: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addressed_owner: Option<UserId>,
}

pub trait DecisionNotifier: Send + Sync {
    fn publish(&self, notice: DecisionNotice) -> Result<(), NotifyError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Mutex-backed store giving per-record atomic commits: the bundled
/// single-node persistence used by the server binary and the test suite. A
/// document-database adapter would implement the same trait with a
/// conditional update on `status`.
#[derive(Debug, Default)]
pub struct MemoryViolationStore {
    records: Mutex<HashMap<ViolationId, ViolationRecord>>,
}

impl ViolationRepository for MemoryViolationStore {
    fn insert(&self, record: ViolationRecord) -> Result<ViolationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("violation store mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ViolationId) -> Result<Option<ViolationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("violation store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn commit(
        &self,
        expected: ViolationStatus,
        record: ViolationRecord,
    ) -> Result<CommitOutcome, RepositoryError> {
        let mut guard = self.records.lock().expect("violation store mutex poisoned");
        let stored = guard.get_mut(&record.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Ok(CommitOutcome::Superseded(stored.status));
        }
        *stored = record;
        Ok(CommitOutcome::Applied)
    }

    fn by_status(&self, status: ViolationStatus) -> Result<Vec<ViolationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("violation store mutex poisoned");
        let mut records: Vec<ViolationRecord> = guard
            .values()
            .filter(|record| record.status == status)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.reported_at.cmp(&a.reported_at));
        Ok(records)
    }

    fn settled_count_for_owner(
        &self,
        owner: &UserId,
        excluding: &ViolationId,
    ) -> Result<u32, RepositoryError> {
        let guard = self.records.lock().expect("violation store mutex poisoned");
        let count = guard
            .values()
            .filter(|record| {
                record.id != *excluding
                    && record.status.settled()
                    && record.addressed_owner.as_ref() == Some(owner)
            })
            .count();
        Ok(count as u32)
    }
}

/// In-memory property registry for single-node deployments and tests.
#[derive(Debug, Default)]
pub struct MemoryPropertyDirectory {
    properties: Mutex<HashMap<PropertyId, PropertySummary>>,
}

impl MemoryPropertyDirectory {
    pub fn register(&self, summary: PropertySummary) {
        let mut guard = self
            .properties
            .lock()
            .expect("property directory mutex poisoned");
        guard.insert(summary.id.clone(), summary);
    }
}

impl PropertyDirectory for MemoryPropertyDirectory {
    fn fetch(&self, id: &PropertyId) -> Result<Option<PropertySummary>, RepositoryError> {
        let guard = self
            .properties
            .lock()
            .expect("property directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

/// In-memory payment ledger.
#[derive(Debug, Default)]
pub struct MemoryPaymentLedger {
    payments: Mutex<Vec<PaymentRecord>>,
}

impl PaymentLedger for MemoryPaymentLedger {
    fn record(&self, payment: PaymentRecord) -> Result<(), LedgerError> {
        self.payments
            .lock()
            .expect("payment ledger mutex poisoned")
            .push(payment);
        Ok(())
    }

    fn for_violation(&self, id: &ViolationId) -> Result<Vec<PaymentRecord>, LedgerError> {
        let guard = self.payments.lock().expect("payment ledger mutex poisoned");
        Ok(guard
            .iter()
            .filter(|payment| payment.violation == *id)
            .cloned()
            .collect())
    }
}

/// Notifier that records the event in the service log; useful until a real
/// transport is wired in.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

impl DecisionNotifier for LoggingNotifier {
    fn publish(&self, notice: DecisionNotice) -> Result<(), NotifyError> {
        tracing::info!(
            violation = %notice.violation.0,
            decision = notice.decision.label(),
            amount = notice.amount,
            requires_human = notice.requires_human,
            "decision notice published"
        );
        Ok(())
    }
}
