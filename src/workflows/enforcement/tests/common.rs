use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::workflows::enforcement::decision::DecisionConfig;
use crate::workflows::enforcement::domain::{
    DecisionKind, DecisionSnapshot, GeoPoint, MediaUpload, PropertyId, UserId, ViolationId,
    ViolationReport, ViolationStatus,
};
use crate::workflows::enforcement::repository::{
    CommitOutcome, DecisionNotice, DecisionNotifier, LedgerError, MemoryPaymentLedger,
    MemoryPropertyDirectory, MemoryViolationStore, NotifyError, PaymentLedger, PaymentRecord,
    PropertyStanding, PropertySummary, RepositoryError, ViolationRecord, ViolationRepository,
};
use crate::workflows::enforcement::rules::RuleCatalog;
use crate::workflows::enforcement::service::EnforcementService;

pub(super) type TestService =
    EnforcementService<MemoryViolationStore, MemoryPaymentLedger, MemoryNotices>;

pub(super) fn decision_config() -> DecisionConfig {
    DecisionConfig::default()
}

pub(super) fn report(code: &str) -> ViolationReport {
    ViolationReport {
        reported_by: UserId("citizen-7".to_string()),
        violation_type: code.to_string(),
        description: "Mixed waste bags dumped at the kerbside".to_string(),
        latitude: 17.4326,
        longitude: 78.4071,
        related_property: None,
        entity_type: None,
        media: vec![MediaUpload {
            url: "uploads/evidence-1.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
        }],
    }
}

pub(super) fn property_report(code: &str, property: &str) -> ViolationReport {
    ViolationReport {
        related_property: Some(PropertyId(property.to_string())),
        ..report(code)
    }
}

pub(super) fn active_property(id: &str, owner: &str) -> PropertySummary {
    PropertySummary {
        id: PropertyId(id.to_string()),
        owner: UserId(owner.to_string()),
        entity_type: "Shop".to_string(),
        standing: PropertyStanding::Active,
    }
}

/// Directly inserted settled history entry for escalation scenarios.
pub(super) fn settled_record(id: &str, owner: &str) -> ViolationRecord {
    let now = Utc::now();
    ViolationRecord {
        id: ViolationId(id.to_string()),
        reported_by: UserId("citizen-1".to_string()),
        related_property: None,
        addressed_owner: Some(UserId(owner.to_string())),
        violation_type: "WASTE-002".to_string(),
        description: "settled earlier".to_string(),
        location: GeoPoint {
            latitude: 17.43,
            longitude: 78.4,
        },
        media: Vec::new(),
        decision: DecisionSnapshot {
            decision: DecisionKind::Fine,
            amount: 500.0,
            rule_applied: Some("WASTE-002".to_string()),
            rule_snapshot: None,
            ai_confidence: 0.95,
            requires_human: false,
            override_reason: None,
        },
        status: ViolationStatus::Paid,
        objection_reason: None,
        reported_at: now,
        updated_at: now,
    }
}

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryViolationStore>,
    Arc<MemoryPaymentLedger>,
    Arc<MemoryNotices>,
    Arc<MemoryPropertyDirectory>,
) {
    let store = Arc::new(MemoryViolationStore::default());
    let ledger = Arc::new(MemoryPaymentLedger::default());
    let notices = Arc::new(MemoryNotices::default());
    let properties = Arc::new(MemoryPropertyDirectory::default());

    let service = EnforcementService::new(
        Arc::new(RuleCatalog::standard()),
        properties.clone(),
        store.clone(),
        ledger.clone(),
        notices.clone(),
        decision_config(),
    );

    (service, store, ledger, notices, properties)
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<DecisionNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<DecisionNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl DecisionNotifier for MemoryNotices {
    fn publish(&self, notice: DecisionNotice) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl ViolationRepository for UnavailableStore {
    fn insert(&self, _record: ViolationRecord) -> Result<ViolationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ViolationId) -> Result<Option<ViolationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit(
        &self,
        _expected: ViolationStatus,
        _record: ViolationRecord,
    ) -> Result<CommitOutcome, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn by_status(&self, _status: ViolationStatus) -> Result<Vec<ViolationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn settled_count_for_owner(
        &self,
        _owner: &UserId,
        _excluding: &ViolationId,
    ) -> Result<u32, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableLedger;

impl PaymentLedger for UnavailableLedger {
    fn record(&self, _payment: PaymentRecord) -> Result<(), LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }

    fn for_violation(&self, _id: &ViolationId) -> Result<Vec<PaymentRecord>, LedgerError> {
        Err(LedgerError::Unavailable("ledger offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
