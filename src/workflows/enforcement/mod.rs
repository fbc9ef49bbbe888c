//! Violation intake, automated decisioning, and lifecycle adjudication.
//!
//! A citizen report is validated, matched against the municipal rule
//! catalogue, stamped with an immutable decision snapshot, and persisted
//! awaiting the permit holder's response. Owners accept (fines settle at the
//! repeat-offender multiple) or object; officers confirm or override
//! objections. Every transition is guarded against the record's current
//! status and committed with a compare-and-swap write, so a stale or
//! repeated action is rejected instead of silently applied.

pub mod decision;
pub mod domain;
pub mod escalation;
pub(crate) mod intake;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use decision::{DecisionConfig, DecisionEngine};
pub use domain::{
    DecisionKind, DecisionSnapshot, GeoPoint, MediaAttachment, MediaKind, MediaUpload, PropertyId,
    RuleSnapshot, Severity, UserId, ViolationId, ViolationReport, ViolationStatus,
};
pub use escalation::{escalate, multiplier};
pub use intake::{AdmittedReport, IntakeGuard, ValidationError};
pub use repository::{
    CommitOutcome, DecisionNotice, DecisionNotifier, LedgerError, LoggingNotifier,
    MemoryPaymentLedger, MemoryPropertyDirectory, MemoryViolationStore, NotifyError, PaymentLedger,
    PaymentRecord, PropertyDirectory, PropertyStanding, PropertySummary, RepositoryError,
    ViolationRecord, ViolationRepository, ViolationStatusView,
};
pub use router::enforcement_router;
pub use rules::{CatalogImportError, RuleCatalog, RuleLookupError, RuleRepository, ViolationRule};
pub use service::{
    EnforcementError, EnforcementService, Forbidden, InfrastructureError, NotFoundError,
};
pub use transitions::{InvalidTransition, LifecycleAction};
