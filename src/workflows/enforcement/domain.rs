use serde::{Deserialize, Serialize};

/// Identifier wrapper for reported violations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViolationId(pub String);

/// Identifier for a registered portal user (citizen, permit holder, officer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier for a registered property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// WGS84 coordinates captured with a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn in_bounds(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Evidence classification derived from the upload's content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Image,
    Video,
}

/// Evidence reference stored on the violation. `url` is the storage path
/// handed over by the upload layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Evidence reference as received from the upload layer, before the content
/// type has been classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    pub url: String,
    pub content_type: String,
}

/// Inbound citizen report before intake validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationReport {
    pub reported_by: UserId,
    pub violation_type: String,
    #[serde(default)]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub related_property: Option<PropertyId>,
    /// Optional hint naming the reported premises kind (e.g. Shop, Industry)
    /// used only when the type code has no exact catalogue match.
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaUpload>,
}

/// Lifecycle status persisted on the violation document. The wire names are
/// the contract other layers (and historical documents) depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationStatus {
    Reported,
    /// Reserved: written by an earlier automation pass; no current transition
    /// produces it, but stored documents may still carry it.
    AutoDecided,
    AwaitingOwner,
    Paid,
    Objected,
    /// Reserved, same situation as `AutoDecided`.
    UnderReview,
    Closed,
}

impl ViolationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ViolationStatus::Reported => "REPORTED",
            ViolationStatus::AutoDecided => "AUTO_DECIDED",
            ViolationStatus::AwaitingOwner => "AWAITING_OWNER",
            ViolationStatus::Paid => "PAID",
            ViolationStatus::Objected => "OBJECTED",
            ViolationStatus::UnderReview => "UNDER_REVIEW",
            ViolationStatus::Closed => "CLOSED",
        }
    }

    /// Terminal statuses counted toward an owner's escalation history.
    pub const fn settled(self) -> bool {
        matches!(self, ViolationStatus::Paid | ViolationStatus::Closed)
    }
}

/// Outcome kind recorded in the decision snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionKind {
    Fine,
    Notice,
    Review,
    Confirmed,
    Overridden,
}

impl DecisionKind {
    pub const fn label(self) -> &'static str {
        match self {
            DecisionKind::Fine => "FINE",
            DecisionKind::Notice => "NOTICE",
            DecisionKind::Review => "REVIEW",
            DecisionKind::Confirmed => "CONFIRMED",
            DecisionKind::Overridden => "OVERRIDDEN",
        }
    }
}

/// Severity tier carried by catalogue rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Denormalized copy of the matched rule taken at decision time, so later
/// catalogue edits never rewrite the audit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub title: String,
    pub act: String,
    pub section: String,
    pub authority: String,
    pub severity: Severity,
}

/// The automated decision stamped at creation. Only replaced wholesale —
/// owner objection flags it for review, officer confirm/override supersede
/// it — never field-patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSnapshot {
    pub decision: DecisionKind,
    pub amount: f64,
    pub rule_applied: Option<String>,
    pub rule_snapshot: Option<RuleSnapshot>,
    pub ai_confidence: f64,
    pub requires_human: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_reason: Option<String>,
}

impl DecisionSnapshot {
    /// Same decision with the human-review flag raised; rule provenance is
    /// carried over untouched.
    pub(crate) fn flagged_for_human(&self) -> Self {
        Self {
            requires_human: true,
            ..self.clone()
        }
    }

    /// Replacement snapshot for an officer upholding the decision. The fine
    /// amount stays whatever it was before the objection.
    pub(crate) fn confirmed(&self) -> Self {
        Self {
            decision: DecisionKind::Confirmed,
            requires_human: true,
            ..self.clone()
        }
    }

    /// Replacement snapshot for an officer striking the decision down.
    pub(crate) fn overridden(&self, reason: String) -> Self {
        Self {
            decision: DecisionKind::Overridden,
            amount: 0.0,
            requires_human: true,
            override_reason: Some(reason),
            ..self.clone()
        }
    }

    /// Same decision at a recalculated amount (escalated fine settlement).
    pub(crate) fn with_amount(&self, amount: f64) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}
