use serde::{Deserialize, Serialize};

use super::super::domain::Severity;

/// Fine tiers and the stubbed model confidence stamped on matched decisions.
///
/// Only Low/compoundable rules currently produce a fine, but the full tier
/// table is kept so the Medium and High amounts exist should those mappings
/// ever become fine-bearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionConfig {
    pub low_severity_fine: f64,
    pub medium_severity_fine: f64,
    pub high_severity_fine: f64,
    /// Deterministic placeholder; no model runs behind this value.
    pub matched_confidence: f64,
}

impl DecisionConfig {
    pub(crate) fn base_fine(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Low => self.low_severity_fine,
            Severity::Medium => self.medium_severity_fine,
            Severity::High => self.high_severity_fine,
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            low_severity_fine: 500.0,
            medium_severity_fine: 1000.0,
            high_severity_fine: 5000.0,
            matched_confidence: 0.95,
        }
    }
}
