mod config;
mod matcher;

pub use config::DecisionConfig;

use super::domain::{DecisionKind, DecisionSnapshot, RuleSnapshot, Severity};
use super::rules::{RuleLookupError, RuleRepository, ViolationRule};

/// Stateless engine stamping the decision snapshot at intake.
///
/// Pure over catalogue state at call time; the caller persists the snapshot.
/// An unmatched type code is not an error — it is the documented manual
/// review fallback.
pub struct DecisionEngine {
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn decide(
        &self,
        rules: &dyn RuleRepository,
        type_code: &str,
        entity_hint: Option<&str>,
        free_text: Option<&str>,
    ) -> Result<DecisionSnapshot, RuleLookupError> {
        match matcher::match_rule(rules, type_code, entity_hint, free_text)? {
            Some(rule) => Ok(self.from_rule(&rule)),
            None => Ok(Self::review_fallback()),
        }
    }

    fn from_rule(&self, rule: &ViolationRule) -> DecisionSnapshot {
        let rule_snapshot = RuleSnapshot {
            title: rule.title.clone(),
            act: rule.act.clone(),
            section: rule.section.clone(),
            authority: rule.authority.clone(),
            severity: rule.severity,
        };

        let (decision, amount, requires_human) =
            if rule.severity == Severity::High || !rule.compoundable {
                (DecisionKind::Review, 0.0, true)
            } else if rule.severity == Severity::Medium {
                (DecisionKind::Notice, 0.0, false)
            } else {
                (
                    DecisionKind::Fine,
                    self.config.base_fine(rule.severity),
                    false,
                )
            };

        DecisionSnapshot {
            decision,
            amount,
            rule_applied: Some(rule.code.clone()),
            rule_snapshot: Some(rule_snapshot),
            ai_confidence: self.config.matched_confidence,
            requires_human,
            override_reason: None,
        }
    }

    /// Snapshot stamped when no catalogue rule applies.
    fn review_fallback() -> DecisionSnapshot {
        DecisionSnapshot {
            decision: DecisionKind::Review,
            amount: 0.0,
            rule_applied: None,
            rule_snapshot: None,
            ai_confidence: 0.0,
            requires_human: true,
            override_reason: None,
        }
    }
}
