use crate::clinical::Severity;
use crate::policy::{RedFlagRule, ScreeningPolicy};
use crate::screening::{RedFlagKind, ScreeningInput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A detected red flag, as shown to staff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedFlag {
    pub kind: RedFlagKind,
    /// Human-readable label, e.g. "Severe Night Pain".
    pub flag: String,
    pub severity: Severity,
    pub rationale: String,
    pub suggested_action: String,
}

impl RedFlag {
    fn from_rule(rule: &RedFlagRule) -> Self {
        Self {
            kind: rule.flag,
            flag: rule.label.clone(),
            severity: rule.severity,
            rationale: rule.rationale.clone(),
            suggested_action: rule.suggested_action.clone(),
        }
    }
}

/// Emit one red flag per reported indicator, in the policy's clinical-priority order.
///
/// Indicators the policy has no catalogue entry for are ignored, and each kind is emitted at most
/// once even if the catalogue lists it twice.
pub fn detect_red_flags(policy: &ScreeningPolicy, input: &ScreeningInput) -> Vec<RedFlag> {
    let mut emitted = BTreeSet::new();

    policy
        .red_flags
        .iter()
        .filter(|rule| input.has(rule.flag) && emitted.insert(rule.flag))
        .map(RedFlag::from_rule)
        .collect()
}
