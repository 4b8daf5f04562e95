use super::RedFlag;
use crate::clinical::{Acuity, ClinicalDomain, Complexity, UrgencyLevel};
use crate::policy::ScreeningPolicy;
use crate::screening::RedFlagKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageProfile {
    pub likely_domain: ClinicalDomain,
    pub acuity: Acuity,
    pub complexity: Complexity,
    pub rationale: Vec<String>,
}

/// Classify the likely clinical domain, acuity and complexity of the presentation.
///
/// The first domain rule whose `any_of` matches and whose `none_of` does not decides the domain;
/// with no match the presentation is treated as MSK mechanical.
pub fn profile_triage(
    policy: &ScreeningPolicy,
    flags: &[RedFlag],
    level: UrgencyLevel,
) -> TriageProfile {
    let present: BTreeSet<RedFlagKind> = flags.iter().map(|flag| flag.kind).collect();
    let mut rationale = Vec::new();

    let matched = policy.domain_rules.iter().find(|rule| {
        rule.any_of.iter().any(|kind| present.contains(kind))
            && !rule.none_of.iter().any(|kind| present.contains(kind))
    });
    let likely_domain = match matched {
        Some(rule) => {
            rationale.push(rule.rationale.clone());
            rule.domain
        }
        None => ClinicalDomain::MskMechanical,
    };

    let acute: Vec<&str> = flags
        .iter()
        .filter(|flag| policy.acute_flags.contains(&flag.kind))
        .map(|flag| flag.flag.as_str())
        .collect();
    let acuity = if acute.is_empty() {
        Acuity::Unknown
    } else {
        rationale.push(format!("Acute presentation: {}", acute.join(", ")));
        Acuity::Acute
    };

    let complexity = Complexity::for_urgency(level);
    if complexity == Complexity::High {
        rationale.push(format!(
            "{} red flag(s) at {level} urgency: high complexity case",
            flags.len()
        ));
    }

    TriageProfile {
        likely_domain,
        acuity,
        complexity,
        rationale,
    }
}
