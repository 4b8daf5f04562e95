use super::{push_unique, RedFlag};
use crate::clinical::{GateStatus, Modality, UrgencyLevel};
use crate::policy::{ModalityRule, ScreeningPolicy};
use crate::screening::RedFlagKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Safety verdict for one modality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub status: GateStatus,
    /// First reason recorded at the winning status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
    #[serde(default)]
    pub required_checks: Vec<String>,
}

impl GateDecision {
    fn safe() -> Self {
        Self {
            status: GateStatus::Safe,
            reason: None,
            considerations: Vec::new(),
            required_checks: Vec::new(),
        }
    }

    fn apply(&mut self, rule: &ModalityRule) {
        if rule.status > self.status {
            self.status = rule.status;
            self.reason = Some(rule.reason.clone());
        }
        push_unique(&mut self.considerations, &rule.reason);
        if let Some(check) = &rule.required_check {
            push_unique(&mut self.required_checks, check);
        }
    }
}

/// Decide the status of every known modality.
///
/// Each modality starts `SAFE`. Every contraindication rule whose flag was detected applies to all
/// modalities of its class, and the most restrictive status wins. At `EMERGENCY` urgency every
/// modality is `CONTRAINDICATED` with the policy's emergency reason.
pub fn gate_modalities(
    policy: &ScreeningPolicy,
    flags: &[RedFlag],
    level: UrgencyLevel,
) -> BTreeMap<Modality, GateDecision> {
    let present: BTreeSet<RedFlagKind> = flags.iter().map(|flag| flag.kind).collect();

    let mut gating: BTreeMap<Modality, GateDecision> = Modality::ALL
        .into_iter()
        .map(|modality| (modality, GateDecision::safe()))
        .collect();

    for rule in policy
        .modality_rules
        .iter()
        .filter(|rule| present.contains(&rule.flag))
    {
        gating
            .iter_mut()
            .filter(|(modality, _)| modality.class() == rule.class)
            .for_each(|(_, decision)| decision.apply(rule));
    }

    if level == UrgencyLevel::Emergency {
        for decision in gating.values_mut() {
            decision.status = GateStatus::Contraindicated;
            decision.reason = Some(policy.emergency_gate_reason.clone());
        }
    }

    gating
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{detect_red_flags, score_risk};
    use crate::screening::ScreeningInput;

    fn gate(kinds: &[RedFlagKind]) -> BTreeMap<Modality, GateDecision> {
        let policy = ScreeningPolicy::standard();
        let input = kinds
            .iter()
            .fold(ScreeningInput::default(), |input, kind| input.with(*kind));
        let flags = detect_red_flags(&policy, &input);
        let risk = score_risk(&policy, &flags);
        gate_modalities(&policy, &flags, risk.level)
    }

    #[test]
    fn every_modality_is_present_and_safe_without_flags() {
        let gating = gate(&[]);
        assert_eq!(gating.len(), Modality::ALL.len());
        for decision in gating.values() {
            assert_eq!(decision, &GateDecision::safe());
        }
    }

    #[test]
    fn contraindication_beats_precaution() {
        let gating = gate(&[RedFlagKind::OsteoporosisRisk, RedFlagKind::TraumaHistory]);
        let decision = &gating[&Modality::SpinalManipulation];

        assert_eq!(decision.status, GateStatus::Contraindicated);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Recent trauma: no manipulation before fracture exclusion")
        );
        assert_eq!(decision.considerations.len(), 2);
        assert_eq!(
            decision.required_checks,
            vec![
                "Bone density consideration".to_string(),
                "Imaging review if available".to_string(),
            ]
        );
    }

    #[test]
    fn reason_is_first_at_winning_status() {
        let gating = gate(&[RedFlagKind::CancerHistory, RedFlagKind::RecentInfection]);
        let decision = &gating[&Modality::EmsRussian];

        assert_eq!(decision.status, GateStatus::Contraindicated);
        // Table order puts the infection rule first.
        assert_eq!(
            decision.reason.as_deref(),
            Some("Active infection in treatment area")
        );
    }

    #[test]
    fn required_checks_are_deduplicated() {
        let gating = gate(&[RedFlagKind::OsteoporosisRisk, RedFlagKind::SteroidUse]);
        let decision = &gating[&Modality::ManualTherapy];

        assert_eq!(decision.status, GateStatus::Precaution);
        assert_eq!(
            decision.required_checks,
            vec!["Bone density consideration".to_string()]
        );
    }

    #[test]
    fn rules_apply_only_to_their_class() {
        let gating = gate(&[RedFlagKind::CancerHistory]);
        assert_eq!(gating[&Modality::Ultrasound3Mhz].status, GateStatus::Contraindicated);
        assert_eq!(gating[&Modality::LaserTherapy].status, GateStatus::Contraindicated);
        assert_eq!(gating[&Modality::ManualTherapy].status, GateStatus::Safe);
        assert_eq!(gating[&Modality::PosturalExercise].status, GateStatus::Safe);
    }

    #[test]
    fn emergency_overrides_every_modality() {
        let gating = gate(&[RedFlagKind::NeurologicalSymptoms]);
        for decision in gating.values() {
            assert_eq!(decision.status, GateStatus::Contraindicated);
            assert_eq!(
                decision.reason.as_deref(),
                Some("Immediate medical referral required before any treatment.")
            );
        }
        // Flag-specific notes are kept alongside the override.
        assert!(!gating[&Modality::Mens].considerations.is_empty());
    }
}
