use super::RedFlag;
use crate::clinical::UrgencyLevel;
use crate::policy::ScreeningPolicy;
use crate::screening::RedFlagKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Sum of severity weights over all detected flags.
    pub score: u32,
    pub level: UrgencyLevel,
    /// Why the level sits above what the score alone gives, in policy order.
    pub escalation_reasons: Vec<String>,
}

/// Score the detected flags and assign an urgency tier.
///
/// The tier is the highest of the score-derived tier, every applicable combination escalation,
/// and `EMERGENCY` when a hard-trigger flag is present.
pub fn score_risk(policy: &ScreeningPolicy, flags: &[RedFlag]) -> RiskAssessment {
    let score = flags
        .iter()
        .map(|flag| policy.severity_weights.weight(flag.severity))
        .fold(0u32, u32::saturating_add);

    let by_score = policy.urgency_thresholds.level_for(score);
    let mut level = by_score;
    let mut escalation_reasons = Vec::new();

    let present: BTreeSet<RedFlagKind> = flags.iter().map(|flag| flag.kind).collect();

    for rule in &policy.escalations {
        if rule.all_of.iter().all(|kind| present.contains(kind)) && rule.minimum_level > by_score
        {
            escalation_reasons.push(rule.reason.clone());
            level = level.max(rule.minimum_level);
        }
    }

    for flag in flags {
        let hard_trigger = policy
            .red_flag(flag.kind)
            .is_some_and(|rule| rule.forces_emergency);
        if hard_trigger {
            escalation_reasons.push(format!("{} requires emergency referral", flag.flag));
            level = UrgencyLevel::Emergency;
        }
    }

    RiskAssessment {
        score,
        level,
        escalation_reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::detect_red_flags;
    use crate::screening::ScreeningInput;

    fn assess(kinds: &[RedFlagKind]) -> RiskAssessment {
        let policy = ScreeningPolicy::standard();
        let input = kinds
            .iter()
            .fold(ScreeningInput::default(), |input, kind| input.with(*kind));
        score_risk(&policy, &detect_red_flags(&policy, &input))
    }

    #[test]
    fn no_flags_score_zero_routine() {
        let risk = assess(&[]);
        assert_eq!(risk.score, 0);
        assert_eq!(risk.level, UrgencyLevel::Routine);
        assert!(risk.escalation_reasons.is_empty());
    }

    #[test]
    fn single_low_flag_is_moderate() {
        let risk = assess(&[RedFlagKind::DizzinessBalanceIssues]);
        assert_eq!(risk.score, 2);
        assert_eq!(risk.level, UrgencyLevel::Moderate);
    }

    #[test]
    fn two_medium_flags_reach_urgent() {
        let risk = assess(&[RedFlagKind::SevereHeadache, RedFlagKind::SteroidUse]);
        assert_eq!(risk.score, 10);
        assert_eq!(risk.level, UrgencyLevel::Urgent);
        assert!(risk.escalation_reasons.is_empty());
    }

    #[test]
    fn score_is_additive_without_a_cap() {
        let risk = assess(&RedFlagKind::ALL);
        // 2 high, 7 medium, 3 low
        assert_eq!(risk.score, 2 * 10 + 7 * 5 + 3 * 2);
        assert_eq!(risk.level, UrgencyLevel::Emergency);
    }

    #[test]
    fn neurological_symptoms_alone_force_emergency() {
        let risk = assess(&[RedFlagKind::NeurologicalSymptoms]);
        assert_eq!(risk.score, 10);
        assert_eq!(risk.level, UrgencyLevel::Emergency);
        assert_eq!(
            risk.escalation_reasons,
            vec!["Neurological Symptoms requires emergency referral".to_string()]
        );
    }

    #[test]
    fn weight_loss_with_cancer_escalates_to_urgent() {
        let risk = assess(&[RedFlagKind::UnexplainedWeightLoss, RedFlagKind::CancerHistory]);
        // 5 + 5 already reaches URGENT by score, so no escalation is recorded.
        assert_eq!(risk.level, UrgencyLevel::Urgent);

        let mut policy = ScreeningPolicy::standard();
        policy.urgency_thresholds.urgent = 15;
        policy.urgency_thresholds.emergency = 30;
        let input = ScreeningInput::default()
            .with(RedFlagKind::UnexplainedWeightLoss)
            .with(RedFlagKind::CancerHistory);
        let risk = score_risk(&policy, &detect_red_flags(&policy, &input));

        assert_eq!(risk.score, 10);
        assert_eq!(risk.level, UrgencyLevel::Urgent);
        assert_eq!(
            risk.escalation_reasons,
            vec!["Unexplained weight loss with a cancer history".to_string()]
        );
    }

    #[test]
    fn escalation_never_lowers_a_higher_score_tier() {
        let risk = assess(&[
            RedFlagKind::CardiovascularSymptoms,
            RedFlagKind::NightPain,
            RedFlagKind::CancerHistory,
            RedFlagKind::SteroidUse,
        ]);
        assert_eq!(risk.score, 20);
        assert_eq!(risk.level, UrgencyLevel::Emergency);
    }
}
