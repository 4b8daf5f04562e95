//! Clinical risk analysis engine.
//!
//! Converts a patient's intake screening into a [`ClinicalAnalysis`]: red flags, a risk score and
//! urgency tier, per-modality safety gating, follow-up questions for staff, a triage profile and a
//! first-session plan.
//!
//! The stages run in a fixed order and are pure functions of `(policy, input)`:
//!
//! 1. [`detect_red_flags`]
//! 2. [`score_risk`]
//! 3. [`gate_modalities`]
//! 4. [`generate_follow_ups`]
//! 5. [`profile_triage`] and [`plan_session`]
//! 6. [`compose_analysis`]
//!
//! There is no I/O, clock or shared mutable state here. The caller loads the screening and decides
//! what to do with the result (persist it, alert staff, return it over HTTP).

mod follow_up;
mod gating;
mod red_flags;
mod risk;
mod session;
mod summary;
mod triage;

pub use follow_up::generate_follow_ups;
pub use gating::{gate_modalities, GateDecision};
pub use red_flags::{detect_red_flags, RedFlag};
pub use risk::{score_risk, RiskAssessment};
pub use session::{plan_session, SessionPlan};
pub use summary::{compose_analysis, ClinicalAnalysis, RedFlagStatus};
pub use triage::{profile_triage, TriageProfile};

use crate::clinical::Complexity;
use crate::error::ScreeningResult;
use crate::policy::ScreeningPolicy;
use crate::screening::ScreeningInput;
use std::sync::OnceLock;

/// Runs the analysis stages against one validated policy.
#[derive(Clone, Debug)]
pub struct ScreeningEngine {
    policy: ScreeningPolicy,
}

impl ScreeningEngine {
    /// Creates an engine for `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ScreeningError::InvalidPolicy`] if the policy fails validation.
    pub fn new(policy: ScreeningPolicy) -> ScreeningResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Engine using the built-in policy table.
    pub fn standard() -> Self {
        Self {
            policy: ScreeningPolicy::standard(),
        }
    }

    pub fn policy(&self) -> &ScreeningPolicy {
        &self.policy
    }

    /// Analyse one screening.
    ///
    /// Consent is not checked here: an analysis is produced either way, and a missing consent adds
    /// the consent confirmation question to the follow-ups.
    pub fn analyze(&self, input: &ScreeningInput) -> ClinicalAnalysis {
        let policy = &self.policy;

        let flags = detect_red_flags(policy, input);
        let risk = score_risk(policy, &flags);
        let gating = gate_modalities(policy, &flags, risk.level);
        let follow_ups = generate_follow_ups(policy, &flags, input);
        let profile = profile_triage(policy, &flags, risk.level);
        let plan = plan_session(policy, &flags, Complexity::for_urgency(risk.level));

        tracing::debug!(
            policy = %policy.version,
            score = risk.score,
            level = %risk.level,
            flags = flags.len(),
            "screening analysed"
        );

        compose_analysis(policy, flags, risk, gating, follow_ups, profile, plan)
    }
}

impl Default for ScreeningEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// Analyse a screening with the built-in policy.
pub fn analyze_medical_screening(input: &ScreeningInput) -> ClinicalAnalysis {
    static STANDARD: OnceLock<ScreeningEngine> = OnceLock::new();
    STANDARD.get_or_init(ScreeningEngine::standard).analyze(input)
}

/// Appends `item` unless an equal entry is already present, keeping first-occurrence order.
pub(crate) fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinical::{GateStatus, Modality, Severity, UrgencyLevel};
    use crate::screening::RedFlagKind;
    use proptest::prelude::*;

    fn screening(flags: &[RedFlagKind]) -> ScreeningInput {
        flags
            .iter()
            .fold(ScreeningInput::default(), |input, kind| input.with(*kind))
    }

    #[test]
    fn no_flags_baseline_is_routine() {
        let analysis = analyze_medical_screening(&ScreeningInput {
            consent_given: true,
            ..Default::default()
        });

        assert_eq!(analysis.risk_score, 0);
        assert_eq!(analysis.urgency_level, UrgencyLevel::Routine);
        assert!(analysis.red_flags.is_empty());
        assert_eq!(analysis.red_flag_status, RedFlagStatus::NoneDetected);
        assert!(analysis
            .modality_gating
            .values()
            .all(|d| d.status == GateStatus::Safe));
        assert_eq!(
            analysis.triage_classification,
            "Standard physiotherapy care pathway appropriate"
        );
        assert_eq!(analysis.session_plan.recommended_minutes, 30);
    }

    #[test]
    fn cancer_history_scenario() {
        let analysis = analyze_medical_screening(&screening(&[RedFlagKind::CancerHistory]));

        assert_eq!(analysis.risk_score, 5);
        assert_eq!(analysis.urgency_level, UrgencyLevel::Moderate);
        assert_eq!(analysis.red_flags.len(), 1);
        assert_eq!(analysis.red_flags[0].kind, RedFlagKind::CancerHistory);
        assert_eq!(analysis.red_flags[0].severity, Severity::Medium);

        for modality in [Modality::Mens, Modality::EmsAussie, Modality::EmsRussian] {
            let decision = &analysis.modality_gating[&modality];
            assert!(decision.status >= GateStatus::Precaution);
        }
        assert_eq!(
            analysis.modality_gating[&Modality::Mens].status,
            GateStatus::Contraindicated
        );
        assert!(analysis
            .follow_up_questions
            .iter()
            .any(|q| q.contains("oncology")));
    }

    #[test]
    fn bladder_bowel_dysfunction_forces_emergency_and_blocks_every_modality() {
        let analysis =
            analyze_medical_screening(&screening(&[RedFlagKind::BladderBowelDysfunction]));

        assert_eq!(analysis.urgency_level, UrgencyLevel::Emergency);
        assert_eq!(analysis.red_flag_status, RedFlagStatus::UrgentRedFlags);
        assert_eq!(analysis.modality_gating.len(), Modality::ALL.len());
        for decision in analysis.modality_gating.values() {
            assert_eq!(decision.status, GateStatus::Contraindicated);
            assert_eq!(
                decision.reason.as_deref(),
                Some("Immediate medical referral required before any treatment.")
            );
        }
        assert_eq!(
            analysis.triage_classification,
            "Immediate medical referral advised - do not commence treatment"
        );
    }

    #[test]
    fn analysis_carries_policy_version() {
        let mut policy = ScreeningPolicy::standard();
        policy.version = "clinic-2026-03".into();
        let engine = ScreeningEngine::new(policy).expect("valid policy");

        let analysis = engine.analyze(&ScreeningInput::default());
        assert_eq!(analysis.policy_version, "clinic-2026-03");
    }

    #[test]
    fn engine_rejects_invalid_policy() {
        let mut policy = ScreeningPolicy::standard();
        policy.red_flags.clear();
        assert!(ScreeningEngine::new(policy).is_err());
    }

    #[test]
    fn missing_consent_still_produces_analysis() {
        let analysis = analyze_medical_screening(&screening(&[RedFlagKind::TraumaHistory]));
        assert_eq!(analysis.red_flags.len(), 1);
        assert!(analysis
            .follow_up_questions
            .iter()
            .any(|q| q.contains("consent")));
    }

    #[test]
    fn serialised_analysis_uses_camel_case() {
        let analysis = analyze_medical_screening(&screening(&[RedFlagKind::NightPain]));
        let json = serde_json::to_value(&analysis).unwrap();

        assert_eq!(json["riskScore"], 5);
        assert_eq!(json["urgencyLevel"], "MODERATE");
        assert_eq!(json["redFlags"][0]["flag"], "Severe Night Pain");
        assert_eq!(json["redFlags"][0]["severity"], "MEDIUM");
        assert_eq!(json["modalityGating"]["Manual_Therapy"]["status"], "SAFE");
        assert!(json["followUpQuestions"].is_array());
    }

    fn any_screening() -> impl Strategy<Value = ScreeningInput> {
        (
            proptest::collection::vec(any::<bool>(), RedFlagKind::ALL.len()),
            any::<bool>(),
            "[a-z ]{0,12}",
            "[a-z ]{0,12}",
        )
            .prop_map(|(answers, consent, meds, surgery)| {
                let mut input = ScreeningInput {
                    consent_given: consent,
                    current_medications: meds,
                    surgical_history: surgery,
                    ..Default::default()
                };
                for (kind, answer) in RedFlagKind::ALL.into_iter().zip(answers) {
                    input.set(kind, answer);
                }
                input
            })
    }

    proptest! {
        /// Same input, same bytes.
        #[test]
        fn analysis_is_deterministic(input in any_screening()) {
            let engine = ScreeningEngine::standard();
            let first = serde_json::to_string(&engine.analyze(&input)).unwrap();
            let second = serde_json::to_string(&engine.analyze(&input)).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Reporting one more red flag never lowers the score or the urgency.
        #[test]
        fn adding_a_flag_never_lowers_risk(
            input in any_screening(),
            extra in proptest::sample::select(RedFlagKind::ALL.to_vec())
        ) {
            let before = analyze_medical_screening(&input);
            let after = analyze_medical_screening(&input.clone().with(extra));
            prop_assert!(after.risk_score >= before.risk_score);
            prop_assert!(after.urgency_level >= before.urgency_level);
        }

        /// Gating never relaxes as flags are added.
        #[test]
        fn adding_a_flag_never_relaxes_gating(
            input in any_screening(),
            extra in proptest::sample::select(RedFlagKind::ALL.to_vec())
        ) {
            let before = analyze_medical_screening(&input);
            let after = analyze_medical_screening(&input.clone().with(extra));
            for modality in Modality::ALL {
                let before_status = before.modality_gating[&modality].status;
                prop_assert!(after.modality_gating[&modality].status >= before_status);
            }
        }

        #[test]
        fn bladder_bowel_dysfunction_always_emergency(input in any_screening()) {
            let analysis = analyze_medical_screening(
                &input.with(RedFlagKind::BladderBowelDysfunction),
            );
            prop_assert_eq!(analysis.urgency_level, UrgencyLevel::Emergency);
            prop_assert!(analysis
                .modality_gating
                .values()
                .all(|d| d.status == GateStatus::Contraindicated));
        }

        #[test]
        fn follow_up_questions_are_unique(input in any_screening()) {
            let analysis = analyze_medical_screening(&input);
            let mut seen = std::collections::BTreeSet::new();
            for question in &analysis.follow_up_questions {
                prop_assert!(seen.insert(question.clone()), "duplicate question: {}", question);
            }
        }
    }
}
