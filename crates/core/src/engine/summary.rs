use super::{GateDecision, RedFlag, RiskAssessment, SessionPlan, TriageProfile};
use crate::clinical::{Modality, UrgencyLevel};
use crate::policy::ScreeningPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline red-flag status shown on the staff dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedFlagStatus {
    NoneDetected,
    PossibleRedFlags,
    UrgentRedFlags,
}

/// Complete output of one screening analysis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalAnalysis {
    pub policy_version: String,
    pub risk_score: u32,
    pub urgency_level: UrgencyLevel,
    #[serde(default)]
    pub escalation_reasons: Vec<String>,
    pub red_flags: Vec<RedFlag>,
    pub red_flag_status: RedFlagStatus,
    pub modality_gating: BTreeMap<Modality, GateDecision>,
    pub follow_up_questions: Vec<String>,
    pub triage_classification: String,
    pub triage_profile: TriageProfile,
    pub session_plan: SessionPlan,
    pub clinical_summary: String,
}

impl ClinicalAnalysis {
    /// True when staff should be alerted before the first appointment.
    pub fn needs_alert(&self) -> bool {
        self.red_flag_status == RedFlagStatus::UrgentRedFlags
    }
}

/// Assemble the stage outputs into the final analysis.
pub fn compose_analysis(
    policy: &ScreeningPolicy,
    red_flags: Vec<RedFlag>,
    risk: RiskAssessment,
    modality_gating: BTreeMap<Modality, GateDecision>,
    follow_up_questions: Vec<String>,
    triage_profile: TriageProfile,
    session_plan: SessionPlan,
) -> ClinicalAnalysis {
    let red_flag_status = if red_flags.is_empty() {
        RedFlagStatus::NoneDetected
    } else if risk.level >= UrgencyLevel::Urgent {
        RedFlagStatus::UrgentRedFlags
    } else {
        RedFlagStatus::PossibleRedFlags
    };

    let triage_classification = policy.triage_label(risk.level).to_string();

    let findings: Vec<&str> = red_flags
        .iter()
        .map(|flag| {
            policy
                .red_flag(flag.kind)
                .and_then(|rule| rule.key_finding.as_deref())
                .unwrap_or(flag.flag.as_str())
        })
        .collect();
    let findings = if findings.is_empty() {
        "none reported".to_string()
    } else {
        findings.join(", ")
    };

    let clinical_summary = format!(
        "Risk Score: {} ({}). Clinical Pattern: {}. Key Findings: {}. {}.",
        risk.score,
        risk.level,
        triage_profile.likely_domain.description(),
        findings,
        triage_classification,
    );

    ClinicalAnalysis {
        policy_version: policy.version.clone(),
        risk_score: risk.score,
        urgency_level: risk.level,
        escalation_reasons: risk.escalation_reasons,
        red_flags,
        red_flag_status,
        modality_gating,
        follow_up_questions,
        triage_classification,
        triage_profile,
        session_plan,
        clinical_summary,
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::analyze_medical_screening;
    use crate::engine::RedFlagStatus;
    use crate::screening::{RedFlagKind, ScreeningInput};

    #[test]
    fn summary_for_clear_screening() {
        let analysis = analyze_medical_screening(&ScreeningInput::default());
        assert_eq!(
            analysis.clinical_summary,
            "Risk Score: 0 (ROUTINE). Clinical Pattern: MSK mechanical. Key Findings: none reported. Standard physiotherapy care pathway appropriate."
        );
        assert!(!analysis.needs_alert());
    }

    #[test]
    fn summary_lists_key_findings_in_priority_order() {
        let input = ScreeningInput::default()
            .with(RedFlagKind::NightPain)
            .with(RedFlagKind::CancerHistory);
        let analysis = analyze_medical_screening(&input);

        assert_eq!(
            analysis.clinical_summary,
            "Risk Score: 10 (URGENT). Clinical Pattern: systemic. Key Findings: cancer history, severe night pain. Medical review required before commencing treatment."
        );
        assert_eq!(analysis.red_flag_status, RedFlagStatus::UrgentRedFlags);
        assert!(analysis.needs_alert());
    }

    #[test]
    fn findings_fall_back_to_flag_label() {
        let analysis =
            analyze_medical_screening(&ScreeningInput::default().with(RedFlagKind::SteroidUse));
        assert!(analysis.clinical_summary.contains("Key Findings: Steroid Use."));
        assert_eq!(analysis.red_flag_status, RedFlagStatus::PossibleRedFlags);
    }
}
