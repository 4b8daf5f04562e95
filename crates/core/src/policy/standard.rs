//! The built-in screening policy table.
//!
//! Severity weights and urgency thresholds follow the clinic's documented scoring. The red-flag
//! catalogue is listed in clinical-priority order; the engine emits flags in this order.

use super::{
    DomainRule, EscalationRule, FollowUpRule, ModalityRule, RedFlagRule, ScreeningPolicy,
    SessionTemplate, SeverityWeights, UrgencyThresholds,
};
use crate::clinical::{
    ClinicalDomain, Complexity, GateStatus, ModalityClass, Severity, UrgencyLevel,
};
use crate::constants::STANDARD_POLICY_VERSION;
use crate::screening::{ContextField, RedFlagKind};
use std::collections::BTreeMap;

const GP_REVIEW_QUESTION: &str =
    "Have you discussed these symptoms with your GP, and were any investigations arranged?";

impl ScreeningPolicy {
    /// The built-in policy table.
    pub fn standard() -> Self {
        use ContextField::*;
        use GateStatus::{Contraindicated, Precaution};
        use ModalityClass::*;
        use RedFlagKind::*;

        let red_flags = vec![
            flag(
                BladderBowelDysfunction,
                Severity::High,
                "Bladder/Bowel Dysfunction",
                "Patient reported changes in bladder or bowel function",
                "URGENT: possible cauda equina syndrome, immediate medical assessment required",
            )
            .hard_trigger()
            .ask(
                "When did the bladder or bowel changes start, and do you have any numbness in the saddle area?",
                &[],
            )
            .because("Cauda equina syndrome needs same-day medical assessment", &[])
            .finding("bladder/bowel changes")
            .assess("Cauda equina screen (saddle sensation, bladder and bowel function)"),
            flag(
                NeurologicalSymptoms,
                Severity::High,
                "Neurological Symptoms",
                "Patient reported numbness, tingling, or weakness",
                "Neurological examination required before treatment",
            )
            .hard_trigger()
            .ask(
                "Can you describe the exact location and distribution of the numbness or tingling?",
                &[],
            )
            .because(
                "Determines nerve root or peripheral nerve involvement",
                &[Electrotherapy, Ultrasound],
            )
            .finding("neurological symptoms")
            .assess("Neurological examination (reflexes, sensation, strength)"),
            flag(
                UnexplainedWeightLoss,
                Severity::Medium,
                "Unexplained Weight Loss",
                "Patient reported unexplained weight loss",
                "Urgent GP referral: possible systemic disease",
            )
            .ask(GP_REVIEW_QUESTION, &[GpDetails])
            .because("Prior medical work-up changes the referral pathway", &[])
            .finding("unexplained weight loss"),
            flag(
                CancerHistory,
                Severity::Medium,
                "Cancer History",
                "Patient has a current or past history of cancer",
                "Oncology clearance required before aggressive treatment",
            )
            .ask(
                "When was your last oncology review? Are you currently cancer-free?",
                &[],
            )
            .because(
                "Active malignancy contraindicates many modalities",
                &[Electrotherapy, Ultrasound, Laser],
            )
            .finding("cancer history"),
            flag(
                NightPain,
                Severity::Medium,
                "Severe Night Pain",
                "Patient reported severe night pain disrupting sleep",
                "Medical review required: possible inflammatory or neoplastic process",
            )
            .ask(GP_REVIEW_QUESTION, &[GpDetails])
            .because("Prior medical work-up changes the referral pathway", &[])
            .finding("severe night pain"),
            flag(
                CardiovascularSymptoms,
                Severity::Medium,
                "Cardiovascular Symptoms",
                "Patient reported chest pain, shortness of breath, or irregular heartbeat",
                "Cardiac assessment required before exercise therapy",
            )
            .ask(
                "Have you had recent cardiac investigations? What were the results?",
                &[],
            )
            .because(
                "Cardiac clearance needed for exercise prescription",
                &[ExerciseTherapy, Electrotherapy, SpinalManipulation],
            )
            .assess("Resting blood pressure and heart rate baseline"),
            flag(
                SevereHeadache,
                Severity::Medium,
                "Severe Headache",
                "Patient reported severe or unusual headaches",
                "Medical review to exclude serious pathology",
            )
            .ask(
                "Is this headache new, sudden in onset, or different from your usual headaches?",
                &[],
            )
            .because("A new or sudden headache may be vascular", &[SpinalManipulation]),
            flag(
                RecentInfection,
                Severity::Medium,
                "Recent Infection/Fever",
                "Patient reported a recent infection or fever",
                "Defer treatment until the infection has resolved",
            )
            .ask(
                "Has the infection fully resolved, and are you still taking antibiotics?",
                &[CurrentMedications],
            )
            .because(
                "Active infection contraindicates heat and electrical modalities",
                &[Electrotherapy, Ultrasound, Laser],
            ),
            flag(
                SteroidUse,
                Severity::Medium,
                "Steroid Use",
                "Patient currently takes or recently took steroids",
                "Increased fracture risk: caution with manual therapy",
            )
            .ask(
                "Which steroid medication do you take, at what dose, and for how long?",
                &[CurrentMedications],
            )
            .because(
                "Long-term steroid use weakens bone",
                &[ManualTherapy, SpinalManipulation],
            ),
            flag(
                TraumaHistory,
                Severity::Low,
                "Recent Trauma",
                "Patient reported recent trauma or injury",
                "Fracture exclusion required before manual therapy",
            )
            .ask(
                "Have you had imaging (X-ray/MRI) for this injury?",
                &[SurgicalHistory],
            )
            .because(
                "Fracture exclusion required before manual therapy",
                &[ManualTherapy, SpinalManipulation],
            )
            .assess("Trauma mechanism and imaging review"),
            flag(
                OsteoporosisRisk,
                Severity::Low,
                "Osteoporosis Risk",
                "Patient has an osteoporosis diagnosis or risk factors",
                "Bone density consideration: modify loading",
            )
            .ask(
                "Have you had a bone density (DEXA) scan? What was the result?",
                &[OtherConditions],
            )
            .because(
                "Bone density sets safe loading and mobilisation force",
                &[ManualTherapy, SpinalManipulation, ExerciseTherapy],
            ),
            flag(
                DizzinessBalanceIssues,
                Severity::Low,
                "Dizziness/Balance Issues",
                "Patient reported dizziness, vertigo, or balance problems",
                "Vestibular assessment before exercise prescription",
            )
            .ask(
                "When does the dizziness occur, and have you had any falls in the last six months?",
                &[],
            )
            .because(
                "Falls risk and cervical arterial dysfunction change exercise and manipulation",
                &[ExerciseTherapy, SpinalManipulation],
            )
            .assess("Balance and falls-risk screen"),
        ];

        let escalations = vec![
            escalate(
                &[UnexplainedWeightLoss, CancerHistory],
                UrgencyLevel::Urgent,
                "Unexplained weight loss with a cancer history",
            ),
            escalate(
                &[CardiovascularSymptoms, NightPain],
                UrgencyLevel::Urgent,
                "Cardiovascular symptoms with severe night pain",
            ),
            escalate(
                &[RecentInfection, NightPain],
                UrgencyLevel::Urgent,
                "Recent infection with severe night pain",
            ),
        ];

        #[rustfmt::skip]
        let modality_rules = vec![
            // Electrotherapy
            rule(RecentInfection, Electrotherapy, Contraindicated, "Active infection in treatment area"),
            rule(CancerHistory, Electrotherapy, Contraindicated, "History of malignancy: oncology clearance required, never apply over a tumour site"),
            rule(CardiovascularSymptoms, Electrotherapy, Contraindicated, "Cardiovascular symptoms: electrical stimulation may affect cardiac rhythm")
                .check("Cardiac clearance before any electrical stimulation"),
            rule(NeurologicalSymptoms, Electrotherapy, Precaution, "Reduced sensation increases burn risk")
                .check("Sensation assessment before application"),
            // Ultrasound
            rule(CancerHistory, Ultrasound, Contraindicated, "History of malignancy: do not apply over a tumour site"),
            rule(RecentInfection, Ultrasound, Contraindicated, "Active infection"),
            rule(NeurologicalSymptoms, Ultrasound, Precaution, "Reduced sensation")
                .check("Sensation test before application"),
            // Laser
            rule(CancerHistory, Laser, Contraindicated, "Malignancy: oncology clearance required"),
            rule(RecentInfection, Laser, Precaution, "Active infection: monitor tissue response"),
            // Manual therapy
            rule(OsteoporosisRisk, ManualTherapy, Precaution, "Increased fracture risk: gentle mobilisation only")
                .check("Bone density consideration"),
            rule(SteroidUse, ManualTherapy, Precaution, "Steroid use increases fracture risk: avoid high-velocity techniques")
                .check("Bone density consideration"),
            rule(TraumaHistory, ManualTherapy, Precaution, "Recent trauma: fracture exclusion required")
                .check("Imaging review if available"),
            rule(CardiovascularSymptoms, ManualTherapy, Precaution, "Cardiovascular symptoms: monitor blood pressure response"),
            // Spinal manipulation
            rule(OsteoporosisRisk, SpinalManipulation, Precaution, "Reduced bone density: avoid high-velocity thrust techniques")
                .check("Bone density consideration"),
            rule(SteroidUse, SpinalManipulation, Precaution, "Steroid use increases fracture risk"),
            rule(TraumaHistory, SpinalManipulation, Contraindicated, "Recent trauma: no manipulation before fracture exclusion")
                .check("Imaging review if available"),
            rule(CardiovascularSymptoms, SpinalManipulation, Contraindicated, "Cardiovascular symptoms: vascular risk with manipulation"),
            rule(SevereHeadache, SpinalManipulation, Contraindicated, "Severe or unusual headache: exclude vascular pathology before manipulation"),
            rule(DizzinessBalanceIssues, SpinalManipulation, Precaution, "Dizziness: screen for cervical arterial dysfunction")
                .check("Cervical arterial dysfunction screen"),
            // Exercise therapy
            rule(CardiovascularSymptoms, ExerciseTherapy, Precaution, "Cardiovascular symptoms: start with low-intensity exercise")
                .check("Blood pressure monitoring"),
            rule(DizzinessBalanceIssues, ExerciseTherapy, Precaution, "Balance issues: supervised exercise with fall prevention measures"),
            rule(OsteoporosisRisk, ExerciseTherapy, Precaution, "Osteoporosis risk: avoid high-impact loading, progress gradually"),
        ];

        let triage_labels = BTreeMap::from([
            (
                UrgencyLevel::Routine,
                "Standard physiotherapy care pathway appropriate".to_string(),
            ),
            (
                UrgencyLevel::Moderate,
                "Proceed with caution: exercise clinical judgement and consider GP liaison"
                    .to_string(),
            ),
            (
                UrgencyLevel::Urgent,
                "Medical review required before commencing treatment".to_string(),
            ),
            (
                UrgencyLevel::Emergency,
                "Immediate medical referral advised - do not commence treatment".to_string(),
            ),
        ]);

        let domain_rules = vec![
            DomainRule {
                any_of: vec![NeurologicalSymptoms, BladderBowelDysfunction],
                none_of: vec![],
                domain: ClinicalDomain::Neurogenic,
                rationale: "Neurological signs present: neurogenic pattern".into(),
            },
            DomainRule {
                any_of: vec![CardiovascularSymptoms],
                none_of: vec![],
                domain: ClinicalDomain::Vascular,
                rationale: "Cardiovascular symptoms: vascular consideration".into(),
            },
            DomainRule {
                any_of: vec![RecentInfection, CancerHistory, UnexplainedWeightLoss],
                none_of: vec![],
                domain: ClinicalDomain::Systemic,
                rationale: "Systemic signs present".into(),
            },
            DomainRule {
                any_of: vec![NightPain],
                none_of: vec![TraumaHistory],
                domain: ClinicalDomain::MskInflammatory,
                rationale: "Night pain without trauma: inflammatory pattern".into(),
            },
        ];

        let session_templates = BTreeMap::from([
            (
                Complexity::High,
                template(
                    60,
                    "Extended session required due to complexity and safety considerations",
                    &[
                        "Comprehensive medical screening",
                        "Red flag symptom clarification",
                        "Differential diagnosis ruling out",
                    ],
                ),
            ),
            (
                Complexity::Moderate,
                template(
                    45,
                    "Standard session with additional safety screening",
                    &["Focused clinical examination", "Safety screening for modalities"],
                ),
            ),
            (
                Complexity::Low,
                template(
                    30,
                    "Standard session appropriate for low-risk presentation",
                    &["Standard musculoskeletal assessment"],
                ),
            ),
        ]);

        ScreeningPolicy {
            version: STANDARD_POLICY_VERSION.to_string(),
            severity_weights: SeverityWeights {
                high: 10,
                medium: 5,
                low: 2,
            },
            urgency_thresholds: UrgencyThresholds {
                moderate: 1,
                urgent: 10,
                emergency: 20,
            },
            red_flags,
            escalations,
            modality_rules,
            emergency_gate_reason: "Immediate medical referral required before any treatment."
                .into(),
            triage_labels,
            domain_rules,
            acute_flags: vec![TraumaHistory],
            consent_question: "Can you confirm consent for treatment and data processing?".into(),
            baseline_questions: vec![
                "What are your main functional goals for treatment?".into(),
                "On a scale of 0-10, what is your current pain level?".into(),
            ],
            session_templates,
            closing_priorities: vec![
                "Functional movement assessment".into(),
                "Patient goals and expectations discussion".into(),
            ],
        }
    }
}

fn flag(
    kind: RedFlagKind,
    severity: Severity,
    label: &str,
    rationale: &str,
    suggested_action: &str,
) -> RedFlagRule {
    RedFlagRule {
        flag: kind,
        label: label.into(),
        severity,
        rationale: rationale.into(),
        suggested_action: suggested_action.into(),
        forces_emergency: false,
        follow_up: None,
        key_finding: None,
        assessment_priority: None,
    }
}

impl RedFlagRule {
    fn hard_trigger(mut self) -> Self {
        self.forces_emergency = true;
        self
    }

    fn ask(mut self, question: &str, unless_context: &[ContextField]) -> Self {
        self.follow_up = Some(FollowUpRule {
            question: question.into(),
            unless_context: unless_context.to_vec(),
            why_it_matters: None,
            impacts: Vec::new(),
        });
        self
    }

    fn because(mut self, why_it_matters: &str, impacts: &[ModalityClass]) -> Self {
        if let Some(follow_up) = &mut self.follow_up {
            follow_up.why_it_matters = Some(why_it_matters.into());
            follow_up.impacts = impacts.to_vec();
        }
        self
    }

    fn finding(mut self, text: &str) -> Self {
        self.key_finding = Some(text.into());
        self
    }

    fn assess(mut self, priority: &str) -> Self {
        self.assessment_priority = Some(priority.into());
        self
    }
}

fn escalate(all_of: &[RedFlagKind], minimum_level: UrgencyLevel, reason: &str) -> EscalationRule {
    EscalationRule {
        all_of: all_of.to_vec(),
        minimum_level,
        reason: reason.into(),
    }
}

fn rule(flag: RedFlagKind, class: ModalityClass, status: GateStatus, reason: &str) -> ModalityRule {
    ModalityRule {
        flag,
        class,
        status,
        reason: reason.into(),
        required_check: None,
    }
}

impl ModalityRule {
    fn check(mut self, required_check: &str) -> Self {
        self.required_check = Some(required_check.into());
        self
    }
}

fn template(minutes: u32, justification: &str, priorities: &[&str]) -> SessionTemplate {
    SessionTemplate {
        minutes,
        justification: justification.into(),
        priorities: priorities.iter().map(|p| p.to_string()).collect(),
    }
}
