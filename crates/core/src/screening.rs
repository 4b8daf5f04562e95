//! Patient intake screening model.
//!
//! [`ScreeningInput`] mirrors the questionnaire a patient completes before their first session:
//! twelve red-flag yes/no questions, free-text medical context, and treatment consent.
//!
//! The wire form is camelCase. Deserialisation is lenient: a missing, `null` or malformed value
//! becomes `false` (or an empty string) rather than an error, so an incomplete record can always be
//! analysed as "no risk reported" for the affected questions.

use serde::{Deserialize, Deserializer, Serialize};

/// Intake screening answers as submitted by the patient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreeningInput {
    #[serde(deserialize_with = "lenient")]
    pub unexplained_weight_loss: bool,
    #[serde(deserialize_with = "lenient")]
    pub night_pain: bool,
    #[serde(deserialize_with = "lenient")]
    pub trauma_history: bool,
    #[serde(deserialize_with = "lenient")]
    pub neurological_symptoms: bool,
    #[serde(deserialize_with = "lenient")]
    pub bladder_bowel_dysfunction: bool,
    #[serde(deserialize_with = "lenient")]
    pub recent_infection: bool,
    #[serde(deserialize_with = "lenient")]
    pub cancer_history: bool,
    #[serde(deserialize_with = "lenient")]
    pub steroid_use: bool,
    #[serde(deserialize_with = "lenient")]
    pub osteoporosis_risk: bool,
    #[serde(deserialize_with = "lenient")]
    pub cardiovascular_symptoms: bool,
    #[serde(deserialize_with = "lenient")]
    pub severe_headache: bool,
    #[serde(deserialize_with = "lenient")]
    pub dizziness_balance_issues: bool,

    #[serde(deserialize_with = "lenient")]
    pub current_medications: String,
    #[serde(deserialize_with = "lenient")]
    pub allergies: String,
    #[serde(deserialize_with = "lenient")]
    pub surgical_history: String,
    #[serde(deserialize_with = "lenient")]
    pub other_conditions: String,
    #[serde(deserialize_with = "lenient")]
    pub gp_details: String,
    #[serde(deserialize_with = "lenient")]
    pub emergency_contact: String,
    #[serde(deserialize_with = "lenient")]
    pub emergency_contact_phone: String,

    #[serde(deserialize_with = "lenient")]
    pub consent_given: bool,
}

impl ScreeningInput {
    /// Returns `true` if the patient answered "yes" to the given red-flag question.
    pub fn has(&self, kind: RedFlagKind) -> bool {
        match kind {
            RedFlagKind::UnexplainedWeightLoss => self.unexplained_weight_loss,
            RedFlagKind::NightPain => self.night_pain,
            RedFlagKind::TraumaHistory => self.trauma_history,
            RedFlagKind::NeurologicalSymptoms => self.neurological_symptoms,
            RedFlagKind::BladderBowelDysfunction => self.bladder_bowel_dysfunction,
            RedFlagKind::RecentInfection => self.recent_infection,
            RedFlagKind::CancerHistory => self.cancer_history,
            RedFlagKind::SteroidUse => self.steroid_use,
            RedFlagKind::OsteoporosisRisk => self.osteoporosis_risk,
            RedFlagKind::CardiovascularSymptoms => self.cardiovascular_symptoms,
            RedFlagKind::SevereHeadache => self.severe_headache,
            RedFlagKind::DizzinessBalanceIssues => self.dizziness_balance_issues,
        }
    }

    /// Sets the answer to a red-flag question.
    pub fn set(&mut self, kind: RedFlagKind, value: bool) {
        let slot = match kind {
            RedFlagKind::UnexplainedWeightLoss => &mut self.unexplained_weight_loss,
            RedFlagKind::NightPain => &mut self.night_pain,
            RedFlagKind::TraumaHistory => &mut self.trauma_history,
            RedFlagKind::NeurologicalSymptoms => &mut self.neurological_symptoms,
            RedFlagKind::BladderBowelDysfunction => &mut self.bladder_bowel_dysfunction,
            RedFlagKind::RecentInfection => &mut self.recent_infection,
            RedFlagKind::CancerHistory => &mut self.cancer_history,
            RedFlagKind::SteroidUse => &mut self.steroid_use,
            RedFlagKind::OsteoporosisRisk => &mut self.osteoporosis_risk,
            RedFlagKind::CardiovascularSymptoms => &mut self.cardiovascular_symptoms,
            RedFlagKind::SevereHeadache => &mut self.severe_headache,
            RedFlagKind::DizzinessBalanceIssues => &mut self.dizziness_balance_issues,
        };
        *slot = value;
    }

    /// Builder-style variant of [`ScreeningInput::set`], handy for fixtures.
    pub fn with(mut self, kind: RedFlagKind) -> Self {
        self.set(kind, true);
        self
    }

    /// Returns the free text recorded for a context field (possibly empty).
    pub fn context(&self, field: ContextField) -> &str {
        match field {
            ContextField::CurrentMedications => &self.current_medications,
            ContextField::Allergies => &self.allergies,
            ContextField::SurgicalHistory => &self.surgical_history,
            ContextField::OtherConditions => &self.other_conditions,
            ContextField::GpDetails => &self.gp_details,
            ContextField::EmergencyContact => &self.emergency_contact,
            ContextField::EmergencyContactPhone => &self.emergency_contact_phone,
        }
    }

    /// Returns `true` if the context field holds any non-whitespace text.
    pub fn has_context(&self, field: ContextField) -> bool {
        !self.context(field).trim().is_empty()
    }

    /// Red-flag kinds answered "yes", in questionnaire order.
    pub fn reported_flags(&self) -> impl Iterator<Item = RedFlagKind> + '_ {
        RedFlagKind::ALL.into_iter().filter(|kind| self.has(*kind))
    }
}

/// One red-flag question on the intake form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedFlagKind {
    UnexplainedWeightLoss,
    NightPain,
    TraumaHistory,
    NeurologicalSymptoms,
    BladderBowelDysfunction,
    RecentInfection,
    CancerHistory,
    SteroidUse,
    OsteoporosisRisk,
    CardiovascularSymptoms,
    SevereHeadache,
    DizzinessBalanceIssues,
}

impl RedFlagKind {
    /// Every red-flag question, in questionnaire order.
    pub const ALL: [RedFlagKind; 12] = [
        RedFlagKind::UnexplainedWeightLoss,
        RedFlagKind::NightPain,
        RedFlagKind::TraumaHistory,
        RedFlagKind::NeurologicalSymptoms,
        RedFlagKind::BladderBowelDysfunction,
        RedFlagKind::RecentInfection,
        RedFlagKind::CancerHistory,
        RedFlagKind::SteroidUse,
        RedFlagKind::OsteoporosisRisk,
        RedFlagKind::CardiovascularSymptoms,
        RedFlagKind::SevereHeadache,
        RedFlagKind::DizzinessBalanceIssues,
    ];

    /// Field name used on the wire and in policy files.
    pub fn wire_name(self) -> &'static str {
        match self {
            RedFlagKind::UnexplainedWeightLoss => "unexplainedWeightLoss",
            RedFlagKind::NightPain => "nightPain",
            RedFlagKind::TraumaHistory => "traumaHistory",
            RedFlagKind::NeurologicalSymptoms => "neurologicalSymptoms",
            RedFlagKind::BladderBowelDysfunction => "bladderBowelDysfunction",
            RedFlagKind::RecentInfection => "recentInfection",
            RedFlagKind::CancerHistory => "cancerHistory",
            RedFlagKind::SteroidUse => "steroidUse",
            RedFlagKind::OsteoporosisRisk => "osteoporosisRisk",
            RedFlagKind::CardiovascularSymptoms => "cardiovascularSymptoms",
            RedFlagKind::SevereHeadache => "severeHeadache",
            RedFlagKind::DizzinessBalanceIssues => "dizzinessBalanceIssues",
        }
    }
}

impl std::fmt::Display for RedFlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Free-text context captured alongside the red-flag questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContextField {
    CurrentMedications,
    Allergies,
    SurgicalHistory,
    OtherConditions,
    GpDetails,
    EmergencyContact,
    EmergencyContactPhone,
}

/// Accepts either a well-typed value or anything else, so bad input degrades to the default.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(serde::de::IgnoredAny),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Value(value) => value,
        Lenient::Other(_) => T::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_form() {
        let json = r#"{
            "cancerHistory": true,
            "nightPain": false,
            "surgicalHistory": "ACL repair 2019",
            "consentGiven": true
        }"#;

        let input: ScreeningInput = serde_json::from_str(json).expect("parse screening");
        assert!(input.cancer_history);
        assert!(!input.night_pain);
        assert_eq!(input.surgical_history, "ACL repair 2019");
        assert!(input.consent_given);
        assert_eq!(
            input.reported_flags().collect::<Vec<_>>(),
            vec![RedFlagKind::CancerHistory]
        );
    }

    #[test]
    fn missing_null_and_malformed_values_fall_back_to_defaults() {
        let json = r#"{
            "bladderBowelDysfunction": null,
            "nightPain": "yes",
            "steroidUse": 1,
            "allergies": null,
            "gpDetails": 42,
            "consentGiven": "true"
        }"#;

        let input: ScreeningInput = serde_json::from_str(json).expect("lenient parse");
        assert_eq!(input, ScreeningInput::default());
    }

    #[test]
    fn lenient_parsing_also_applies_to_yaml() {
        let yaml = "traumaHistory: true\nsurgicalHistory: ~\nosteoporosisRisk: [1, 2]\n";
        let input: ScreeningInput = serde_yaml::from_str(yaml).expect("parse yaml");
        assert!(input.trauma_history);
        assert!(!input.osteoporosis_risk);
        assert!(input.surgical_history.is_empty());
    }

    #[test]
    fn set_and_has_cover_every_kind() {
        for kind in RedFlagKind::ALL {
            let input = ScreeningInput::default().with(kind);
            assert!(input.has(kind));
            assert_eq!(input.reported_flags().count(), 1, "{kind} should map to one field");
        }
    }

    #[test]
    fn wire_names_match_serde_names() {
        for kind in RedFlagKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.wire_name()));
        }
    }

    #[test]
    fn whitespace_context_counts_as_missing() {
        let input = ScreeningInput {
            surgical_history: "   ".into(),
            gp_details: "Dr Jones, Riverside Practice".into(),
            ..Default::default()
        };
        assert!(!input.has_context(ContextField::SurgicalHistory));
        assert!(input.has_context(ContextField::GpDetails));
    }
}
