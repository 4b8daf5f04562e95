//! Clinical vocabulary shared by the policy and the analysis engine.
//!
//! Every ordered category here derives `Ord` in ascending order of concern, so "the stricter of
//! two verdicts" is always `max`.

use serde::{Deserialize, Serialize};

/// Severity tier of a single red flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Overall urgency of the screening, `ROUTINE < MODERATE < URGENT < EMERGENCY`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Routine,
    Moderate,
    Urgent,
    Emergency,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 4] = [
        UrgencyLevel::Routine,
        UrgencyLevel::Moderate,
        UrgencyLevel::Urgent,
        UrgencyLevel::Emergency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyLevel::Routine => "ROUTINE",
            UrgencyLevel::Moderate => "MODERATE",
            UrgencyLevel::Urgent => "URGENT",
            UrgencyLevel::Emergency => "EMERGENCY",
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a modality may be used, `SAFE < PRECAUTION < CONTRAINDICATED`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Safe,
    Precaution,
    Contraindicated,
}

/// Treatment class used to key the contraindication table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalityClass {
    Electrotherapy,
    Ultrasound,
    Laser,
    ManualTherapy,
    SpinalManipulation,
    ExerciseTherapy,
}

/// A physiotherapy treatment modality offered by the clinic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modality {
    #[serde(rename = "MENS")]
    Mens,
    #[serde(rename = "EMS_Aussie")]
    EmsAussie,
    #[serde(rename = "EMS_Russian")]
    EmsRussian,
    #[serde(rename = "Ultrasound_1MHz")]
    Ultrasound1Mhz,
    #[serde(rename = "Ultrasound_3MHz")]
    Ultrasound3Mhz,
    #[serde(rename = "Laser_Therapy")]
    LaserTherapy,
    #[serde(rename = "Manual_Therapy")]
    ManualTherapy,
    #[serde(rename = "Spinal_Manipulation")]
    SpinalManipulation,
    #[serde(rename = "Kinesiotherapy")]
    Kinesiotherapy,
    #[serde(rename = "Neuromuscular_Reeducation")]
    NeuromuscularReeducation,
    #[serde(rename = "Postural_Exercise")]
    PosturalExercise,
}

impl Modality {
    pub const ALL: [Modality; 11] = [
        Modality::Mens,
        Modality::EmsAussie,
        Modality::EmsRussian,
        Modality::Ultrasound1Mhz,
        Modality::Ultrasound3Mhz,
        Modality::LaserTherapy,
        Modality::ManualTherapy,
        Modality::SpinalManipulation,
        Modality::Kinesiotherapy,
        Modality::NeuromuscularReeducation,
        Modality::PosturalExercise,
    ];

    pub fn class(self) -> ModalityClass {
        match self {
            Modality::Mens | Modality::EmsAussie | Modality::EmsRussian => {
                ModalityClass::Electrotherapy
            }
            Modality::Ultrasound1Mhz | Modality::Ultrasound3Mhz => ModalityClass::Ultrasound,
            Modality::LaserTherapy => ModalityClass::Laser,
            Modality::ManualTherapy => ModalityClass::ManualTherapy,
            Modality::SpinalManipulation => ModalityClass::SpinalManipulation,
            Modality::Kinesiotherapy
            | Modality::NeuromuscularReeducation
            | Modality::PosturalExercise => ModalityClass::ExerciseTherapy,
        }
    }

    /// Human-readable name for reports.
    pub fn display_name(self) -> &'static str {
        match self {
            Modality::Mens => "MENS (microcurrent)",
            Modality::EmsAussie => "EMS (Aussie current)",
            Modality::EmsRussian => "EMS (Russian current)",
            Modality::Ultrasound1Mhz => "Ultrasound 1 MHz",
            Modality::Ultrasound3Mhz => "Ultrasound 3 MHz",
            Modality::LaserTherapy => "Laser therapy",
            Modality::ManualTherapy => "Manual therapy",
            Modality::SpinalManipulation => "Spinal manipulation",
            Modality::Kinesiotherapy => "Kinesiotherapy",
            Modality::NeuromuscularReeducation => "Neuromuscular re-education",
            Modality::PosturalExercise => "Postural exercise",
        }
    }
}

/// Likely clinical domain behind the presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClinicalDomain {
    MskMechanical,
    MskInflammatory,
    Neurogenic,
    Vascular,
    Systemic,
}

impl ClinicalDomain {
    pub fn description(self) -> &'static str {
        match self {
            ClinicalDomain::MskMechanical => "MSK mechanical",
            ClinicalDomain::MskInflammatory => "MSK inflammatory",
            ClinicalDomain::Neurogenic => "neurogenic",
            ClinicalDomain::Vascular => "vascular",
            ClinicalDomain::Systemic => "systemic",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Acuity {
    Acute,
    Unknown,
}

/// Case complexity, derived from urgency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Complexity {
    Low,
    Moderate,
    High,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Low, Complexity::Moderate, Complexity::High];

    pub fn for_urgency(level: UrgencyLevel) -> Self {
        match level {
            UrgencyLevel::Routine => Complexity::Low,
            UrgencyLevel::Moderate => Complexity::Moderate,
            UrgencyLevel::Urgent | UrgencyLevel::Emergency => Complexity::High,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orderings_rise_with_concern() {
        assert!(UrgencyLevel::Routine < UrgencyLevel::Moderate);
        assert!(UrgencyLevel::Urgent < UrgencyLevel::Emergency);
        assert!(GateStatus::Safe < GateStatus::Precaution);
        assert!(GateStatus::Precaution < GateStatus::Contraindicated);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn modalities_serialise_with_clinic_identifiers() {
        let json = serde_json::to_string(&Modality::Ultrasound1Mhz).unwrap();
        assert_eq!(json, "\"Ultrasound_1MHz\"");
        let level = serde_json::to_string(&UrgencyLevel::Emergency).unwrap();
        assert_eq!(level, "\"EMERGENCY\"");
    }

    #[test]
    fn every_electrotherapy_modality_shares_a_class() {
        let electro: Vec<_> = Modality::ALL
            .into_iter()
            .filter(|m| m.class() == ModalityClass::Electrotherapy)
            .collect();
        assert_eq!(
            electro,
            vec![Modality::Mens, Modality::EmsAussie, Modality::EmsRussian]
        );
    }

    #[test]
    fn complexity_tracks_urgency() {
        assert_eq!(Complexity::for_urgency(UrgencyLevel::Routine), Complexity::Low);
        assert_eq!(Complexity::for_urgency(UrgencyLevel::Moderate), Complexity::Moderate);
        assert_eq!(Complexity::for_urgency(UrgencyLevel::Emergency), Complexity::High);
    }
}
