//! Versioned screening policy.
//!
//! All clinical judgement the engine applies lives here as data: severity weights, urgency
//! thresholds, the red-flag catalogue, combination escalations, the modality contraindication
//! table, triage labels, domain rules, follow-up questions and session templates.
//!
//! The built-in table is [`ScreeningPolicy::standard`]. Clinicians can export it with
//! [`ScreeningPolicy::render`], edit the YAML, and point the service at the edited file; the engine
//! code does not change.
//!
//! Parsing is strict: unknown keys are rejected and the failing path is reported, in the same
//! manner as the on-disk record formats.

mod standard;

use crate::clinical::{
    ClinicalDomain, Complexity, GateStatus, ModalityClass, Severity, UrgencyLevel,
};
use crate::error::{ScreeningError, ScreeningResult};
use crate::screening::{ContextField, RedFlagKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Flags a policy must always treat as emergencies, whatever else it changes.
pub const CAUDA_EQUINA_FLAGS: [RedFlagKind; 2] = [
    RedFlagKind::BladderBowelDysfunction,
    RedFlagKind::NeurologicalSymptoms,
];

/// The complete clinical rule set applied by the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreeningPolicy {
    /// Identifies this revision of the table in every analysis it produces.
    pub version: String,
    pub severity_weights: SeverityWeights,
    pub urgency_thresholds: UrgencyThresholds,
    /// Red-flag catalogue in clinical-priority order (most urgent first).
    pub red_flags: Vec<RedFlagRule>,
    pub escalations: Vec<EscalationRule>,
    pub modality_rules: Vec<ModalityRule>,
    /// Reason attached to every modality when the urgency level is `EMERGENCY`.
    pub emergency_gate_reason: String,
    pub triage_labels: BTreeMap<UrgencyLevel, String>,
    /// Evaluated in order; the first match decides the likely domain.
    pub domain_rules: Vec<DomainRule>,
    /// Flags that mark a presentation as acute.
    #[serde(default)]
    pub acute_flags: Vec<RedFlagKind>,
    pub consent_question: String,
    #[serde(default)]
    pub baseline_questions: Vec<String>,
    pub session_templates: BTreeMap<Complexity, SessionTemplate>,
    #[serde(default)]
    pub closing_priorities: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityWeights {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl SeverityWeights {
    pub fn weight(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

/// Minimum score for each non-routine level. A score of zero is always `ROUTINE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UrgencyThresholds {
    pub moderate: u32,
    pub urgent: u32,
    pub emergency: u32,
}

impl UrgencyThresholds {
    pub fn level_for(&self, score: u32) -> UrgencyLevel {
        if score >= self.emergency {
            UrgencyLevel::Emergency
        } else if score >= self.urgent {
            UrgencyLevel::Urgent
        } else if score >= self.moderate {
            UrgencyLevel::Moderate
        } else {
            UrgencyLevel::Routine
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedFlagRule {
    pub flag: RedFlagKind,
    pub label: String,
    pub severity: Severity,
    pub rationale: String,
    pub suggested_action: String,
    /// Forces `EMERGENCY` whatever the aggregate score.
    #[serde(default)]
    pub forces_emergency: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUpRule>,
    /// Short phrase listed under "Key Findings" in the clinical summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_finding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment_priority: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowUpRule {
    pub question: String,
    /// The question is skipped when any of these fields already has text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unless_context: Vec<ContextField>,
    /// Why the answer matters, shown to staff alongside the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_it_matters: Option<String>,
    /// Treatment classes whose gating the answer can change.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub impacts: Vec<ModalityClass>,
}

/// Raises the urgency floor when every listed flag is present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EscalationRule {
    pub all_of: Vec<RedFlagKind>,
    pub minimum_level: UrgencyLevel,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModalityRule {
    pub flag: RedFlagKind,
    pub class: ModalityClass,
    pub status: GateStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_check: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainRule {
    pub any_of: Vec<RedFlagKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub none_of: Vec<RedFlagKind>,
    pub domain: ClinicalDomain,
    pub rationale: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionTemplate {
    pub minutes: u32,
    pub justification: String,
    #[serde(default)]
    pub priorities: Vec<String>,
}

impl ScreeningPolicy {
    /// Parse a policy from YAML text and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::PolicySchema`] (with the failing path) when the YAML does not
    /// match the schema, or [`ScreeningError::InvalidPolicy`] when it parses but fails
    /// [`ScreeningPolicy::validate`].
    pub fn parse(yaml_text: &str) -> ScreeningResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let policy = match serde_path_to_error::deserialize::<_, ScreeningPolicy>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(ScreeningError::PolicySchema {
                    path,
                    message: source.to_string(),
                });
            }
        };

        policy.validate()?;
        Ok(policy)
    }

    /// Render the policy as YAML.
    pub fn render(&self) -> ScreeningResult<String> {
        serde_yaml::to_string(self).map_err(ScreeningError::YamlSerialization)
    }

    /// Read, parse and validate a policy file.
    pub fn load(path: &Path) -> ScreeningResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScreeningError::PolicyRead {
            path: path.to_path_buf(),
            source,
        })?;
        let policy = Self::parse(&text)?;
        tracing::info!(
            "loaded screening policy {} from {}",
            policy.version,
            path.display()
        );
        Ok(policy)
    }

    /// Looks up the catalogue entry for a red-flag kind.
    pub fn red_flag(&self, kind: RedFlagKind) -> Option<&RedFlagRule> {
        self.red_flags.iter().find(|rule| rule.flag == kind)
    }

    /// The flag-specific follow-up that asks `question`, if any.
    pub fn follow_up_for(&self, question: &str) -> Option<&FollowUpRule> {
        self.red_flags
            .iter()
            .filter_map(|rule| rule.follow_up.as_ref())
            .find(|follow_up| follow_up.question == question)
    }

    pub fn triage_label(&self, level: UrgencyLevel) -> &str {
        self.triage_labels
            .get(&level)
            .map(String::as_str)
            .unwrap_or_else(|| level.as_str())
    }

    /// Check the structural invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::InvalidPolicy`] describing the first violation found.
    pub fn validate(&self) -> ScreeningResult<()> {
        fn invalid(message: impl Into<String>) -> ScreeningError {
            ScreeningError::InvalidPolicy(message.into())
        }

        fn require_text(value: &str, what: &str) -> ScreeningResult<()> {
            if value.trim().is_empty() {
                return Err(invalid(format!("{what} cannot be empty")));
            }
            Ok(())
        }

        require_text(&self.version, "version")?;
        require_text(&self.emergency_gate_reason, "emergency_gate_reason")?;
        require_text(&self.consent_question, "consent_question")?;

        let weights = self.severity_weights;
        if weights.low == 0 || weights.medium < weights.low || weights.high < weights.medium {
            return Err(invalid(
                "severity weights must satisfy high >= medium >= low > 0",
            ));
        }

        let t = self.urgency_thresholds;
        if !(t.moderate >= 1 && t.moderate < t.urgent && t.urgent < t.emergency) {
            return Err(invalid(
                "urgency thresholds must satisfy 1 <= moderate < urgent < emergency",
            ));
        }

        let mut seen = BTreeSet::new();
        for rule in &self.red_flags {
            if !seen.insert(rule.flag) {
                return Err(invalid(format!("red flag {} is listed twice", rule.flag)));
            }
            require_text(&rule.label, &format!("label for {}", rule.flag))?;
            require_text(&rule.rationale, &format!("rationale for {}", rule.flag))?;
            if let Some(follow_up) = &rule.follow_up {
                require_text(&follow_up.question, &format!("follow-up for {}", rule.flag))?;
            }
        }
        if let Some(missing) = RedFlagKind::ALL.iter().find(|kind| !seen.contains(*kind)) {
            return Err(invalid(format!("red flag {missing} has no catalogue entry")));
        }

        for kind in CAUDA_EQUINA_FLAGS {
            let forced = self
                .red_flag(kind)
                .is_some_and(|rule| rule.forces_emergency && rule.severity == Severity::High);
            if !forced {
                return Err(invalid(format!(
                    "red flag {kind} must be high severity and force an emergency"
                )));
            }
        }

        for rule in &self.escalations {
            if rule.all_of.is_empty() {
                return Err(invalid("escalation rules must name at least one flag"));
            }
            require_text(&rule.reason, "escalation reason")?;
        }

        for rule in &self.modality_rules {
            if rule.status == GateStatus::Safe {
                return Err(invalid(format!(
                    "modality rule for {} on {:?} must restrict the modality",
                    rule.flag, rule.class
                )));
            }
            require_text(&rule.reason, "modality rule reason")?;
        }

        for rule in &self.domain_rules {
            if rule.any_of.is_empty() {
                return Err(invalid("domain rules must name at least one flag"));
            }
        }

        for level in UrgencyLevel::ALL {
            match self.triage_labels.get(&level) {
                Some(label) => require_text(label, &format!("triage label for {level}"))?,
                None => return Err(invalid(format!("missing triage label for {level}"))),
            }
        }

        for complexity in Complexity::ALL {
            if !self.session_templates.contains_key(&complexity) {
                return Err(invalid(format!(
                    "missing session template for {complexity:?} complexity"
                )));
            }
        }

        Ok(())
    }
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn standard_policy_is_valid() {
        ScreeningPolicy::standard()
            .validate()
            .expect("standard policy should validate");
    }

    #[test]
    fn standard_policy_uses_documented_weights_and_thresholds() {
        let policy = ScreeningPolicy::standard();
        assert_eq!(policy.severity_weights.weight(Severity::High), 10);
        assert_eq!(policy.severity_weights.weight(Severity::Medium), 5);
        assert_eq!(policy.severity_weights.weight(Severity::Low), 2);

        let t = policy.urgency_thresholds;
        assert_eq!(t.level_for(0), UrgencyLevel::Routine);
        assert_eq!(t.level_for(1), UrgencyLevel::Moderate);
        assert_eq!(t.level_for(9), UrgencyLevel::Moderate);
        assert_eq!(t.level_for(10), UrgencyLevel::Urgent);
        assert_eq!(t.level_for(19), UrgencyLevel::Urgent);
        assert_eq!(t.level_for(20), UrgencyLevel::Emergency);
        assert_eq!(t.level_for(500), UrgencyLevel::Emergency);
    }

    #[test]
    fn exported_yaml_parses_back_to_the_same_policy() {
        let policy = ScreeningPolicy::standard();
        let yaml = policy.render().expect("render policy");
        assert!(yaml.contains("version:"));
        assert!(yaml.contains("bladderBowelDysfunction"));

        let reparsed = ScreeningPolicy::parse(&yaml).expect("reparse policy");
        assert_eq!(policy, reparsed);
    }

    #[test]
    fn rejects_unknown_keys_with_path() {
        let mut yaml = ScreeningPolicy::standard().render().unwrap();
        yaml = yaml.replacen("severity_weights:\n", "severity_weights:\n  extreme: 50\n", 1);

        let err = ScreeningPolicy::parse(&yaml).expect_err("unknown key should fail");
        match err {
            ScreeningError::PolicySchema { path, message } => {
                assert!(path.contains("severity_weights"), "path was {path}");
                assert!(message.contains("extreme"));
            }
            other => panic!("expected PolicySchema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_red_flag_entries() {
        let mut policy = ScreeningPolicy::standard();
        let duplicate = policy.red_flags[0].clone();
        policy.red_flags.push(duplicate);

        let err = policy.validate().expect_err("duplicate should fail");
        assert!(err.to_string().contains("listed twice"));
    }

    #[test]
    fn rejects_missing_red_flag_entries() {
        let mut policy = ScreeningPolicy::standard();
        policy
            .red_flags
            .retain(|rule| rule.flag != RedFlagKind::SevereHeadache);

        let err = policy.validate().expect_err("missing flag should fail");
        assert!(err.to_string().contains("severeHeadache"));
    }

    #[test]
    fn rejects_cauda_equina_flag_without_emergency() {
        for kind in CAUDA_EQUINA_FLAGS {
            let mut policy = ScreeningPolicy::standard();
            let rule = policy
                .red_flags
                .iter_mut()
                .find(|rule| rule.flag == kind)
                .unwrap();
            rule.forces_emergency = false;

            let err = policy.validate().expect_err("dropped hard trigger should fail");
            assert!(err.to_string().contains(&kind.to_string()));
        }
    }

    #[test]
    fn rejects_downgraded_cauda_equina_severity() {
        let mut policy = ScreeningPolicy::standard();
        let rule = policy
            .red_flags
            .iter_mut()
            .find(|rule| rule.flag == RedFlagKind::BladderBowelDysfunction)
            .unwrap();
        rule.severity = Severity::Medium;

        let err = policy.validate().expect_err("downgraded flag should fail");
        assert!(err.to_string().contains("bladderBowelDysfunction"));
    }

    #[test]
    fn follow_up_for_finds_rationale() {
        let policy = ScreeningPolicy::standard();
        let follow_up = policy
            .follow_up_for("Have you had imaging (X-ray/MRI) for this injury?")
            .expect("trauma follow-up should exist");
        assert_eq!(
            follow_up.why_it_matters.as_deref(),
            Some("Fracture exclusion required before manual therapy")
        );
        assert!(follow_up.impacts.contains(&ModalityClass::ManualTherapy));
        assert!(policy.follow_up_for("What is your favourite colour?").is_none());
    }

    #[test]
    fn rejects_non_increasing_thresholds() {
        let mut policy = ScreeningPolicy::standard();
        policy.urgency_thresholds.urgent = policy.urgency_thresholds.emergency;

        let err = policy.validate().expect_err("thresholds should fail");
        assert!(matches!(err, ScreeningError::InvalidPolicy(_)));
    }

    #[test]
    fn rejects_zero_moderate_threshold() {
        let mut policy = ScreeningPolicy::standard();
        policy.urgency_thresholds.moderate = 0;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_inverted_weights() {
        let mut policy = ScreeningPolicy::standard();
        policy.severity_weights.low = 7;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_missing_triage_label() {
        let mut policy = ScreeningPolicy::standard();
        policy.triage_labels.remove(&UrgencyLevel::Urgent);

        let err = policy.validate().expect_err("missing label should fail");
        assert!(err.to_string().contains("URGENT"));
    }

    #[test]
    fn rejects_modality_rule_that_does_not_restrict() {
        let mut policy = ScreeningPolicy::standard();
        policy.modality_rules[0].status = GateStatus::Safe;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn parse_runs_validation() {
        let mut policy = ScreeningPolicy::standard();
        policy.version = "  ".into();
        let yaml = serde_yaml::to_string(&policy).unwrap();

        let err = ScreeningPolicy::parse(&yaml).expect_err("blank version should fail");
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn load_reads_policy_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("policy.yaml");

        let mut policy = ScreeningPolicy::standard();
        policy.version = "clinic-review-2".into();
        std::fs::write(&path, policy.render().unwrap()).unwrap();

        let loaded = ScreeningPolicy::load(&path).expect("load policy");
        assert_eq!(loaded.version, "clinic-review-2");
    }

    #[test]
    fn load_reports_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = ScreeningPolicy::load(&temp_dir.path().join("absent.yaml"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ScreeningError::PolicyRead { .. }));
    }
}
