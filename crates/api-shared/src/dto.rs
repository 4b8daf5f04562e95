//! Request and response bodies for the REST API.
//!
//! Core types are embedded as-is and documented as free-form objects in the OpenAPI schema.

use bpr_core::{ClinicalAnalysis, ScreeningInput, ScreeningPolicy, ScreeningRecord};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// `?patientId=` query parameter.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PatientQuery {
    pub patient_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeScreeningRes {
    pub success: bool,
    pub patient_id: String,
    pub patient_name: String,
    /// RFC 3339 time of the last submission.
    pub screening_completed_at: String,
    #[schema(value_type = Object)]
    pub analysis: ClinicalAnalysis,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScreeningReq {
    /// Required for staff submitting on behalf of a patient; patients may omit it.
    #[serde(default)]
    pub patient_id: Option<String>,
    pub patient_name: String,
    #[schema(value_type = Object)]
    pub screening: ScreeningInput,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScreeningRes {
    pub success: bool,
    #[schema(value_type = Object)]
    pub record: ScreeningRecord,
    #[schema(value_type = Object)]
    pub analysis: ClinicalAnalysis,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetScreeningRes {
    pub success: bool,
    #[schema(value_type = Object)]
    pub record: ScreeningRecord,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRes {
    pub version: String,
    #[schema(value_type = Object)]
    pub policy: ScreeningPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_accepts_camel_case_without_patient_id() {
        let json = r#"{
            "patientName": "Jane Citizen",
            "screening": { "cancerHistory": true, "consentGiven": true }
        }"#;

        let req: SubmitScreeningReq = serde_json::from_str(json).unwrap();
        assert_eq!(req.patient_id, None);
        assert!(req.screening.cancer_history);
        assert!(req.screening.consent_given);
    }
}
