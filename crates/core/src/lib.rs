//! # BPR Core
//!
//! Core business logic for the BPR medical screening service.
//!
//! This crate contains the clinical risk analysis engine and pure data operations:
//! - Red-flag detection, risk scoring, modality gating and follow-up generation
//! - The versioned screening policy those stages read
//! - Screening storage in sharded YAML files under `PATIENT_DATA_DIR`
//!
//! **No API concerns**: Authentication, HTTP servers, or service interfaces belong in `api-rest`
//! or `api-shared`.

pub mod clinical;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod patient_id;
pub mod policy;
pub mod repositories;
pub mod screening;
pub mod validation;

pub use bpr_types::{NonEmptyText, TextError};
pub use config::CoreConfig;
pub use engine::{analyze_medical_screening, ClinicalAnalysis, ScreeningEngine};
pub use error::{ScreeningError, ScreeningResult};
pub use patient_id::PatientId;
pub use policy::ScreeningPolicy;
pub use repositories::screening::{ScreeningRecord, ScreeningService};
pub use screening::{RedFlagKind, ScreeningInput};
