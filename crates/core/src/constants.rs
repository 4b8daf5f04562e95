//! Constants used throughout the BPR core crate.

/// Version string of the built-in screening policy table.
pub const STANDARD_POLICY_VERSION: &str = "bpr-screening-2026.1";

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name for screening records storage.
pub const SCREENING_DIR_NAME: &str = "screening";

/// Filename for a patient's screening record.
pub const SCREENING_FILENAME: &str = "screening.yaml";

/// Suffix for a screening record that is still being written.
pub const PARTIAL_WRITE_SUFFIX: &str = "partial";
