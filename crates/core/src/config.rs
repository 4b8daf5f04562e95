//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Request handling never reads process-wide environment variables,
//! which keeps behaviour consistent across threads and test harnesses.

use crate::constants::SCREENING_DIR_NAME;
use crate::policy::ScreeningPolicy;
use crate::ScreeningResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    policy: Arc<ScreeningPolicy>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ScreeningError::InvalidPolicy`] if `policy` fails validation.
    pub fn new(patient_data_dir: PathBuf, policy: ScreeningPolicy) -> ScreeningResult<Self> {
        policy.validate()?;

        Ok(Self {
            patient_data_dir,
            policy: Arc::new(policy),
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    pub fn screening_dir(&self) -> PathBuf {
        self.patient_data_dir.join(SCREENING_DIR_NAME)
    }

    pub fn policy(&self) -> &ScreeningPolicy {
        &self.policy
    }
}

/// Resolve the screening policy without reading environment variables.
///
/// With an override path the file is loaded and validated; otherwise the built-in table is used.
pub fn resolve_policy(override_path: Option<PathBuf>) -> ScreeningResult<ScreeningPolicy> {
    match override_path {
        Some(path) => ScreeningPolicy::load(&path),
        None => {
            tracing::info!("using built-in screening policy");
            Ok(ScreeningPolicy::standard())
        }
    }
}

/// Interpret an optional environment value as a policy path.
///
/// `None` and empty/whitespace values mean "no override".
pub fn policy_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
