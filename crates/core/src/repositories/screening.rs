//! Patient screening storage.
//!
//! Each patient has at most one current screening, stored as YAML in a sharded directory:
//!
//! ```text
//! screening/
//!   <s1>/
//!     <s2>/
//!       <patient_id>/
//!         screening.yaml
//! ```
//!
//! Submitting again replaces the stored answers but keeps the original submission time.
//! Each write goes to its own uniquely named `.partial` file in the patient directory and is
//! renamed into place, so readers never see a half-written record. Submissions through one service
//! are serialised, which keeps the first submission time when a patient submits twice at once.
//!
//! This module contains **only** data operations. Authentication and HTTP concerns belong in
//! `api-shared` and `api-rest`.

use crate::config::CoreConfig;
use crate::constants::{PARTIAL_WRITE_SUFFIX, SCREENING_FILENAME};
use crate::error::{ScreeningError, ScreeningResult};
use crate::patient_id::PatientId;
use crate::screening::ScreeningInput;
use bpr_types::NonEmptyText;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// A stored screening with its submission metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScreeningRecord {
    pub patient_id: PatientId,
    pub patient_name: NonEmptyText,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub screening: ScreeningInput,
}

/// Service for storing and reading patient screenings.
#[derive(Clone, Debug)]
pub struct ScreeningService {
    cfg: Arc<CoreConfig>,
    write_lock: Arc<Mutex<()>>,
}

impl ScreeningService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create or replace a patient's screening.
    ///
    /// The first submission sets `submitted_at`; later submissions keep it and bump `updated_at`.
    /// A stored record that can no longer be parsed is logged and overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError` if:
    /// - the patient directory cannot be created
    /// - the record cannot be serialised
    /// - the partial file cannot be created, written or renamed into place
    pub fn submit(
        &self,
        patient_id: &PatientId,
        patient_name: NonEmptyText,
        screening: ScreeningInput,
    ) -> ScreeningResult<ScreeningRecord> {
        let patient_dir = self.patient_dir(patient_id);
        fs::create_dir_all(&patient_dir).map_err(ScreeningError::StorageDirCreation)?;

        // Held across the read-modify-write of `submitted_at`. The lock guards no data, so poisoning
        // is ignored.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = match self.load(patient_id) {
            Ok(record) => record.map(|r| r.submitted_at),
            Err(e) => {
                tracing::warn!(
                    "replacing unreadable screening for patient {}: {}",
                    patient_id,
                    e
                );
                None
            }
        };

        let now = Utc::now();
        let record = ScreeningRecord {
            patient_id: patient_id.clone(),
            patient_name,
            submitted_at: previous.unwrap_or(now),
            updated_at: now,
            screening,
        };

        let yaml = serde_yaml::to_string(&record).map_err(ScreeningError::YamlSerialization)?;
        write_atomically(&patient_dir, SCREENING_FILENAME, &yaml)?;

        tracing::info!(
            "stored screening for patient {} ({})",
            patient_id,
            if previous.is_some() { "updated" } else { "created" }
        );

        Ok(record)
    }

    /// Load a patient's screening, or `None` if they have not submitted one.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::FileRead`] if the file exists but cannot be read, or
    /// [`ScreeningError::YamlDeserialization`] if it cannot be parsed.
    pub fn load(&self, patient_id: &PatientId) -> ScreeningResult<Option<ScreeningRecord>> {
        let path = self.patient_dir(patient_id).join(SCREENING_FILENAME);
        if !path.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(ScreeningError::FileRead)?;
        let record = parse_record(&contents)?;
        Ok(Some(record))
    }

    /// Lists every stored screening, ordered by patient id.
    ///
    /// Missing storage yields an empty list. Files that cannot be read or parsed are logged as
    /// warnings and skipped.
    pub fn list(&self) -> Vec<ScreeningRecord> {
        let mut records = Vec::new();

        let screening_dir = self.cfg.screening_dir();
        let s1_iter = match fs::read_dir(&screening_dir) {
            Ok(it) => it,
            Err(_) => return records,
        };

        for s1 in s1_iter.flatten().filter(|e| e.path().is_dir()) {
            let Ok(s2_iter) = fs::read_dir(s1.path()) else {
                continue;
            };

            for s2 in s2_iter.flatten().filter(|e| e.path().is_dir()) {
                let Ok(id_iter) = fs::read_dir(s2.path()) else {
                    continue;
                };

                for id_ent in id_iter.flatten() {
                    let record_path = id_ent.path().join(SCREENING_FILENAME);
                    if !record_path.is_file() {
                        continue;
                    }

                    let parsed = fs::read_to_string(&record_path)
                        .map_err(ScreeningError::FileRead)
                        .and_then(|contents| parse_record(&contents));
                    match parsed {
                        Ok(record) => records.push(record),
                        Err(e) => {
                            tracing::warn!(
                                "failed to load screening: {} - {}",
                                record_path.display(),
                                e
                            );
                        }
                    }
                }
            }
        }

        records.sort_by(|a, b| a.patient_id.cmp(&b.patient_id));
        records
    }

    fn patient_dir(&self, patient_id: &PatientId) -> PathBuf {
        patient_id.sharded_dir(&self.cfg.screening_dir())
    }
}

fn parse_record(contents: &str) -> ScreeningResult<ScreeningRecord> {
    serde_yaml::from_str(contents).map_err(ScreeningError::YamlDeserialization)
}

fn write_atomically(dir: &Path, filename: &str, contents: &str) -> ScreeningResult<()> {
    let mut partial = tempfile::Builder::new()
        .prefix(&format!("{filename}."))
        .suffix(&format!(".{PARTIAL_WRITE_SUFFIX}"))
        .tempfile_in(dir)
        .map_err(ScreeningError::FileWrite)?;

    partial
        .write_all(contents.as_bytes())
        .map_err(ScreeningError::FileWrite)?;
    partial
        .persist(dir.join(filename))
        .map_err(|e| ScreeningError::FileWrite(e.error))?;
    Ok(())
}
