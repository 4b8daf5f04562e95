//! Patient identifiers and sharded-path utilities.
//!
//! Patient identifiers are issued by the clinic platform. This service never allocates them; it
//! validates what it is given and derives a storage location from it.
//!
//! ## Canonical form
//! - Length: 8 to 64 bytes
//! - Characters: `a-z`, `0-9`, `-`, `_`
//! - Example: `clx8k2m9p0000abcd`
//!
//! Non-canonical values (uppercase, path separators, dots, whitespace) are rejected rather than
//! normalised.
//!
//! ## Sharded directory layout
//! For an identifier `p`, screening data lives under:
//! `parent_dir/<p[0..2]>/<p[2..4]>/<p>/`
//!
//! Example:
//! `patient_data/screening/cl/x8/clx8k2m9p0000abcd/`
//!
//! This keeps the fan-out of any single directory small.

use crate::error::{ScreeningError, ScreeningResult};
use crate::validation::validate_patient_id;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// A validated patient identifier.
///
/// Once constructed, the contained string is guaranteed canonical, so it is safe to use as a
/// directory name and to shard.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientId(String);

impl PatientId {
    /// Validates an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ScreeningError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> ScreeningResult<Self> {
        validate_patient_id(input)?;
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/`, where `s1` and `s2` are the first two pairs of
    /// characters of the identifier.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let s1 = &self.0[0..2];
        let s2 = &self.0[2..4];
        parent_dir.join(s1).join(s2).join(&self.0)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PatientId {
    type Err = ScreeningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientId::parse(s)
    }
}

impl TryFrom<String> for PatientId {
    type Error = ScreeningError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_patient_id(&value)?;
        Ok(Self(value))
    }
}

impl From<PatientId> for String {
    fn from(id: PatientId) -> Self {
        id.0
    }
}
