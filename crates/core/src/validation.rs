//! Input validation utilities.
//!
//! Checks applied to externally supplied values before they are used to derive storage paths.

use crate::{ScreeningError, ScreeningResult};

/// Minimum length of a patient identifier.
pub const MIN_PATIENT_ID_LEN: usize = 8;
/// Maximum length of a patient identifier.
pub const MAX_PATIENT_ID_LEN: usize = 64;

/// Validates that a patient identifier is safe to use as a directory name.
///
/// Identifiers are issued by the clinic platform, not by this service, so the check is purely
/// syntactic:
/// - between [`MIN_PATIENT_ID_LEN`] and [`MAX_PATIENT_ID_LEN`] bytes
/// - only `a-z`, `0-9`, `-` and `_`
///
/// The character set excludes `/`, `.` and uppercase letters, so an identifier can never escape the
/// storage root and two spellings of one identifier cannot map to different directories.
///
/// # Errors
///
/// Returns a `ScreeningError::InvalidInput` naming the problem.
pub fn validate_patient_id(input: &str) -> ScreeningResult<()> {
    if input.trim().is_empty() {
        return Err(ScreeningError::InvalidInput(
            "patient id cannot be empty".into(),
        ));
    }

    if input.len() < MIN_PATIENT_ID_LEN || input.len() > MAX_PATIENT_ID_LEN {
        return Err(ScreeningError::InvalidInput(format!(
            "patient id must be between {} and {} characters, got {}",
            MIN_PATIENT_ID_LEN,
            MAX_PATIENT_ID_LEN,
            input.len()
        )));
    }

    let ok = input
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'-' | b'_'));

    if !ok {
        return Err(ScreeningError::InvalidInput(format!(
            "patient id contains invalid characters (only lowercase alphanumeric, '-', '_' allowed): '{}'",
            input
        )));
    }

    Ok(())
}
