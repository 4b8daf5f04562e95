//! Caller authentication.
//!
//! Sessions are handled by the upstream gateway, which forwards the authenticated user as
//! `x-user-id` and `x-user-role` headers alongside the shared `x-api-key`. This module turns those
//! raw values into a [`Caller`] and answers access questions about it.

use std::str::FromStr;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("invalid API key")]
    InvalidApiKey,
    #[error("missing caller identity")]
    MissingIdentity,
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Therapist,
    Patient,
}

impl Role {
    /// Clinic staff may read and analyse any patient's screening.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Therapist)
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ADMIN" => Ok(Role::Admin),
            "THERAPIST" => Ok(Role::Therapist),
            "PATIENT" => Ok(Role::Patient),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// An authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Staff may access any patient; patients only their own record.
    pub fn can_access(&self, patient_id: &str) -> bool {
        self.is_staff() || self.user_id == patient_id
    }
}

/// Validates the provided API key against the key configured at startup.
///
/// When no key is configured every caller passes; this is the development default.
pub fn validate_api_key(provided: Option<&str>, expected: Option<&str>) -> Result<(), AuthError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    match provided {
        None => Err(AuthError::MissingApiKey),
        Some(key) if key == expected => Ok(()),
        Some(_) => Err(AuthError::InvalidApiKey),
    }
}

/// Builds a [`Caller`] from gateway header values.
///
/// # Errors
///
/// Returns an [`AuthError`] if the API key check fails, either identity header is missing or
/// blank, or the role is not one of `ADMIN`, `THERAPIST`, `PATIENT`.
pub fn authenticate(
    api_key: Option<&str>,
    user_id: Option<&str>,
    role: Option<&str>,
    expected_api_key: Option<&str>,
) -> Result<Caller, AuthError> {
    validate_api_key(api_key, expected_api_key)?;

    let user_id = user_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(AuthError::MissingIdentity)?;
    let role = role.ok_or(AuthError::MissingIdentity)?.parse::<Role>()?;

    Ok(Caller {
        user_id: user_id.to_string(),
        role,
    })
}
