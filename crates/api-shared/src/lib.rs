//! # API Shared
//!
//! Shared utilities and definitions for BPR APIs.
//!
//! Contains:
//! - Request and response types (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//! - Caller authentication from gateway-forwarded identity headers
//!
//! Used by `api-rest` and the `bpr-run` binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{authenticate, AuthError, Caller, Role};
pub use dto::*;
pub use health::HealthService;
