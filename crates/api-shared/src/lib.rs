//! # API Shared
//!
//! Shared utilities and definitions for Wardview's outer surfaces.
//!
//! Contains:
//! - Shared services like `HealthService`
//! - Session extraction from request headers (usable by any HTTP surface)
//!
//! Used by `api-rest` and the `wardview-run` binary.

pub mod auth;
pub mod health;

pub use auth::{session_from_headers, SessionHeaderError};
pub use health::{HealthRes, HealthService};
