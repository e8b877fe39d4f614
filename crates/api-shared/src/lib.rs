//! # API Shared
//!
//! Shared wire types for BioTrack APIs.
//!
//! Contains:
//! - Request/response bodies with OpenAPI schemas (`wire` module)
//! - Translation between core domain types and wire types
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; the core crate stays free of HTTP and schema concerns.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
