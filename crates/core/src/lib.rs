//! # BioTrack Core
//!
//! Core business logic for BioTrack treatment tracking.
//!
//! This crate contains pure data operations:
//! - Treatment records, validation and the status state machine
//! - The treatment timeline model (range, tracks, axis markers, events, bar positions)
//! - A JSON-file treatment store
//!
//! **No API concerns**: HTTP servers, OpenAPI schemas and CLI parsing belong in `api-rest`,
//! `api-shared` and `biotrack-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod id;
pub mod lenient;
pub mod repositories;
pub mod timeline;
pub mod treatment;
pub mod validation;

pub use config::CoreConfig;
pub use constants::*;
pub use error::{RecordError, TrackerError, TrackerResult};
pub use id::TreatmentId;
pub use repositories::treatments::{NewTreatment, TreatmentStore};
pub use timeline::{
    build_timeline, Timeline, TimelineData, TimelineOptions, TrackGrouping, ZoomLevel,
};
pub use treatment::{
    AntibioticType, StatusChange, TreatmentPeriod, TreatmentRecord, TreatmentStatus,
};
