//! Deterministic risk classification of fetched patient records.
//!
//! `classify` is pure: it reads the records, scores each one and builds
//! fresh `AlertSets`. Malformed per-patient fields are reported through
//! the data-quality set, never as errors.

pub mod classify;
pub mod scoring;
pub mod vitals;

pub use classify::{assess_patient, classify, PatientAssessment};
pub use scoring::{age_score, blood_pressure_score, temperature_score};
pub use vitals::{BloodPressure, ParsedVitals};
