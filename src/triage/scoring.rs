//! Risk sub-scores for blood pressure, temperature and age.
//!
//! Bands are evaluated with `<` against the next band's lower edge, so
//! values falling between two published edges (e.g. 99.55°F) land in the
//! lower band.

use super::vitals::BloodPressure;

/// Temperature at or above which a patient has a fever.
pub const FEVER_THRESHOLD_F: f64 = 99.6;

/// Total score at or above which a patient is high risk.
pub const HIGH_RISK_THRESHOLD: u8 = 4;

/// Blood-pressure score: the worse of the systolic and diastolic bands.
pub fn blood_pressure_score(bp: BloodPressure) -> u8 {
    systolic_band(bp.systolic).max(diastolic_band(bp.diastolic))
}

fn systolic_band(systolic: f64) -> u8 {
    if systolic < 120.0 {
        0
    } else if systolic < 130.0 {
        1
    } else if systolic < 140.0 {
        2
    } else {
        3
    }
}

// Diastolic has no "elevated" band; it jumps straight to stage 1.
fn diastolic_band(diastolic: f64) -> u8 {
    if diastolic < 80.0 {
        0
    } else if diastolic < 90.0 {
        2
    } else {
        3
    }
}

pub fn temperature_score(temp_f: f64) -> u8 {
    if temp_f < FEVER_THRESHOLD_F {
        0
    } else if temp_f < 101.0 {
        1
    } else {
        2
    }
}

pub fn age_score(age: f64) -> u8 {
    if age < 40.0 {
        0
    } else if age <= 65.0 {
        1
    } else {
        2
    }
}
