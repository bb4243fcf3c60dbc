use serde::Serialize;

use super::scoring::{
    age_score, blood_pressure_score, temperature_score, FEVER_THRESHOLD_F, HIGH_RISK_THRESHOLD,
};
use super::vitals::ParsedVitals;
use crate::models::{AlertSets, PatientRecord};

/// Scoring breakdown for a single patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientAssessment {
    pub patient_id: String,
    pub blood_pressure_score: u8,
    pub temperature_score: u8,
    pub age_score: u8,
    pub total_score: u8,
    pub high_risk: bool,
    pub fever: bool,
    pub data_quality_issue: bool,
}

/// Score one record. Invalid fields contribute 0 and raise the
/// data-quality flag; they never abort scoring.
pub fn assess_patient(record: &PatientRecord) -> PatientAssessment {
    let vitals = ParsedVitals::from_record(record);

    let bp = vitals.blood_pressure.map(blood_pressure_score).unwrap_or(0);
    let temp = vitals.temperature.map(temperature_score).unwrap_or(0);
    let age = vitals.age.map(age_score).unwrap_or(0);
    let total = bp + temp + age;

    PatientAssessment {
        patient_id: record.identifier(),
        blood_pressure_score: bp,
        temperature_score: temp,
        age_score: age,
        total_score: total,
        high_risk: total >= HIGH_RISK_THRESHOLD,
        fever: vitals.temperature.is_some_and(|t| t >= FEVER_THRESHOLD_F),
        data_quality_issue: vitals.has_invalid_field(),
    }
}

/// Build fresh alert sets from a full patient list.
pub fn classify(patients: &[PatientRecord]) -> AlertSets {
    patients
        .iter()
        .map(assess_patient)
        .fold(AlertSets::new(), |mut alerts, assessment| {
            tracing::trace!(
                patient_id = %assessment.patient_id,
                total = assessment.total_score,
                "Patient scored"
            );
            if assessment.high_risk {
                alerts.high_risk_patients.insert(assessment.patient_id.clone());
            }
            if assessment.fever {
                alerts.fever_patients.insert(assessment.patient_id.clone());
            }
            if assessment.data_quality_issue {
                alerts.data_quality_issues.insert(assessment.patient_id);
            }
            alerts
        })
}
