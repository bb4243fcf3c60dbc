//! Lenient parsing of the three scored vitals.
//!
//! Each field is parsed on its own; a failure in one never blocks the
//! others. `None` means the field is invalid for scoring.

use serde_json::Value;

use crate::models::PatientRecord;

/// Systolic over diastolic, both finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

/// Vitals derived from one record, discarded after scoring.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParsedVitals {
    pub blood_pressure: Option<BloodPressure>,
    pub temperature: Option<f64>,
    pub age: Option<f64>,
}

impl ParsedVitals {
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            blood_pressure: record.blood_pressure.as_ref().and_then(parse_blood_pressure),
            temperature: record.temperature.as_ref().and_then(parse_number),
            age: record.age.as_ref().and_then(parse_number),
        }
    }

    /// True if any scored field failed to parse.
    pub fn has_invalid_field(&self) -> bool {
        self.blood_pressure.is_none() || self.temperature.is_none() || self.age.is_none()
    }
}

/// A JSON number, or a string holding a finite number.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_finite(s)?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// A string of the exact form `"S/D"`.
pub fn parse_blood_pressure(value: &Value) -> Option<BloodPressure> {
    let s = value.as_str()?;
    let mut parts = s.split('/');
    let systolic = parse_finite(parts.next()?)?;
    let diastolic = parse_finite(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(BloodPressure {
        systolic,
        diastolic,
    })
}

fn parse_finite(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64 parsing accepts "inf" and "NaN"; those are not vitals.
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_parse_directly() {
        assert_eq!(parse_number(&json!(45)), Some(45.0));
        assert_eq!(parse_number(&json!(99.6)), Some(99.6));
    }

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(parse_number(&json!("101.2")), Some(101.2));
        assert_eq!(parse_number(&json!(" 40 ")), Some(40.0));
    }

    #[test]
    fn non_numeric_values_are_invalid() {
        assert_eq!(parse_number(&json!("TEMP_ERROR")), None);
        assert_eq!(parse_number(&json!("")), None);
        assert_eq!(parse_number(&json!(null)), None);
        assert_eq!(parse_number(&json!(true)), None);
        assert_eq!(parse_number(&json!([98.6])), None);
    }

    #[test]
    fn non_finite_strings_are_invalid() {
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!("inf")), None);
        assert_eq!(parse_number(&json!("-Infinity")), None);
    }

    #[test]
    fn blood_pressure_parses_exact_shape() {
        let bp = parse_blood_pressure(&json!("150/95")).unwrap();
        assert_eq!(bp.systolic, 150.0);
        assert_eq!(bp.diastolic, 95.0);
    }

    #[test]
    fn blood_pressure_rejects_missing_sides() {
        assert!(parse_blood_pressure(&json!("150/")).is_none());
        assert!(parse_blood_pressure(&json!("/90")).is_none());
        assert!(parse_blood_pressure(&json!("150")).is_none());
    }

    #[test]
    fn blood_pressure_rejects_extra_separator() {
        assert!(parse_blood_pressure(&json!("120/80/60")).is_none());
    }

    #[test]
    fn blood_pressure_rejects_non_numeric_and_non_string() {
        assert!(parse_blood_pressure(&json!("INVALID")).is_none());
        assert!(parse_blood_pressure(&json!("N/A")).is_none());
        assert!(parse_blood_pressure(&json!("not-a-number")).is_none());
        assert!(parse_blood_pressure(&json!(120)).is_none());
        assert!(parse_blood_pressure(&json!(null)).is_none());
    }

    #[test]
    fn vitals_from_record_are_independent() {
        let record = PatientRecord {
            patient_id: Some(json!("DEMO003")),
            age: Some(json!(52)),
            temperature: Some(json!("TEMP_ERROR")),
            blood_pressure: Some(json!("130/85")),
            ..Default::default()
        };

        let vitals = ParsedVitals::from_record(&record);
        assert_eq!(vitals.age, Some(52.0));
        assert_eq!(vitals.temperature, None);
        assert!(vitals.blood_pressure.is_some());
        assert!(vitals.has_invalid_field());
    }

    #[test]
    fn missing_fields_are_invalid() {
        let vitals = ParsedVitals::from_record(&PatientRecord::default());
        assert_eq!(vitals, ParsedVitals::default());
        assert!(vitals.has_invalid_field());
    }
}
