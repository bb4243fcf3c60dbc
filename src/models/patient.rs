use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One patient record as returned by the upstream clinical API.
///
/// The upstream gives no guarantees about field types, so every field is
/// kept as a raw JSON value. A malformed field must never fail
/// deserialization of the record; it is flagged later by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<Value>,
}

impl PatientRecord {
    /// Opaque identifier used as the key in alert sets.
    ///
    /// Strings are used verbatim, numbers and booleans use their JSON text,
    /// anything absent or null becomes the empty string.
    pub fn identifier(&self) -> String {
        match &self.patient_id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}
