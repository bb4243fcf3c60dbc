use serde::Serialize;
use serde_json::Value;

use super::client::{ClinicalApiClient, API_KEY_HEADER};
use super::error::SubmitError;
use crate::models::AlertSets;

/// Upstream answer to a submission, passed through untouched.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub status: u16,
    pub body: Value,
}

/// Parse a body as JSON, falling back to a JSON string of the raw text.
pub fn body_to_value(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

impl ClinicalApiClient {
    /// `POST /api/submit-assessment` with the alert sets. Not retried.
    pub async fn submit_assessment(
        &self,
        alerts: &AlertSets,
    ) -> Result<SubmitResponse, SubmitError> {
        let response = self
            .http()
            .post(self.endpoint("/api/submit-assessment"))
            .header(API_KEY_HEADER, self.api_key())
            .json(alerts)
            .send()
            .await
            .map_err(|e| SubmitError::Network(self.network_error(e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| SubmitError::Network(self.network_error(e)))?;

        if !(200..300).contains(&status) {
            tracing::warn!(status, "Assessment submission rejected");
            return Err(SubmitError::Upstream { status, body: text });
        }

        tracing::info!(status, "Assessment submitted");
        Ok(SubmitResponse {
            status,
            body: body_to_value(text),
        })
    }
}
