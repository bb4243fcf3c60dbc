use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;

use super::error::FetchError;
use crate::models::PatientRecord;

/// Header carrying the upstream API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// One decoded page of patients.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPage {
    pub records: Vec<PatientRecord>,
    /// `pagination.hasNext` when the upstream wraps the list, else `None`.
    pub has_next: Option<bool>,
}

/// HTTP client for the upstream clinical-data API.
///
/// Cheap to clone: `reqwest::Client` is reference-counted.
#[derive(Clone)]
pub struct ClinicalApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl ClinicalApiClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn network_error(&self, e: reqwest::Error) -> String {
        if e.is_connect() {
            format!("cannot connect to {}", self.base_url)
        } else if e.is_timeout() {
            format!("request timed out after {}s", self.timeout_secs)
        } else {
            e.to_string()
        }
    }

    /// One attempt at one page. No retries here; the fetcher owns the policy.
    pub async fn get_page(&self, page: u32, limit: u32) -> Result<PatientPage, FetchError> {
        let response = self
            .client
            .get(self.endpoint("/api/patients"))
            .query(&[("page", page), ("limit", limit)])
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| FetchError::Network(self.network_error(e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(self.network_error(e)))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                retry_after: retry_after_hint(&body, &headers),
            });
        }
        if (500..=503).contains(&status.as_u16()) {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_page_body(&body)
    }
}

/// Extract the record list from a page body.
///
/// Accepts a bare list or an object with a list under `data`. Entries that
/// are not objects are kept as empty records so the classifier can flag
/// them rather than silently dropping a patient.
pub fn parse_page_body(body: &str) -> Result<PatientPage, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("body is not JSON: {e}")))?;

    let (items, has_next) = match value {
        Value::Array(items) => (items, None),
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => {
                let has_next = map
                    .get("pagination")
                    .and_then(|p| p.get("hasNext"))
                    .and_then(Value::as_bool);
                (items, has_next)
            }
            Some(_) => {
                return Err(FetchError::MalformedResponse(
                    "`data` field is not a list".into(),
                ))
            }
            None => {
                return Err(FetchError::MalformedResponse(
                    "object body has no `data` field".into(),
                ))
            }
        },
        _ => {
            return Err(FetchError::MalformedResponse(
                "body is neither a list nor an object".into(),
            ))
        }
    };

    let records = items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Unreadable patient entry kept as empty record");
                PatientRecord::default()
            })
        })
        .collect();

    Ok(PatientPage { records, has_next })
}

/// Seconds to wait, from the JSON body's `retry_after` or the `Retry-After` header.
fn retry_after_hint(body: &str, headers: &HeaderMap) -> Option<f64> {
    let from_body = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("retry_after").cloned())
        .and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        });

    let from_header = || {
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
    };

    from_body
        .or_else(from_header)
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
}
