//! Upstream clinical-data API: paginated patient acquisition with bounded
//! retries, and assessment submission.

pub mod backoff;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod submit;

#[cfg(test)]
pub(crate) mod mock;

pub use backoff::{RetryPolicy, Sleeper, TokioSleeper};
pub use client::{ClinicalApiClient, PatientPage, API_KEY_HEADER};
pub use error::{FetchError, FetchErrorKind, SubmitError};
pub use fetcher::PatientFetcher;
pub use submit::SubmitResponse;
