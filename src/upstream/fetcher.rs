//! Paginated acquisition of the full patient list.
//!
//! Pages are requested strictly in order. Each page request gets its own
//! retry budget; a page that exhausts it aborts the run and every record
//! gathered so far is dropped.

use tokio_util::sync::CancellationToken;

use super::backoff::{RetryPolicy, Sleeper, TokioSleeper};
use super::client::{ClinicalApiClient, PatientPage};
use super::error::FetchError;
use crate::models::PatientRecord;

pub struct PatientFetcher<S = TokioSleeper> {
    client: ClinicalApiClient,
    policy: RetryPolicy,
    sleeper: S,
}

impl PatientFetcher<TokioSleeper> {
    pub fn new(client: ClinicalApiClient, policy: RetryPolicy) -> Self {
        Self::with_sleeper(client, policy, TokioSleeper)
    }
}

impl<S: Sleeper> PatientFetcher<S> {
    pub fn with_sleeper(client: ClinicalApiClient, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            client,
            policy,
            sleeper,
        }
    }

    pub fn client(&self) -> &ClinicalApiClient {
        &self.client
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch every page until an empty or short page.
    ///
    /// Either all records are returned in pagination order, or an error is.
    pub async fn fetch_all_patients(
        &self,
        page_size: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<PatientRecord>, FetchError> {
        let page_size = page_size.max(1);
        let mut patients = Vec::new();
        let mut page = 1;

        loop {
            let PatientPage { records, has_next } =
                self.fetch_page(page, page_size, cancel).await?;
            let count = records.len();
            tracing::debug!(page, count, ?has_next, "Fetched patient page");
            patients.extend(records);

            if count > page_size as usize {
                tracing::warn!(
                    page,
                    count,
                    limit = page_size,
                    "Upstream returned more records than requested"
                );
            }
            if count < page_size as usize {
                if has_next == Some(true) {
                    tracing::warn!(
                        page,
                        count,
                        limit = page_size,
                        "Short page but upstream reports more; it may cap the page size"
                    );
                }
                break;
            }
            page += 1;
        }

        tracing::info!(pages = page, patients = patients.len(), "Patient list fetched");
        Ok(patients)
    }

    /// One page, with bounded retries on transient failures.
    async fn fetch_page(
        &self,
        page: u32,
        limit: u32,
        cancel: &CancellationToken,
    ) -> Result<PatientPage, FetchError> {
        let mut retry_count = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }

            let attempt = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                result = self.client.get_page(page, limit) => result,
            };

            let err = match attempt {
                Ok(fetched) => return Ok(fetched),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            if retry_count >= self.policy.max_retries {
                tracing::error!(
                    page,
                    attempts = retry_count + 1,
                    error = %err,
                    "Page retries exhausted"
                );
                return Err(FetchError::RetriesExhausted {
                    page,
                    attempts: retry_count + 1,
                    last: Box::new(err),
                });
            }

            let delay = self.policy.delay_for(&err, retry_count);
            tracing::warn!(
                page,
                retry = retry_count + 1,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying patient page"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                _ = self.sleeper.sleep(delay) => {}
            }
            retry_count += 1;
        }
    }
}
