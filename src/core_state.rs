//! Shared state for the HTTP host layer.
//!
//! `CoreState` owns the configured fetcher and the single-slot store of
//! the last successful assessment. Handlers reach it through `ApiContext`.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{AlertCounts, AlertSets};
use crate::triage;
use crate::upstream::{ClinicalApiClient, FetchError, PatientFetcher, SubmitError, SubmitResponse};

/// Outcome of one fully successful acquisition and classification.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentRun {
    pub run_id: Uuid,
    /// RFC 3339, UTC.
    pub completed_at: String,
    pub patients_fetched: usize,
    pub counts: AlertCounts,
    pub alerts: AlertSets,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Patient acquisition failed: {0}")]
    Acquisition(#[from] FetchError),
    #[error("No assessment has been computed yet")]
    NoPriorResult,
    #[error("Assessment submission failed: {0}")]
    Submission(#[from] SubmitError),
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("Internal lock error")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// LastResultStore — single slot, replaced whole
// ═══════════════════════════════════════════════════════════

/// Holds the most recent successful assessment. Writers swap the whole
/// `Arc`, so readers never see a half-written result.
#[derive(Default)]
pub struct LastResultStore {
    slot: RwLock<Option<Arc<AssessmentRun>>>,
}

impl LastResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Result<Option<Arc<AssessmentRun>>, CoreError> {
        let guard = self.slot.read().map_err(|_| CoreError::LockPoisoned)?;
        Ok(guard.clone())
    }

    pub fn replace(&self, run: Arc<AssessmentRun>) -> Result<(), CoreError> {
        let mut guard = self.slot.write().map_err(|_| CoreError::LockPoisoned)?;
        *guard = Some(run);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    fetcher: PatientFetcher,
    page_size: u32,
    acquisition_timeout: Duration,
    last_result: LastResultStore,
}

impl CoreState {
    pub fn new(fetcher: PatientFetcher, page_size: u32, acquisition_timeout: Duration) -> Self {
        Self {
            fetcher,
            page_size,
            acquisition_timeout,
            last_result: LastResultStore::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let client = ClinicalApiClient::new(
            &config.upstream_url,
            &config.api_key,
            config.request_timeout_secs,
        )?;
        let fetcher = PatientFetcher::new(client, config.retry_policy());
        Ok(Self::new(fetcher, config.page_size, config.acquisition_timeout))
    }

    /// Fetch every patient, classify, and store the result.
    ///
    /// A failed run leaves the previous result untouched. The run is
    /// cancelled once the acquisition timeout elapses.
    pub async fn run_assessment(&self) -> Result<Arc<AssessmentRun>, CoreError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, page_size = self.page_size, "Assessment run started");

        let cancel = CancellationToken::new();
        let fetched = until_deadline(
            self.fetcher.fetch_all_patients(self.page_size, &cancel),
            self.acquisition_timeout,
            &cancel,
        )
        .await;

        let patients = fetched.map_err(|e| {
            tracing::error!(%run_id, kind = ?e.kind(), error = %e, "Assessment run failed");
            e
        })?;

        let alerts = triage::classify(&patients);
        let run = Arc::new(AssessmentRun {
            run_id,
            completed_at: chrono::Utc::now().to_rfc3339(),
            patients_fetched: patients.len(),
            counts: alerts.counts(),
            alerts,
        });
        self.last_result.replace(run.clone())?;

        tracing::info!(
            %run_id,
            patients = run.patients_fetched,
            high_risk = run.counts.high_risk,
            fever = run.counts.fever,
            data_quality = run.counts.data_quality,
            "Assessment run complete"
        );
        Ok(run)
    }

    pub fn latest_assessment(&self) -> Result<Option<Arc<AssessmentRun>>, CoreError> {
        self.last_result.get()
    }

    /// Submit the most recent successful assessment upstream.
    pub async fn submit_latest(&self) -> Result<SubmitResponse, CoreError> {
        let run = self.latest_assessment()?.ok_or(CoreError::NoPriorResult)?;
        tracing::info!(run_id = %run.run_id, "Submitting assessment");
        Ok(self.fetcher.client().submit_assessment(&run.alerts).await?)
    }
}

/// Drive `work` to completion, cancelling `cancel` once `timeout` elapses.
///
/// After the deadline `work` is still awaited so it can observe the token
/// and unwind. Nothing is spawned, so dropping the returned future drops
/// the timer with it.
async fn until_deadline<F, T>(work: F, timeout: Duration, cancel: &CancellationToken) -> T
where
    F: Future<Output = T>,
{
    tokio::pin!(work);
    tokio::select! {
        biased;
        out = &mut work => out,
        _ = tokio::time::sleep(timeout) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Acquisition deadline reached"
            );
            cancel.cancel();
            work.await
        }
    }
}
