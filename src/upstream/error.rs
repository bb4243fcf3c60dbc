use serde::Serialize;
use thiserror::Error;

/// Failure of a single page request or of a whole acquisition run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Upstream rate limit hit (retry_after: {retry_after:?})")]
    RateLimited { retry_after: Option<f64> },

    #[error("Upstream server error (status {status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Upstream returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Page {page} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        page: u32,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("Patient acquisition cancelled")]
    Cancelled,
}

/// Coarse failure class, used for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    RateLimited,
    ServerError,
    MalformedResponse,
    Network,
    Http,
    Cancelled,
}

impl FetchError {
    /// Whether the bounded retry policy applies to this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::ServerError { .. } | Self::MalformedResponse(_)
        )
    }

    /// Failure class. For exhausted retries this is the class of the last cause.
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::RateLimited { .. } => FetchErrorKind::RateLimited,
            Self::ServerError { .. } => FetchErrorKind::ServerError,
            Self::MalformedResponse(_) => FetchErrorKind::MalformedResponse,
            Self::Network(_) => FetchErrorKind::Network,
            Self::Http { .. } => FetchErrorKind::Http,
            Self::RetriesExhausted { last, .. } => last.kind(),
            Self::Cancelled => FetchErrorKind::Cancelled,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }
}

/// Failure of the assessment submission call.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Upstream unreachable: {0}")]
    Network(String),

    #[error("Upstream rejected submission (status {status}): {body}")]
    Upstream { status: u16, body: String },
}
