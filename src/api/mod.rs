//! HTTP API for the triage service.
//!
//! Exposes assessment runs, the cached last result, and submission as
//! JSON endpoints under `/api/`. `triage_api_router()` returns a `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::triage_api_router;
pub use server::{start_server_on, ServerSession, TriageApiServer};
pub use types::ApiContext;
