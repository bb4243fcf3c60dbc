//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Response headers (`Cache-Control: no-store`), applied in the router
//! 2. Request logger — method, path, status, latency

pub mod request_log;
