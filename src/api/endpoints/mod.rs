//! API endpoint handlers.

pub mod assessment;
pub mod health;
