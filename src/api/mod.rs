//! # Admin HTTP API
//!
//! JSON endpoints for reading and editing the admin settings, triggering
//! connectivity checks and reading the check history.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

#[cfg(test)]
pub mod test_utils;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::start_api_server;
