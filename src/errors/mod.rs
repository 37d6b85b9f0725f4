//! # Error Handling
//!
//! Error types for the catalog admin service.

pub mod types;

pub use types::{AdminError, Result};
