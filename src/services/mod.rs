//! Business logic services
//!
//! This module contains the connectivity checks and the probes they use to
//! reach external services, separated from HTTP concerns.

pub mod connectivity;
pub mod database_probe;
pub mod search_probe;

pub use connectivity::{ConnectivityService, Recording, SEARCH_NOT_CONFIGURED};
pub use database_probe::{DatabaseProbe, MySqlProbe, ProbeConnection};
pub use search_probe::{AlgoliaClient, SearchClientConfig, SearchProbe};
