//! # Configuration Management
//!
//! Environment-driven configuration for the catalog admin service.

pub mod settings;

pub use settings::{
    ApiServerConfig, AppConfig, ClusterCredentials, DatabaseConfig, ObservabilityConfig,
    SearchCredentials,
};
