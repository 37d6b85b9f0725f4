//! # Command Line Interface
//!
//! `serve` runs the admin API; `check` runs one connectivity check against the
//! stored settings and prints the result as JSON.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use crate::errors::Result;
use crate::services::{ConnectivityService, Recording};
use crate::storage::SettingsRepository;

#[derive(Parser, Debug)]
#[command(name = "catalog-admin")]
#[command(about = "Catalog admin connectivity dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the admin HTTP API (default)
    Serve,

    /// Run a connectivity check once; exits non-zero when it fails
    Check {
        /// Which check to run
        #[arg(value_enum)]
        target: CheckTarget,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CheckTarget {
    Database,
    Search,
    All,
}

/// Outcome of a CLI check run
#[derive(Debug)]
pub struct CheckReport {
    pub ok: bool,
    pub body: Value,
}

/// Run `target` against the stored settings, recording to the check history
/// exactly as the HTTP endpoints do.
pub async fn run_check(
    target: CheckTarget,
    settings: &dyn SettingsRepository,
    connectivity: &ConnectivityService,
) -> Result<CheckReport> {
    let settings = settings.get().await?;

    let report = match target {
        CheckTarget::Database => {
            let result = connectivity
                .run_database_check(
                    &settings.database_name,
                    &settings.database_tables,
                    Recording::Record,
                )
                .await?;
            CheckReport { ok: result.ok, body: serde_json::to_value(&result)? }
        }
        CheckTarget::Search => {
            let result =
                connectivity.run_search_check(&settings.search_index_name, Recording::Record).await?;
            CheckReport { ok: result.ok, body: serde_json::to_value(&result)? }
        }
        CheckTarget::All => {
            let result = connectivity.run_all(&settings).await?;
            CheckReport { ok: result.ok(), body: serde_json::to_value(&result)? }
        }
    };

    Ok(report)
}
