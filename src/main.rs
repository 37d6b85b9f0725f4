use std::sync::Arc;

use anyhow::Context;
use catalog_admin::{
    api::{start_api_server, ApiState},
    cli::{run_check, Cli, Commands},
    config::AppConfig,
    observability::{init_logging, log_config_info},
    services::{AlgoliaClient, ConnectivityService, MySqlProbe, SearchClientConfig, SearchProbe},
    storage::{create_pool, SqlxSettingsRepository, SqlxTestLogRepository},
    APP_NAME, VERSION,
};
use clap::Parser;
use tracing::{info, warn};

fn install_rustls_provider() {
    use rustls::crypto::{ring, CryptoProvider};

    if CryptoProvider::get_default().is_none() {
        // Losing the race to another installer is fine.
        let _ = ring::default_provider().install_default();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    install_rustls_provider();

    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    init_logging(&config.observability)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting catalog admin");
    log_config_info(&config);

    let pool = create_pool(&config.database, &config.cluster)
        .context("Failed to configure database pool")?;

    let settings_repository = Arc::new(SqlxSettingsRepository::new(
        pool.clone(),
        config.cluster.default_database_name(),
    ));
    let log_repository = Arc::new(SqlxTestLogRepository::new(pool.clone()));

    let database_probe =
        Arc::new(MySqlProbe::new(config.cluster.clone(), config.database.connect_timeout()));
    let search_probe =
        AlgoliaClient::from_credentials(&config.search, SearchClientConfig::default())?
            .map(|client| Arc::new(client) as Arc<dyn SearchProbe>);
    if search_probe.is_none() {
        warn!("Search credentials are not configured; search checks will report failure");
    }

    let connectivity =
        ConnectivityService::new(log_repository.clone(), database_probe, search_probe);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let state = ApiState::new(settings_repository, log_repository, connectivity);
            start_api_server(&config.api, state).await?;
            pool.close().await;
        }
        Commands::Check { target } => {
            let report = run_check(target, settings_repository.as_ref(), &connectivity).await?;
            println!("{}", serde_json::to_string_pretty(&report.body)?);
            pool.close().await;

            if !report.ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
