//! Incident registry: the HTTP entry point.
//!
//! Loads configuration from a TOML file plus environment overrides,
//! initializes tracing, opens the record snapshot, creates the completion
//! client, sets up the Axum router and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use incident_registry::completion::AzureChatClient;
use incident_registry::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use incident_registry::http::start_server;
use incident_registry::records::{RecordStore, SharedRecords};
use incident_registry::routes::create_router;
use incident_registry::state::AppState;

/// Incident registry: victim records with a chat front end
#[derive(Parser, Debug)]
#[command(name = "incident-registry", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "incident_registry=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration comes first so the log format can be taken from it
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(config = %args.config, "Loaded configuration");

    let store = RecordStore::open(
        &config.storage.data_file,
        config.storage.tolerate_corrupt_snapshot,
    )?;
    let stats = store.stats();
    tracing::info!(
        path = %store.path().display(),
        deceased = stats.deceased,
        locations = stats.locations,
        patients = stats.patients,
        "Opened record store"
    );

    let completer = AzureChatClient::new(&config.completion)?;
    tracing::info!(
        deployment = config.completion.deployment.as_deref().unwrap_or_default(),
        "Initialized completion client"
    );

    let state = AppState::new(
        config.clone(),
        SharedRecords::new(store),
        Arc::new(completer),
    );
    let app = create_router(state);

    start_server(app, &config.http).await?;

    Ok(())
}
