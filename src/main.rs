//! # Trip Search Server Main Driver
//!
//! ## Purpose
//! Main entry point for the trip-search backend. Loads configuration, wires
//! the extractor, catalog and engine together, and starts the web server.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, environment variables
//! - **Output**: Running web server with the conversational search API
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Build the extractor and catalog clients
//! 4. Start the web API server
//! 5. Handle shutdown signals gracefully

use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trip_search::{
    api::ApiServer,
    catalog::HttpCatalog,
    config::Config,
    engine::TripSearchEngine,
    errors::{Result, TripSearchError},
    extraction::OpenAiExtractor,
    AppState,
};

/// Conversational trip-search backend
#[derive(Debug, Parser)]
#[command(name = "trip-search-server", version, about)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    config: String,

    /// Server port override
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Run health checks and exit
    #[arg(long)]
    check_health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_file(&cli.config)?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    let config = Arc::new(config);

    init_logging(&config)?;

    info!("Starting trip-search server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", cli.config);

    let app_state = initialize_components(config.clone())?;

    if cli.check_health {
        return run_health_checks(&app_state).await;
    }

    let server = ApiServer::new(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Server error: {}", e);
        }
    });

    info!(
        "Trip-search server started on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = server_handle => {
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Trip-search server shut down");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|_| TripSearchError::Config {
            message: format!("Invalid log level: {}", config.logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    info!("Logging initialized with level: {}", config.logging.level);
    Ok(())
}

/// Build the extractor, catalog and engine
fn initialize_components(config: Arc<Config>) -> Result<AppState> {
    info!("Initializing application components...");

    if config.extractor.api_key.is_none() {
        warn!("No extractor API key configured; extraction calls will be unauthenticated");
    }

    let extractor = Arc::new(OpenAiExtractor::new(config.extractor.clone())?);
    let catalog = Arc::new(HttpCatalog::new(config.catalog.clone())?);
    let engine = Arc::new(TripSearchEngine::new(extractor, catalog));

    info!("All components initialized");
    Ok(AppState { config, engine })
}

/// Run health checks and report the outcome
async fn run_health_checks(app_state: &AppState) -> Result<()> {
    info!("Running health checks...");

    app_state.engine.health_check().await?;
    info!(
        "Catalog backend '{}' is reachable",
        app_state.engine.catalog_name()
    );
    info!(
        "Extractor '{}' is configured",
        app_state.engine.extractor_name()
    );

    info!("All health checks passed");
    Ok(())
}
