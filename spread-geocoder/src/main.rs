//! spread-geocoder - store-location enrichment service
//!
//! Serves the upload / progress / download web form by default; the `enrich`
//! subcommand runs the same pipeline headless on a local file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spread_common::config::{ConfigOverrides, ServiceConfig, TomlConfig};
use spread_common::events::EventBus;
use spread_common::logging::{self, LogFilterHandle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spread_geocoder::services::{
    assign_ids, parse_locations, to_pretty_json, EnrichmentPipeline, EnrichmentSettings,
    GoogleMapsClient, DOWNLOAD_FILE_NAME,
};
use spread_geocoder::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "spread-geocoder", version, about = "Enrich store locations with Google Maps data")]
struct Cli {
    /// TOML config file (default: <config dir>/spread-geocoder/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Google Maps API key (overrides environment and config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Pause after every Maps API call, in milliseconds
    #[arg(long, global = true)]
    api_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the web form (default)
    Serve {
        /// Address to listen on (host:port)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Enrich a location file without the web form
    Enrich {
        /// JSON list of locations
        input: PathBuf,

        /// Where to write the enriched list
        #[arg(short, long, default_value = DOWNLOAD_FILE_NAME)]
        output: PathBuf,
    },
}

fn init_tracing() -> LogFilterHandle {
    let (filter, handle) = logging::startup_filter();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    handle
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Subscriber first so config-loading warnings are visible
    let log_filter = init_tracing();

    info!(
        "Starting spread-geocoder v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml_config = TomlConfig::load_or_default(cli.config.as_deref())?;

    logging::apply_config_level(&log_filter, &toml_config.logging.level)?;

    let bind = match &cli.command {
        Some(Commands::Serve { bind }) => bind.clone(),
        _ => None,
    };
    let config = ServiceConfig::resolve(
        &toml_config,
        ConfigOverrides {
            api_key: cli.api_key,
            api_delay_ms: cli.api_delay_ms,
            bind_address: bind,
        },
    )?;
    info!(?config, "Configuration resolved");

    let maps = GoogleMapsClient::new(config.api_key.clone())
        .context("Failed to create Google Maps client")?;
    let settings = EnrichmentSettings {
        api_delay: config.api_delay,
        country: config.country.clone(),
    };
    let pipeline = EnrichmentPipeline::new(Arc::new(maps), &settings);

    match cli.command {
        Some(Commands::Enrich { input, output }) => enrich_file(&pipeline, &input, &output).await,
        Some(Commands::Serve { .. }) | None => serve(pipeline, &config).await,
    }
}

async fn serve(pipeline: EnrichmentPipeline, config: &ServiceConfig) -> Result<()> {
    let bind_address = config.bind_address.as_str();
    let event_bus = EventBus::new(100);
    let state = AppState::new(pipeline, event_bus).with_session_ttl(config.session_ttl);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn enrich_file(pipeline: &EnrichmentPipeline, input: &Path, output: &Path) -> Result<()> {
    let bytes = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut records = parse_locations(&bytes)?;
    info!("Loaded {} locations from {}", records.len(), input.display());

    assign_ids(&mut records);

    let (enriched, summary) = pipeline
        .enrich_batch(records, |progress| {
            info!("{}", progress.status_line());
            std::future::ready(())
        })
        .await;
    info!("Processing complete.");

    let body = to_pretty_json(&enriched)?;
    tokio::fs::write(output, body)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        total = summary.total,
        geocoded = summary.geocoded,
        places_matched = summary.places_matched,
        "Location data written to {}",
        output.display()
    );

    Ok(())
}
