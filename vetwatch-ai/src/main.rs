//! vetwatch-ai - Veterinary monitoring service
//!
//! Serves the form engine, media analysis, alerts, messaging and user
//! directory to the VetWatch dashboard over HTTP + SSE.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vetwatch_common::config::{default_config_path, resolve_port, TomlConfig};
use vetwatch_common::events::EventBus;

use vetwatch_ai::config::VisionSettings;
use vetwatch_ai::store::StoreSnapshot;
use vetwatch_ai::vision::{AnalysisService, ChatCompletionsClient, FfmpegFrameExtractor};
use vetwatch_ai::AppState;

/// Event bus buffer before lagging SSE clients start dropping events
const EVENT_BUS_CAPACITY: usize = 100;

#[derive(Parser, Debug)]
#[command(version, about = "VetWatch analysis and dashboard backend")]
struct Args {
    /// Port to listen on (overrides VETWATCH_PORT and the TOML file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to vetwatch-ai.toml (default: <config_dir>/vetwatch/vetwatch-ai.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before logging is installed; its own warnings are replayed below
    let config_path = args.config.clone().or_else(default_config_path);
    let config_missing = config_path.as_ref().map(|p| !p.exists()).unwrap_or(true);

    let toml_config = TomlConfig::load_or_default(config_path.as_deref());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting vetwatch-ai");
    info!("Version: {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));
    match &config_path {
        Some(path) if !config_missing => info!("Config: {}", path.display()),
        Some(path) => info!("Config: {} not found, using defaults", path.display()),
        None => info!("Config: no config folder on this platform, using defaults"),
    }

    let port = resolve_port(args.port, &toml_config);

    let settings = VisionSettings::resolve(&toml_config);
    info!("Vision endpoint: {} (model {})", settings.api_url, settings.model);

    let backend = ChatCompletionsClient::new(settings).context("Failed to build vision API client")?;
    let analysis = AnalysisService::new(Arc::new(backend), Arc::new(FfmpegFrameExtractor::new()));

    let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
    info!("Event bus initialized");

    let state = AppState::new(StoreSnapshot::default(), event_bus, analysis);
    let app = vetwatch_ai::build_router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
