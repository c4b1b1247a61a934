//! Telebridge Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Loaded from a TOML file (`--config`, `~/.config/telebridge/config.toml`,
//! `/etc/telebridge/config.toml` or `./config.toml`) with environment
//! variable overrides:
//! - `TELEBRIDGE_API_HOST` / `TELEBRIDGE_API_PORT`
//! - `TELEBRIDGE_MQTT_HOST` / `TELEBRIDGE_MQTT_PORT`
//! - `TELEBRIDGE_TOPIC_PREFIX`
//! - `TELEBRIDGE_MQTT_USERNAME` / `TELEBRIDGE_MQTT_PASSWORD`
//! - `TELEBRIDGE_AUTH_USERNAME` / `TELEBRIDGE_AUTH_PASSWORD`
//! - `TELEBRIDGE_SESSION_SECRET`
//! - `TELEBRIDGE_LOG_LEVEL` / `TELEBRIDGE_LOG_FORMAT`
//! - `RUST_LOG` overrides the log filter entirely

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telebridge::api::{serve, AppState};
use telebridge::bus::{BusRouter, CommandPublisher};
use telebridge::config::Config;
use telebridge::devices::DeviceStore;
use telebridge::stream::StreamHub;

#[derive(Parser, Debug)]
#[command(author, version, about = "Real-time IoT telemetry bridge")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config);

    tracing::info!("Starting Telebridge v{}", env!("CARGO_PKG_VERSION"));
    if config.auth.secret == "change-me" {
        tracing::warn!(
            "using the default session secret; set TELEBRIDGE_SESSION_SECRET in production"
        );
    }

    let config = Arc::new(config);

    // Composition root: the store and hub are owned here and injected
    // everywhere else.
    let store = Arc::new(DeviceStore::new());
    let hub = Arc::new(StreamHub::new(Arc::clone(&store)));

    let router = BusRouter::new(
        Arc::clone(&store),
        Arc::clone(&hub),
        config.bus.topic_prefix.clone(),
    );
    let bus_status = router.status();
    let (client, bus_task) = router.start(&config.bus);

    let commands = CommandPublisher::new(
        client,
        Arc::clone(&bus_status),
        config.bus.topic_prefix.clone(),
    );

    let state = AppState::new(Arc::clone(&config), store, hub, commands, bus_status);

    serve(state, &config.api).await?;

    // The bus task runs until the process stops; tear it down with the server.
    bus_task.abort();
    tracing::info!("Telebridge stopped");

    Ok(())
}

/// Initialize tracing from the logging config
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "telebridge={},tower_http=info",
            config.logging.level
        ))
    });

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
