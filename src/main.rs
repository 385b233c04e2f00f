//! CITY PULSE — Multi-source city dashboard and search chatbot
//!
//! Entry point. Loads configuration, initialises structured logging,
//! wires up the provider clients, and serves the dashboard with
//! graceful shutdown.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use citypulse::chatbot::ChatBot;
use citypulse::config::AppConfig;
use citypulse::providers::search::WebSearchClient;
use citypulse::server;
use citypulse::server::routes::ServerState;
use citypulse::snapshot::SnapshotBuilder;

const BANNER: &str = r#"
  ____ ___ _____ _   _   ____  _   _ _     ____  _____
 / ___|_ _|_   _| | | | |  _ \| | | | |   / ___|| ____|
| |    | |  | | | |_| | | |_) | | | | |   \___ \|  _|
| |___ | |  | | |  _  | |  __/| |_| | |___ ___) | |___
 \____|___| |_| |_| |_| |_|    \___/|_____|____/|_____|

  Weather, Air, Places, News and Trends for any city
  v0.1.0 — Dashboard + Chatbot
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        port = cfg.server.port,
        timeout_secs = cfg.request_timeout().as_secs(),
        "CITY PULSE starting up"
    );

    for (provider, configured) in [
        ("openweathermap", cfg.providers.openweather.resolve().is_some()),
        ("visualcrossing", cfg.providers.visualcrossing.resolve().is_some()),
        ("google-places", cfg.providers.google_places.resolve().is_some()),
        ("newsapi", cfg.providers.news.resolve().is_some()),
        ("google-search", cfg.providers.search.resolve_key().is_some()),
    ] {
        if configured {
            info!(provider, "API key configured");
        } else {
            warn!(provider, "No API key — sections from this provider will be absent");
        }
    }

    // -- Wire up components ----------------------------------------------

    let snapshots = SnapshotBuilder::from_config(&cfg)?;
    let chatbot = ChatBot::new(WebSearchClient::new(
        cfg.providers.search.resolve_key(),
        cfg.providers.search.resolve_cse_id(),
        cfg.request_timeout(),
    )?);

    let state = Arc::new(ServerState { snapshots, chatbot });

    server::run_server(state, cfg.server.port).await?;

    info!("CITY PULSE shut down cleanly.");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("citypulse=info"));

    let json_logging = std::env::var("CITYPULSE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
