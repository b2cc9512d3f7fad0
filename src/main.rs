//! Fleet Telemetry Service
//!
//! Records per-agent voice call telemetry in a remote key-value store and
//! serves aggregate views over it:
//! - Arbitrary agent events and completed-call events
//! - Named counters
//! - Per-agent call performance and fleet-wide event counts

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use fleet_store::{health::check_connection, KeyValueStore, RestStore, StoreConfig, StoreSettings, TelemetryStore};
use observability::init_tracing_from_env;

/// Application configuration.
///
/// Store credentials are not part of it; they come from
/// `UPSTASH_REDIS_REST_URL` and `UPSTASH_REDIS_REST_TOKEN`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    store: StoreSettings,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store: StoreSettings::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Fleet Telemetry v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    // Missing credentials stop startup here rather than on first request
    let store_config = StoreConfig::from_env()
        .context("Remote store is not configured")?
        .with_settings(config.store.clone());
    info!(url = %store_config.url, "Loaded store config");

    let store: Arc<dyn KeyValueStore> =
        Arc::new(RestStore::new(&store_config).context("Failed to create store client")?);

    // An unreachable store does not stop startup; writes report failure instead
    if !check_connection(store.as_ref()).await {
        error!("Store unreachable at startup");
    }

    let telemetry =
        TelemetryStore::new(store).with_fetch_concurrency(config.store.fetch_concurrency);
    let app = router(AppState::new(telemetry));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // e.g. FLEET__PORT, FLEET__STORE__FETCH_CONCURRENCY
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("FLEET")
                .prefix_separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
