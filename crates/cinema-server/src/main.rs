use tracing::info;
use tracing_subscriber::EnvFilter;

use cinema_server::api::{self, AppState};
use cinema_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cinema_server=debug,tower_http=debug")),
        )
        .init();

    info!("Starting cinema catalog server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if !config.admin_enabled() {
        tracing::warn!("ADMIN_EMAIL / ADMIN_PASSWORD not set; admin writes will be rejected");
    }

    let http_addr = config.http_addr;
    let app_state = AppState::new(config);

    // -----------------------------------------------------------------------
    // 3. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
