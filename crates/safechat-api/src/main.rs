//! SafeChat API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p safechat-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use safechat_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting SafeChat API Server...");

    let config = AppConfig::from_env().inspect_err(|e| {
        error!(error = %e, "Failed to load configuration");
    })?;

    info!(
        env = ?config.app.env,
        port = config.api.port,
        store = if config.database.url.is_some() { "postgres" } else { "memory" },
        "Configuration loaded"
    );

    safechat_api::run(config).await?;

    Ok(())
}
