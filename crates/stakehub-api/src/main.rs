//! StakeHub API server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p stakehub-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use stakehub_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.api.port,
        "Configuration loaded"
    );

    stakehub_api::run(config).await?;

    Ok(())
}
