// Agent Gateway binary
//
// Serves the health-check and tool-execution endpoints until Ctrl-C, then
// drains in-flight requests.

use agent_gateway::server::Server;
use agent_gateway::services::GatewayConfig;
use agent_gateway::{version, AppBuilder};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG wins; default to info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // .env.local overrides .env (loaded by GatewayConfig::from_env)
    if dotenvy::from_filename(".env.local").is_ok() {
        tracing::debug!("Loaded .env.local");
    }

    tracing::info!("Starting {}", version::full_version_info());

    let config = GatewayConfig::from_env().context("Failed to load gateway configuration")?;
    let bind_addr = config.bind_addr;

    let api = AppBuilder::new()
        .with_config(config)
        .build_async()
        .await
        .context("Failed to build gateway")?;

    let server = Server::start(api, bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", server.addr());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    tracing::info!("Shutting down");
    server.stop().await;
    Ok(())
}
