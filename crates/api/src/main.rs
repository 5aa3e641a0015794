use anyhow::Context;

use mailgate_api::app::{build_app, Backends};
use mailgate_api::config::GatewayConfig;
use mailgate_api::server::{self, ConnectionLimits};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mailgate_observability::init();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    let backends = Backends::connect(&config).context("failed to build backend clients")?;
    let app = build_app(&config, backends);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        auth = %config.auth_url,
        profile = %config.profile_url,
        messages = %config.messages_url,
        "gateway listening"
    );

    server::serve(listener, app, ConnectionLimits::from(&config), shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
