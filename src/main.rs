//! chitchatd - Chit Chat relay server
//!
//! Relays Lamport-stamped chat lines between every connected participant.

mod config;
mod error;
mod network;
mod state;
mod telemetry;

use crate::config::Config;
use crate::network::Gateway;
use crate::state::Relay;
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(path = %config_path, error = %e, "Invalid config");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        server = %config.server.name,
        address = %config.listen.address,
        outbound_queue = config.limits.outbound_queue,
        max_frame_bytes = config.limits.max_frame_bytes,
        "Starting chitchatd"
    );

    let relay = Arc::new(Relay::new(config.server.name.clone()));
    let gateway = Gateway::bind(config.listen.address, config.limits.clone(), Arc::clone(&relay))
        .await
        .with_context(|| format!("failed to bind {}", config.listen.address))?;

    tokio::select! {
        result = gateway.run() => result?,
        result = shutdown_signal() => {
            result?;
            info!(
                participants = relay.registry().len(),
                lamport = relay.clock().current(),
                "Shutting down"
            );
        }
    }

    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to register SIGTERM handler")?;

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to register Ctrl+C handler")?;
                info!("Received Ctrl+C");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to register Ctrl+C handler")?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
