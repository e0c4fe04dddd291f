//! tidalnetd - a TS6-style linked IRC server.

mod config;
mod error;
mod handlers;
mod network;
mod security;
mod state;
mod sync;

use crate::config::Config;
use crate::network::Gateway;
use crate::state::ServerCore;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Resolve the configuration path from CLI arguments.
/// Supports `-c <path>`, `--config <path>`, or a bare path.
/// Falls back to `config.toml` when no argument is provided.
fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);

    match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => args.next().unwrap_or_else(|| {
            eprintln!("Missing path after {flag}");
            std::process::exit(1);
        }),
        Some(path) => path,
        None => "config.toml".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = resolve_config_path();

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("ERROR: failed to load config from {config_path}: {e}");
        e
    })?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true).init();

    if let Err(errors) = crate::config::validate(&config) {
        for err in &errors {
            error!(error = %err, "configuration validation failed");
        }
        return Err(anyhow::anyhow!("configuration validation failed with {} error(s)", errors.len()));
    }

    info!(server = %config.server.name, sid = %config.sid(), "starting tidalnetd");

    let listen_addr = config.server.listen.clone();
    let linking_enabled = config.linking.enabled;
    let peers = config.linking.peers.clone();

    let core = Arc::new(ServerCore::new(config));
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
            let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = sigint.recv() => info!("received SIGINT, shutting down"),
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            }
            let _ = shutdown_tx.send(());
        });
    }

    if linking_enabled {
        for peer in peers.into_iter().filter(|p| p.auto_connect) {
            let core = core.clone();
            tokio::spawn(async move {
                sync::connection::connect_outbound(core, peer).await;
            });
        }
    }

    let gateway = Gateway::bind(&listen_addr, core.clone(), shutdown_tx).await?;
    gateway.run().await;

    info!("gateway stopped");
    Ok(())
}
