// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crescent serve` command implementation.
//!
//! Opens the configured backend, serves the HTTP API until SIGINT or
//! SIGTERM, then flushes and closes the backend.

use tracing::{info, warn};

use crescent_config::CrescentConfig;
use crescent_core::CrescentError;
use crescent_gateway::{GatewayState, ServerConfig, start_server};

use crate::backend::Backend;

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                    _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                ctrl_c.await;
                info!("received SIGINT (Ctrl+C), initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("received Ctrl+C, initiating shutdown");
    }
}

/// Runs the `crescent serve` command.
pub async fn run_serve(config: CrescentConfig) -> Result<(), CrescentError> {
    info!("starting crescent serve");

    let backend = Backend::open(&config.storage).await?;
    let server = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let served = match &backend {
        Backend::Embedded(storage) => {
            let state = GatewayState::with_settings(storage.clone());
            start_server(&server, state, shutdown_signal()).await
        }
        Backend::Relational(storage) => {
            start_server(&server, GatewayState::new(storage.clone()), shutdown_signal()).await
        }
    };

    // Flush even if the server failed.
    let closed = backend.shutdown().await;
    served?;
    closed?;
    info!("crescent serve shutdown complete");
    Ok(())
}
