//! HTTP server lifecycle.
//!
//! On SIGINT or SIGTERM the listener stops accepting connections and
//! in-flight requests get the configured grace period to finish. Background
//! work (emails, the rate limit sweep, metrics upkeep) is then drained before
//! [`serve`] returns. Failing to drain within the grace period is an error.

use std::net::SocketAddr;

use anyhow::{Context, bail};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::metrics::spawn_upkeep;
use crate::router::init_router;
use crate::state::AppState;

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.server_config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let shutdown = CancellationToken::new();
    state
        .rate_limiter
        .spawn_sweeper(&state.background, shutdown.clone());
    if let Some(handle) = state.metrics.clone() {
        spawn_upkeep(handle, &state.background, shutdown.clone());
    }

    let app = init_router(state.clone()).into_make_service_with_connect_info::<SocketAddr>();
    let server_shutdown = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await
    });

    info!(
        addr = %addr,
        env = %state.server_config.environment,
        "starting server"
    );

    tokio::select! {
        result = &mut server => {
            shutdown.cancel();
            result.context("server task failed")?.context("server error")?;
            bail!("server stopped unexpectedly");
        }
        signal = shutdown_signal() => {
            info!(signal, "shutting down server");
        }
    }

    shutdown.cancel();
    let grace = state.server_config.shutdown_grace;
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => result.context("server task failed")?.context("server error")?,
        Err(_) => {
            server.abort();
            bail!("in-flight requests did not finish within {grace:?}");
        }
    }

    info!(pending = state.background.len(), "completing background tasks");
    state.background.shutdown().await;

    info!(addr = %addr, "stopped server");
    Ok(())
}

/// Resolves with the name of the first shutdown signal received.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "SIGINT",
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGINT");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                "SIGTERM"
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    }
}
