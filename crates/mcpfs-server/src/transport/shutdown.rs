//! Signal-driven shutdown
//!
//! Rocket's own signal handling is disabled (see
//! [`rocket_figment`](super::rocket_figment)). On SIGINT or SIGTERM every
//! session is closed first, then Rocket is told to stop.

use std::sync::Arc;

use rocket::{Build, Rocket};
use tracing::{error, info};

use crate::session::{SessionTable, SessionTransport};

/// Wait for SIGINT, SIGTERM or SIGQUIT (Ctrl+C elsewhere)
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigquit = signal(SignalKind::quit())?;
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
            _ = sigquit.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

/// Launch `rocket`, closing every session in `sessions` on shutdown
pub async fn launch_with_shutdown<T: SessionTransport>(
    rocket: Rocket<Build>,
    sessions: Arc<SessionTable<T>>,
    binding: &'static str,
) -> anyhow::Result<()> {
    let rocket = rocket
        .ignite()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start {} server: {}", binding, e))?;
    let shutdown = rocket.shutdown();

    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(()) => {
                info!(sessions = ?sessions.ids(), "Shutting down {} server...", binding);
                let report = sessions.close_all().await;
                info!(
                    closed = report.closed,
                    failed = report.failed,
                    "{} server shutdown complete",
                    binding
                );
                shutdown.notify();
            }
            Err(e) => error!(
                error = %e,
                "Shutdown signal handler failed; server will continue running"
            ),
        }
    });

    rocket
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("{} server failed: {}", binding, e))?;
    Ok(())
}
