use tokio::signal;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal as unix_signal};
#[cfg(unix)]
use tracing::warn;
use tracing::{error, info};

/// Why the run loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupt,
    Terminate,
    Deadline,
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_signal() -> StopReason {
    let mut sigterm = match unix_signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            warn!("Failed to create SIGTERM handler, listening for Ctrl+C only: {}", err);
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        reason = wait_for_ctrl_c() => reason,
        _ = sigterm.recv() => {
            info!("Received SIGTERM, initiating shutdown");
            StopReason::Terminate
        }
    }
}

/// Resolves on SIGINT (Ctrl+C).
#[cfg(not(unix))]
pub async fn wait_for_signal() -> StopReason {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> StopReason {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received SIGINT (Ctrl+C), initiating shutdown"),
        Err(err) => {
            error!("Failed to listen for SIGINT: {}", err);
            // Without a signal source only the deadline can stop the run.
            std::future::pending::<()>().await;
        }
    }
    StopReason::Interrupt
}
