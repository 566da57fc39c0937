use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Wait for SIGTERM or SIGINT, then cancel the shutdown token.
pub async fn wait_for_shutdown_signal(shutdown: CancellationToken) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            info!(event = "daemon.server.sigterm_received");
        }
        _ = sigint.recv() => {
            info!(event = "daemon.server.sigint_received");
        }
    }

    shutdown.cancel();
    Ok(())
}
