pub mod connection;
pub mod shutdown;

use std::path::Path;
use std::sync::Arc;

use gforge_core::Coordinator;
use tokio::net::UnixListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::errors::DaemonError;
use crate::pid;
use crate::types::DaemonConfig;

/// Run the IPC facade server until SIGTERM/SIGINT.
///
/// 1. Checks for an existing daemon (PID file) and writes its own
/// 2. Binds the Unix socket (clearing a stale socket file first)
/// 3. Accepts client connections in a loop
/// 4. Handles graceful shutdown on SIGTERM/SIGINT
pub async fn run_server(
    coordinator: Arc<Coordinator>,
    config: DaemonConfig,
) -> Result<(), DaemonError> {
    let shutdown = CancellationToken::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown::wait_for_shutdown_signal(signal_shutdown).await {
            error!(
                event = "daemon.server.signal_handler_failed",
                error = %e,
                "SIGTERM/SIGINT will not trigger graceful shutdown"
            );
        }
    });

    run_server_with_shutdown(coordinator, config, shutdown).await
}

/// Run the server with an externally-owned shutdown token. Tests use this to
/// stop the accept loop deterministically.
pub async fn run_server_with_shutdown(
    coordinator: Arc<Coordinator>,
    config: DaemonConfig,
    shutdown: CancellationToken,
) -> Result<(), DaemonError> {
    if let Some(existing_pid) = pid::check_daemon_running(&config.pid_path) {
        return Err(DaemonError::AlreadyRunning(existing_pid));
    }
    pid::write_pid_file(&config.pid_path)?;

    // Clean up stale socket file
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    if let Some(parent) = config.socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let listener = UnixListener::bind(&config.socket_path).map_err(|e| DaemonError::BindFailed {
        path: config.socket_path.clone(),
        source: e,
    })?;

    info!(
        event = "daemon.server.started",
        pid = std::process::id(),
        socket = %config.socket_path.display(),
    );

    loop {
        tokio::select! {
            accept = listener.accept() => {
                match accept {
                    Ok((stream, _addr)) => {
                        let coordinator = coordinator.clone();
                        let shutdown_token = shutdown.clone();
                        let read_deadline = config.read_deadline;
                        tokio::spawn(connection::handle_connection(
                            stream,
                            coordinator,
                            shutdown_token,
                            read_deadline,
                        ));
                    }
                    Err(e) => {
                        error!(
                            event = "daemon.server.accept_failed",
                            error = %e,
                        );
                    }
                }
            }
            _ = shutdown.cancelled() => {
                info!(event = "daemon.server.shutdown_started");
                break;
            }
        }
    }

    cleanup(&config.pid_path, &config.socket_path);
    info!(event = "daemon.server.shutdown_completed");
    Ok(())
}

fn cleanup(pid_path: &Path, socket_path: &Path) {
    pid::remove_pid_file(pid_path);
    if socket_path.exists()
        && let Err(e) = std::fs::remove_file(socket_path)
    {
        error!(
            event = "daemon.server.socket_cleanup_failed",
            error = %e,
        );
    }
}
