use std::sync::Arc;

use gforge_core::{Coordinator, CoreConfig, init_logging};
use gforge_daemon::server::run_server;
use gforge_daemon::types::DaemonConfig;
use tracing::{error, warn};

#[tokio::main]
async fn main() {
    init_logging();

    let core_config = match CoreConfig::resolve() {
        Ok(config) => config,
        Err(e) => {
            error!(event = "daemon.main.config_failed", error = %e);
            std::process::exit(2);
        }
    };
    let daemon_config = match DaemonConfig::resolve() {
        Ok(config) => config,
        Err(e) => {
            error!(event = "daemon.main.config_failed", error = %e);
            std::process::exit(2);
        }
    };

    let coordinator = match Coordinator::with_defaults(core_config) {
        Ok(coordinator) => Arc::new(coordinator),
        Err(e) => {
            error!(event = "daemon.main.coordinator_failed", error = %e);
            std::process::exit(2);
        }
    };

    // Orphan reconciliation: mark goblins whose session or worktree vanished
    // while no coordinator was running. Never deletes records.
    if let Err(e) = coordinator.reconcile() {
        warn!(
            event = "daemon.main.startup_reconcile_failed",
            error = %e,
            "Continuing with possibly stale statuses"
        );
    }

    if let Err(e) = run_server(coordinator, daemon_config).await {
        error!(event = "daemon.main.server_failed", error = %e);
        std::process::exit(3);
    }
}
