use std::path::PathBuf;
use std::time::Duration;

use gforge_paths::{GforgePaths, PathError};

/// Server-side configuration for the IPC facade.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Unix socket the facade listens on.
    pub socket_path: PathBuf,
    /// PID file guarding against a second daemon instance.
    pub pid_path: PathBuf,
    /// Read deadline on idle connections; each expiry re-checks the
    /// shutdown token so a silent client cannot wedge shutdown.
    pub read_deadline: Duration,
}

impl DaemonConfig {
    pub fn resolve() -> Result<Self, PathError> {
        Ok(Self::from_paths(&GforgePaths::resolve()?))
    }

    pub fn from_paths(paths: &GforgePaths) -> Self {
        Self {
            socket_path: paths.daemon_socket(),
            pid_path: paths.daemon_pid_file(),
            read_deadline: Duration::from_secs(5),
        }
    }
}
