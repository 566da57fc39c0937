use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("Another daemon is already running (pid {0})")]
    AlreadyRunning(u32),

    #[error("Failed to bind socket at {path}: {source}")]
    BindFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Coordinator error: {source}")]
    Coordinator {
        #[from]
        source: gforge_core::CoordinatorError,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
