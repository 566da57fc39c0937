use crate::errors::GforgeError;

#[derive(Debug, thiserror::Error)]
pub enum TmuxError {
    #[error("Session '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("Session '{name}' not found")]
    NotFound { name: String },

    #[error("Working directory does not exist: {path}")]
    BadPath { path: String },

    #[error("tmux {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("tmux '{operation}' exceeded the {seconds}s wall-clock limit")]
    Timeout { operation: String, seconds: u64 },

    #[error("IO error during tmux operation: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl GforgeError for TmuxError {
    fn error_code(&self) -> &'static str {
        match self {
            TmuxError::AlreadyExists { .. } => "SESSION_ALREADY_EXISTS",
            TmuxError::NotFound { .. } => "SESSION_NOT_FOUND",
            TmuxError::BadPath { .. } => "SESSION_BAD_PATH",
            TmuxError::CommandFailed { .. } => "TMUX_COMMAND_FAILED",
            TmuxError::Timeout { .. } => "TMUX_TIMEOUT",
            TmuxError::IoError { .. } => "TMUX_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            TmuxError::AlreadyExists { .. }
                | TmuxError::NotFound { .. }
                | TmuxError::BadPath { .. }
        )
    }
}
