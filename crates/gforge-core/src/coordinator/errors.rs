use gforge_git::GitError;
use gforge_protocol::ErrorCode;

use crate::errors::GforgeError;
use crate::goblins::StoreError;
use crate::tmux::TmuxError;

/// The coordinator's error taxonomy. Every variant carries a single-line
/// human string (via `Display`) and maps to a machine-readable wire code.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("No goblin, session, or agent named '{name}'")]
    NotFound { name: String },

    #[error("Goblin '{name}' already exists; pick another name or kill it first")]
    AlreadyExists { name: String },

    #[error("Invalid input: {message}")]
    BadInput { message: String },

    #[error("Branch '{branch}' is already checked out by another worktree: {message}")]
    BranchBusy { branch: String, message: String },

    #[error("Substrate failure: {message}")]
    SubstrateFailure { message: String },

    #[error("Operation '{operation}' exceeded the {seconds}s wall-clock limit")]
    Timeout { operation: String, seconds: u64 },

    #[error(
        "Goblin '{name}' was only partially removed ({message}); retry kill to finish cleanup"
    )]
    CleanupPending { name: String, message: String },

    #[error("Goblin store failure: {source}")]
    StoreFailure {
        #[from]
        source: StoreError,
    },
}

impl CoordinatorError {
    /// The wire code the IPC facade reports for this error.
    pub fn wire_code(&self) -> ErrorCode {
        match self {
            CoordinatorError::NotFound { .. } => ErrorCode::NotFound,
            CoordinatorError::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            CoordinatorError::BadInput { .. } => ErrorCode::BadInput,
            CoordinatorError::BranchBusy { .. } => ErrorCode::BranchBusy,
            CoordinatorError::SubstrateFailure { .. } => ErrorCode::SubstrateFailure,
            CoordinatorError::Timeout { .. } => ErrorCode::Timeout,
            CoordinatorError::CleanupPending { .. } => ErrorCode::CleanupPending,
            CoordinatorError::StoreFailure { .. } => ErrorCode::StoreFailure,
        }
    }
}

impl GforgeError for CoordinatorError {
    fn error_code(&self) -> &'static str {
        match self {
            CoordinatorError::NotFound { .. } => "GOBLIN_NOT_FOUND",
            CoordinatorError::AlreadyExists { .. } => "GOBLIN_ALREADY_EXISTS",
            CoordinatorError::BadInput { .. } => "BAD_INPUT",
            CoordinatorError::BranchBusy { .. } => "BRANCH_BUSY",
            CoordinatorError::SubstrateFailure { .. } => "SUBSTRATE_FAILURE",
            CoordinatorError::Timeout { .. } => "TIMEOUT",
            CoordinatorError::CleanupPending { .. } => "CLEANUP_PENDING",
            CoordinatorError::StoreFailure { .. } => "STORE_FAILURE",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoordinatorError::NotFound { .. }
                | CoordinatorError::AlreadyExists { .. }
                | CoordinatorError::BadInput { .. }
                | CoordinatorError::BranchBusy { .. }
        )
    }
}

impl From<TmuxError> for CoordinatorError {
    fn from(e: TmuxError) -> Self {
        match e {
            TmuxError::AlreadyExists { name } => CoordinatorError::AlreadyExists { name },
            TmuxError::NotFound { name } => CoordinatorError::NotFound { name },
            TmuxError::BadPath { path } => CoordinatorError::BadInput {
                message: format!("working directory does not exist: {}", path),
            },
            TmuxError::Timeout { operation, seconds } => {
                CoordinatorError::Timeout { operation, seconds }
            }
            other => CoordinatorError::SubstrateFailure {
                message: other.to_string(),
            },
        }
    }
}

impl From<GitError> for CoordinatorError {
    fn from(e: GitError) -> Self {
        match e {
            GitError::BranchBusy { branch, message } => {
                CoordinatorError::BranchBusy { branch, message }
            }
            GitError::NotInRepository { path } => CoordinatorError::BadInput {
                message: format!("not inside a git repository: {}", path),
            },
            GitError::InvalidBranch { message } => CoordinatorError::BadInput { message },
            GitError::Timeout { operation, seconds } => {
                CoordinatorError::Timeout { operation, seconds }
            }
            other => CoordinatorError::SubstrateFailure {
                message: other.to_string(),
            },
        }
    }
}
