#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Not inside a git repository: {path}")]
    NotInRepository { path: String },

    #[error("Branch '{branch}' is already checked out by another worktree: {message}")]
    BranchBusy { branch: String, message: String },

    #[error("A worktree already exists at path: {path}")]
    PathCollision { path: String },

    #[error("Worktree not found at path: {path}")]
    WorktreeNotFound { path: String },

    #[error("Failed to remove worktree at {path}: {message}")]
    WorktreeRemovalFailed { path: String, message: String },

    #[error("Invalid branch name: {message}")]
    InvalidBranch { message: String },

    #[error("Git operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Git diff failed: {message}")]
    DiffFailed { message: String },

    #[error("Git '{operation}' exceeded the {seconds}s wall-clock limit")]
    Timeout { operation: String, seconds: u64 },

    #[error("Git2 library error: {source}")]
    Git2Error {
        #[from]
        source: git2::Error,
    },

    #[error("IO error during git operation: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}
