//! Host repository discovery and validation.

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::errors::GitError;

/// Resolve the working-directory root of the repository containing `path`.
///
/// `path` may be any directory inside the repository; the returned path is
/// the top-level checkout root. Bare repositories are rejected because a
/// goblin's project must have a working tree to branch from.
pub fn discover_repository_root(path: &Path) -> Result<PathBuf, GitError> {
    let repo = Repository::discover(path).map_err(|_| GitError::NotInRepository {
        path: path.display().to_string(),
    })?;
    let workdir = repo.workdir().ok_or_else(|| GitError::NotInRepository {
        path: path.display().to_string(),
    })?;
    Ok(workdir.to_path_buf())
}

/// Whether a local branch of this name exists in the repository at `repo_path`.
pub fn branch_exists(repo_path: &Path, branch: &str) -> Result<bool, GitError> {
    let repo = Repository::open(repo_path).map_err(|e| GitError::Git2Error { source: e })?;
    match repo.find_branch(branch, git2::BranchType::Local) {
        Ok(_) => Ok(true),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
        Err(e) => Err(GitError::Git2Error { source: e }),
    }
}

/// Validate a branch name against git's naming rules.
pub fn validate_branch_name(branch: &str) -> Result<String, GitError> {
    let trimmed = branch.trim();

    if trimmed.is_empty() {
        return Err(GitError::InvalidBranch {
            message: "branch name cannot be empty".to_string(),
        });
    }

    if trimmed.contains("..")
        || trimmed.starts_with('-')
        || trimmed.ends_with('/')
        || trimmed.contains(' ')
        || trimmed.contains('\t')
        || trimmed.contains('\n')
    {
        return Err(GitError::InvalidBranch {
            message: format!("'{}' is not a valid branch name", trimmed),
        });
    }

    Ok(trimmed.to_string())
}
