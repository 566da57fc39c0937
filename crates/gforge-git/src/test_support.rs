//! Test helpers for creating git repositories and branches.
//!
//! These functions wrap git2 operations so test code outside the crate
//! doesn't need to import git2 directly.

use std::path::Path;

use git2::Repository;

use crate::errors::GitError;

/// Initialize a new git repository at the given path with an initial commit.
///
/// Sets a local user.name/user.email so follow-up commits (including ones
/// made through the git CLI) work in bare test environments.
pub fn init_repo_with_commit(path: &Path) -> Result<(), GitError> {
    let repo = Repository::init(path).map_err(|e| GitError::Git2Error { source: e })?;

    let mut config = repo.config().map_err(|e| GitError::Git2Error { source: e })?;
    config
        .set_str("user.name", "Test")
        .map_err(|e| GitError::Git2Error { source: e })?;
    config
        .set_str("user.email", "test@test.com")
        .map_err(|e| GitError::Git2Error { source: e })?;

    let sig = repo
        .signature()
        .unwrap_or_else(|_| git2::Signature::now("Test", "test@test.com").unwrap());
    let tree_id = repo
        .index()
        .map_err(|e| GitError::Git2Error { source: e })?
        .write_tree()
        .map_err(|e| GitError::Git2Error { source: e })?;
    let tree = repo
        .find_tree(tree_id)
        .map_err(|e| GitError::Git2Error { source: e })?;
    repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .map_err(|e| GitError::Git2Error { source: e })?;
    Ok(())
}

/// Create a local branch pointing at HEAD.
pub fn create_branch(path: &Path, name: &str) -> Result<(), GitError> {
    let repo = Repository::open(path).map_err(|e| GitError::Git2Error { source: e })?;
    let head = repo.head().map_err(|e| GitError::Git2Error { source: e })?;
    let commit = head
        .peel_to_commit()
        .map_err(|e| GitError::Git2Error { source: e })?;
    repo.branch(name, &commit, false)
        .map_err(|e| GitError::Git2Error { source: e })?;
    Ok(())
}
