//! The worktree table and its lifecycle operations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use gforge_protocol::BranchName;
use tracing::{info, warn};

use crate::cli;
use crate::errors::GitError;
use crate::project;

/// One tracked checkout: where it lives, which branch it carries, and which
/// host repository it is linked to.
#[derive(Debug, Clone, PartialEq)]
pub struct WorktreeRecord {
    pub path: PathBuf,
    pub branch: BranchName,
    pub base_repo: PathBuf,
    pub created_at: String,
}

/// Creates and tears down ephemeral checkouts under a single base directory.
///
/// The table is transient: it reflects worktrees created by this process.
/// After a restart the directories on disk (and the goblin store) are the
/// authority, which is why `exists()` consults the filesystem, not the table.
pub struct WorktreeManager {
    base_dir: PathBuf,
    create_timeout: Duration,
    query_timeout: Duration,
    table: RwLock<HashMap<String, WorktreeRecord>>,
}

impl WorktreeManager {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            create_timeout: Duration::from_secs(20),
            query_timeout: Duration::from_secs(5),
            table: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_timeouts(mut self, create: Duration, query: Duration) -> Self {
        self.create_timeout = create;
        self.query_timeout = query;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// The checkout root this manager would use for a goblin id.
    pub fn path_for(&self, goblin_id: &str) -> PathBuf {
        self.base_dir.join(goblin_id.replace('/', "_"))
    }

    /// Create a linked worktree for `goblin_id` on `branch`.
    ///
    /// The branch is created when absent; when present it is checked out,
    /// which fails with `BranchBusy` if another worktree of the host
    /// repository already holds it. Returns the absolute checkout path.
    pub fn create(
        &self,
        goblin_id: &str,
        project_path: &Path,
        branch: &str,
    ) -> Result<PathBuf, GitError> {
        let branch = project::validate_branch_name(branch)?;
        let repo_root = project::discover_repository_root(project_path)?;
        let path = self.path_for(goblin_id);

        if path.exists() {
            return Err(GitError::PathCollision {
                path: path.display().to_string(),
            });
        }

        std::fs::create_dir_all(&self.base_dir)?;

        let new_branch = !project::branch_exists(&repo_root, &branch)?;
        cli::worktree_add(&repo_root, &path, &branch, new_branch, self.create_timeout)?;

        info!(
            event = "git.worktree.create_completed",
            goblin_id = goblin_id,
            path = %path.display(),
            branch = %branch,
            new_branch = new_branch
        );

        let record = WorktreeRecord {
            path: path.clone(),
            branch: BranchName::new(branch),
            base_repo: repo_root,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.table
            .write()
            .expect("worktree table lock poisoned")
            .insert(goblin_id.to_string(), record);

        Ok(path)
    }

    /// Remove the checkout directory and its registration. Idempotent: a
    /// goblin with no remaining worktree state is a successful removal.
    pub fn remove(&self, goblin_id: &str) -> Result<(), GitError> {
        let record = self
            .table
            .read()
            .expect("worktree table lock poisoned")
            .get(goblin_id)
            .cloned();
        let path = record
            .as_ref()
            .map(|r| r.path.clone())
            .unwrap_or_else(|| self.path_for(goblin_id));

        if let Some(record) = &record {
            cli::worktree_remove(&record.base_repo, &record.path, self.create_timeout)?;
            if let Err(e) = cli::worktree_prune(&record.base_repo, self.query_timeout) {
                warn!(
                    event = "git.worktree.prune_failed",
                    goblin_id = goblin_id,
                    error = %e
                );
            }
        } else if path.exists() {
            // No record (e.g. after restart): deregister via the checkout's
            // own link back to the host repository, then delete.
            match cli::common_repo_root(&path, self.query_timeout) {
                Ok(repo_root) => {
                    if let Err(e) = cli::worktree_remove(&repo_root, &path, self.create_timeout) {
                        warn!(
                            event = "git.worktree.orphan_deregister_failed",
                            path = %path.display(),
                            error = %e
                        );
                    }
                }
                Err(e) => {
                    warn!(
                        event = "git.worktree.orphan_not_a_checkout",
                        path = %path.display(),
                        error = %e
                    );
                }
            }
        }

        if path.exists() {
            std::fs::remove_dir_all(&path).map_err(|e| GitError::WorktreeRemovalFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        self.table
            .write()
            .expect("worktree table lock poisoned")
            .remove(goblin_id);

        info!(
            event = "git.worktree.remove_completed",
            goblin_id = goblin_id,
            path = %path.display()
        );
        Ok(())
    }

    /// Whether a checkout directory exists at the path this manager owns for
    /// `goblin_id`. Consults the filesystem so it survives restarts.
    pub fn exists(&self, goblin_id: &str) -> bool {
        self.path_for(goblin_id).exists()
    }

    pub fn get(&self, goblin_id: &str) -> Option<WorktreeRecord> {
        self.table
            .read()
            .expect("worktree table lock poisoned")
            .get(goblin_id)
            .cloned()
    }

    pub fn list(&self) -> Vec<WorktreeRecord> {
        self.table
            .read()
            .expect("worktree table lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// File paths changed in the worktree relative to the branch's merge base
    /// with its upstream, staged and unstaged collapsed, untracked included.
    pub fn changes(&self, path: &Path) -> Result<Vec<String>, GitError> {
        if !path.exists() {
            return Err(GitError::WorktreeNotFound {
                path: path.display().to_string(),
            });
        }
        let base = cli::merge_base_with_upstream(path, self.query_timeout)?;
        let mut files = cli::diff_name_only(path, &base, self.query_timeout)?;
        files.extend(cli::untracked_files(path, self.query_timeout)?);
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Unified diff text for the worktree, suitable for rendering.
    pub fn diff(&self, path: &Path, staged_only: bool) -> Result<String, GitError> {
        if !path.exists() {
            return Err(GitError::WorktreeNotFound {
                path: path.display().to_string(),
            });
        }
        cli::diff(path, staged_only, self.query_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn manager() -> (tempfile::TempDir, WorktreeManager) {
        let base = tempfile::tempdir().unwrap();
        let mgr = WorktreeManager::new(base.path().join("worktrees"));
        (base, mgr)
    }

    fn host_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        test_support::init_repo_with_commit(dir.path()).unwrap();
        dir
    }

    #[test]
    fn test_create_returns_path_under_base() {
        let repo = host_repo();
        let (_base, mgr) = manager();

        let path = mgr.create("goblin-1", repo.path(), "gf/coder").unwrap();
        assert_eq!(path, mgr.path_for("goblin-1"));
        assert!(path.join(".git").exists());

        let record = mgr.get("goblin-1").unwrap();
        assert_eq!(&*record.branch, "gf/coder");
        assert_eq!(
            record.base_repo.canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_create_rejects_path_collision() {
        let repo = host_repo();
        let (_base, mgr) = manager();

        mgr.create("goblin-1", repo.path(), "gf/one").unwrap();
        let result = mgr.create("goblin-1", repo.path(), "gf/two");
        assert!(matches!(result, Err(GitError::PathCollision { .. })));
    }

    #[test]
    fn test_create_rejects_busy_branch() {
        let repo = host_repo();
        let (_base, mgr) = manager();

        mgr.create("goblin-1", repo.path(), "gf/shared").unwrap();
        let result = mgr.create("goblin-2", repo.path(), "gf/shared");
        assert!(matches!(result, Err(GitError::BranchBusy { .. })));
    }

    #[test]
    fn test_create_checks_out_existing_free_branch() {
        let repo = host_repo();
        test_support::create_branch(repo.path(), "gf/preexisting").unwrap();
        let (_base, mgr) = manager();

        let path = mgr.create("goblin-1", repo.path(), "gf/preexisting").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_create_rejects_non_repository_project() {
        let not_repo = tempfile::tempdir().unwrap();
        let (_base, mgr) = manager();

        let result = mgr.create("goblin-1", not_repo.path(), "gf/coder");
        assert!(matches!(result, Err(GitError::NotInRepository { .. })));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let repo = host_repo();
        let (_base, mgr) = manager();

        let path = mgr.create("goblin-1", repo.path(), "gf/coder").unwrap();
        mgr.remove("goblin-1").unwrap();
        assert!(!path.exists());
        assert!(mgr.get("goblin-1").is_none());

        // Second remove finds nothing and still succeeds
        mgr.remove("goblin-1").unwrap();
    }

    #[test]
    fn test_remove_frees_branch_for_reuse() {
        let repo = host_repo();
        let (_base, mgr) = manager();

        mgr.create("goblin-1", repo.path(), "gf/shared").unwrap();
        mgr.remove("goblin-1").unwrap();

        // The branch survives removal and is free again
        mgr.create("goblin-2", repo.path(), "gf/shared").unwrap();
    }

    #[test]
    fn test_remove_orphan_checkout_after_restart() {
        let repo = host_repo();
        let base = tempfile::tempdir().unwrap();
        let worktrees = base.path().join("worktrees");

        let path = {
            let mgr = WorktreeManager::new(worktrees.clone());
            mgr.create("goblin-1", repo.path(), "gf/coder").unwrap()
        };
        assert!(path.exists());

        // A fresh manager (post-restart) has no table record but must still
        // deregister and delete the checkout.
        let mgr = WorktreeManager::new(worktrees);
        mgr.remove("goblin-1").unwrap();
        assert!(!path.exists());

        // Deregistration freed the branch for a new checkout
        mgr.create("goblin-2", repo.path(), "gf/coder").unwrap();
    }

    #[test]
    fn test_exists_consults_filesystem() {
        let repo = host_repo();
        let (_base, mgr) = manager();

        assert!(!mgr.exists("goblin-1"));
        mgr.create("goblin-1", repo.path(), "gf/coder").unwrap();
        assert!(mgr.exists("goblin-1"));
    }

    #[test]
    fn test_changes_lists_new_and_modified_files() {
        let repo = host_repo();
        std::fs::write(repo.path().join("base.txt"), "v1\n").unwrap();
        let _ = cli::run_git(repo.path(), &["add", "."], Duration::from_secs(5)).unwrap();
        let _ = cli::run_git(
            repo.path(),
            &["commit", "-m", "base file"],
            Duration::from_secs(5),
        )
        .unwrap();

        let (_base, mgr) = manager();
        let wt = mgr.create("goblin-1", repo.path(), "gf/coder").unwrap();

        std::fs::write(wt.join("base.txt"), "v2\n").unwrap();
        std::fs::write(wt.join("fresh.txt"), "new\n").unwrap();

        let changes = mgr.changes(&wt).unwrap();
        assert_eq!(
            changes,
            vec!["base.txt".to_string(), "fresh.txt".to_string()]
        );
    }

    #[test]
    fn test_changes_on_missing_path() {
        let (_base, mgr) = manager();
        let result = mgr.changes(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(GitError::WorktreeNotFound { .. })));
    }

    #[test]
    fn test_diff_renders_unified_text() {
        let repo = host_repo();
        std::fs::write(repo.path().join("file.txt"), "old\n").unwrap();
        let _ = cli::run_git(repo.path(), &["add", "."], Duration::from_secs(5)).unwrap();
        let _ = cli::run_git(
            repo.path(),
            &["commit", "-m", "seed"],
            Duration::from_secs(5),
        )
        .unwrap();

        let (_base, mgr) = manager();
        let wt = mgr.create("goblin-1", repo.path(), "gf/coder").unwrap();
        std::fs::write(wt.join("file.txt"), "new\n").unwrap();

        let text = mgr.diff(&wt, false).unwrap();
        assert!(text.contains("-old"));
        assert!(text.contains("+new"));

        assert!(mgr.diff(&wt, true).unwrap().is_empty());
    }
}
