//! Substrate traits: the seams between the coordinator and the two external
//! tools it sits on.
//!
//! The coordinator takes these as explicit dependencies at construction
//! instead of reaching for process-wide singletons, so it can be exercised
//! against in-memory fakes in tests while production wires in the real tmux
//! and git managers.

use std::path::{Path, PathBuf};

use gforge_git::{GitError, WorktreeManager};

use crate::tmux::{SendOptions, SessionManager, SessionRecord, SyncReport, TmuxError};

/// Session lifecycle as the coordinator consumes it.
pub trait SessionSubstrate: Send + Sync {
    fn create(&self, name: &str, working_dir: &Path) -> Result<SessionRecord, TmuxError>;
    fn kill(&self, name: &str) -> Result<(), TmuxError>;
    /// Blocks until the user detaches.
    fn attach(&self, name: &str) -> Result<(), TmuxError>;
    fn send_text(&self, name: &str, text: &str, opts: SendOptions) -> Result<(), TmuxError>;
    fn send_key(&self, name: &str, key: &str) -> Result<(), TmuxError>;
    fn send_command(&self, name: &str, command: &str) -> Result<(), TmuxError>;
    fn capture_pane(&self, name: &str, lines: u32) -> Result<String, TmuxError>;
    fn get(&self, name: &str) -> Option<SessionRecord>;
    fn list(&self) -> Vec<SessionRecord>;
    /// Whether the server has a session of this name, tracked or not.
    fn exists(&self, name: &str) -> Result<bool, TmuxError>;
    /// Whether the session's pane process has terminated.
    fn pane_dead(&self, name: &str) -> Result<bool, TmuxError>;
    /// PID of the pane's process group leader, when still running.
    fn pane_pid(&self, name: &str) -> Result<Option<i32>, TmuxError>;
    /// Suspend the pane's process (SIGSTOP).
    fn pause(&self, name: &str) -> Result<(), TmuxError>;
    /// Resume a suspended pane process (SIGCONT).
    fn resume(&self, name: &str) -> Result<(), TmuxError>;
    fn sync(&self) -> Result<SyncReport, TmuxError>;
}

impl SessionSubstrate for SessionManager {
    fn create(&self, name: &str, working_dir: &Path) -> Result<SessionRecord, TmuxError> {
        SessionManager::create(self, name, working_dir)
    }

    fn kill(&self, name: &str) -> Result<(), TmuxError> {
        SessionManager::kill(self, name)
    }

    fn attach(&self, name: &str) -> Result<(), TmuxError> {
        SessionManager::attach(self, name)
    }

    fn send_text(&self, name: &str, text: &str, opts: SendOptions) -> Result<(), TmuxError> {
        SessionManager::send_text(self, name, text, opts)
    }

    fn send_key(&self, name: &str, key: &str) -> Result<(), TmuxError> {
        SessionManager::send_key(self, name, key)
    }

    fn send_command(&self, name: &str, command: &str) -> Result<(), TmuxError> {
        SessionManager::send_command(self, name, command)
    }

    fn capture_pane(&self, name: &str, lines: u32) -> Result<String, TmuxError> {
        SessionManager::capture_pane(self, name, lines)
    }

    fn get(&self, name: &str) -> Option<SessionRecord> {
        SessionManager::get(self, name)
    }

    fn list(&self) -> Vec<SessionRecord> {
        SessionManager::list(self)
    }

    fn exists(&self, name: &str) -> Result<bool, TmuxError> {
        SessionManager::exists(self, name)
    }

    fn pane_dead(&self, name: &str) -> Result<bool, TmuxError> {
        SessionManager::pane_dead(self, name)
    }

    fn pane_pid(&self, name: &str) -> Result<Option<i32>, TmuxError> {
        SessionManager::pane_pid(self, name)
    }

    fn pause(&self, name: &str) -> Result<(), TmuxError> {
        SessionManager::pause(self, name)
    }

    fn resume(&self, name: &str) -> Result<(), TmuxError> {
        SessionManager::resume(self, name)
    }

    fn sync(&self) -> Result<SyncReport, TmuxError> {
        SessionManager::sync(self)
    }
}

/// Worktree lifecycle as the coordinator consumes it.
pub trait WorktreeSubstrate: Send + Sync {
    /// Validate that `path` sits inside a host repository and return the
    /// repository's checkout root.
    fn validate_project(&self, path: &Path) -> Result<PathBuf, GitError>;
    fn create(
        &self,
        goblin_id: &str,
        project_path: &Path,
        branch: &str,
    ) -> Result<PathBuf, GitError>;
    fn remove(&self, goblin_id: &str) -> Result<(), GitError>;
    /// Whether a checkout directory exists for this goblin id.
    fn exists(&self, goblin_id: &str) -> bool;
    fn changes(&self, path: &Path) -> Result<Vec<String>, GitError>;
    fn diff(&self, path: &Path, staged_only: bool) -> Result<String, GitError>;
}

impl WorktreeSubstrate for WorktreeManager {
    fn validate_project(&self, path: &Path) -> Result<PathBuf, GitError> {
        gforge_git::project::discover_repository_root(path)
    }

    fn create(
        &self,
        goblin_id: &str,
        project_path: &Path,
        branch: &str,
    ) -> Result<PathBuf, GitError> {
        WorktreeManager::create(self, goblin_id, project_path, branch)
    }

    fn remove(&self, goblin_id: &str) -> Result<(), GitError> {
        WorktreeManager::remove(self, goblin_id)
    }

    fn exists(&self, goblin_id: &str) -> bool {
        WorktreeManager::exists(self, goblin_id)
    }

    fn changes(&self, path: &Path) -> Result<Vec<String>, GitError> {
        WorktreeManager::changes(self, path)
    }

    fn diff(&self, path: &Path, staged_only: bool) -> Result<String, GitError> {
        WorktreeManager::diff(self, path, staged_only)
    }
}
