use std::path::PathBuf;

use gforge_protocol::{BranchName, GoblinId, GoblinStatus, GoblinSummary, SessionName};
use serde::{Deserialize, Serialize};

/// The central entity: one agent process, one session, one worktree, one
/// branch, bound under a stable id and a human-assigned name.
///
/// Owned exclusively by the coordinator; the session and worktree managers
/// are only referenced by `session_name` and `worktree_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goblin {
    pub id: GoblinId,
    /// Human-assigned label, unique among live goblins.
    pub name: String,
    /// Registry key used to launch this goblin (e.g. "claude", "aider").
    pub agent_key: String,
    /// Host source tree whose branch/worktree backs this goblin.
    pub project_path: PathBuf,
    /// Ephemeral checkout owned by this goblin.
    pub worktree_path: PathBuf,
    pub branch: BranchName,
    /// Name under which the multiplexer session is registered.
    pub session_name: SessionName,
    /// Append-only output log for the session.
    pub capture_path: PathBuf,
    pub status: GoblinStatus,
    /// Set when Kill removed the session but worktree removal failed;
    /// retrying Kill completes the cleanup.
    #[serde(default)]
    pub cleanup_pending: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Goblin {
    /// Whether this goblin holds the name-uniqueness slot.
    pub fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Refresh `updated_at`. Called by the coordinator on every
    /// state-changing operation.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Wire view for the IPC facade.
    pub fn summary(&self) -> GoblinSummary {
        GoblinSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            agent: self.agent_key.clone(),
            project_path: self.project_path.display().to_string(),
            worktree_path: self.worktree_path.display().to_string(),
            branch: self.branch.clone(),
            session_name: self.session_name.clone(),
            capture_path: self.capture_path.display().to_string(),
            status: self.status,
            cleanup_pending: self.cleanup_pending,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    /// Create a minimal Goblin for testing purposes.
    #[cfg(test)]
    pub fn new_for_test(id: impl Into<GoblinId>, name: impl Into<String>) -> Self {
        let id = id.into();
        let name = name.into();
        Self {
            session_name: SessionName::new(format!("gf-{}-{}", name, &*id)),
            branch: BranchName::new(format!("gf/{}", name)),
            worktree_path: PathBuf::from(format!("/tmp/gforge-test/worktrees/{}", &*id)),
            capture_path: PathBuf::from(format!("/tmp/gforge-test/logs/gf-{}.log", name)),
            project_path: PathBuf::from("/tmp/gforge-test/project"),
            agent_key: "claude".to_string(),
            status: GoblinStatus::Running,
            cleanup_pending: false,
            created_at: "2026-07-30T10:00:00Z".to_string(),
            updated_at: "2026-07-30T10:00:00Z".to_string(),
            id,
            name,
        }
    }
}
