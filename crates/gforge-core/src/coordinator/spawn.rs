//! Spawn: the transactional creation path.

use gforge_protocol::{BranchName, GoblinId, GoblinStatus};
use tracing::{error, info, warn};

use crate::goblins::Goblin;

use super::{Coordinator, CoordinatorError, SpawnRequest};

/// Compensation stack for partial-failure rollback.
///
/// Each completed creation step registers its undo; on failure the stack
/// unwinds in reverse order so no orphan session or worktree survives a
/// failed spawn. Undo failures are logged, never raised; the original
/// error is what the caller needs to see.
struct Compensation<'a> {
    steps: Vec<(&'static str, Box<dyn FnOnce() -> Result<(), String> + 'a>)>,
}

impl<'a> Compensation<'a> {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn register<F>(&mut self, label: &'static str, undo: F)
    where
        F: FnOnce() -> Result<(), String> + 'a,
    {
        self.steps.push((label, Box::new(undo)));
    }

    fn unwind(self) {
        for (label, undo) in self.steps.into_iter().rev() {
            match undo() {
                Ok(()) => info!(event = "core.coordinator.spawn_rollback_step", step = label),
                Err(e) => error!(
                    event = "core.coordinator.spawn_rollback_failed",
                    step = label,
                    error = %e
                ),
            }
        }
    }
}

impl Coordinator {
    /// Create a goblin: resolve the agent, cut a worktree and branch, start
    /// a session in it, submit the agent's launch command, persist.
    ///
    /// Validation order: agent key, project path, name uniqueness, branch.
    /// Any failure after partial creation compensates in reverse order.
    pub fn spawn(&self, request: SpawnRequest) -> Result<Goblin, CoordinatorError> {
        info!(
            event = "core.coordinator.spawn_started",
            name = %request.name,
            agent = %request.agent_key,
            project = %request.project_path.display()
        );

        // 1. Validate: agent key known
        let Some(definition) = self.registry.get(&request.agent_key) else {
            return Err(CoordinatorError::BadInput {
                message: format!(
                    "Unknown agent '{}'. Known agents: {}",
                    request.agent_key,
                    self.registry.known_keys()
                ),
            });
        };

        // 2. Validate: project path exists inside a host repository
        if !request.project_path.is_dir() {
            return Err(CoordinatorError::BadInput {
                message: format!(
                    "project path does not exist: {}",
                    request.project_path.display()
                ),
            });
        }
        let project_root = self.worktrees.validate_project(&request.project_path)?;

        // 3. Validate: name non-empty and unique among live goblins.
        // Collisions are rejected, never auto-renamed.
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CoordinatorError::BadInput {
                message: "goblin name cannot be empty".to_string(),
            });
        }
        if self.store.find_live_by_name(name).is_some() {
            return Err(CoordinatorError::AlreadyExists {
                name: name.to_string(),
            });
        }

        // 4. Branch: explicit, or derived as <prefix>/<name>
        let branch = match request.branch.as_deref().map(str::trim) {
            Some(branch) if !branch.is_empty() => branch.to_string(),
            _ => format!("{}/{}", self.config.branch_prefix, name),
        };

        let id = GoblinId::new(uuid::Uuid::new_v4().to_string());
        let session_name = self.session_name_for(name, &id);
        let mut compensation = Compensation::new();

        // 5. Worktree
        let worktree_path = self.worktrees.create(&id, &project_root, &branch)?;
        {
            let worktrees = &self.worktrees;
            let id = id.clone();
            compensation.register("remove worktree", move || {
                worktrees.remove(&id).map_err(|e| e.to_string())
            });
        }

        // 6. Session rooted in the worktree (capture starts inside create,
        // before any command is sent)
        let session = match self.sessions.create(&session_name, &worktree_path) {
            Ok(session) => session,
            Err(e) => {
                compensation.unwind();
                return Err(e.into());
            }
        };
        {
            let sessions = &self.sessions;
            let session_name = session_name.clone();
            compensation.register("kill session", move || {
                sessions.kill(&session_name).map_err(|e| e.to_string())
            });
        }

        // 7. Launch the agent
        let launch = definition.launch_command_line();
        if let Err(e) = self.sessions.send_command(&session_name, &launch) {
            compensation.unwind();
            return Err(e.into());
        }

        let capture_path = session.capture_path.unwrap_or_else(|| {
            self.config
                .capture_dir
                .join(format!("{}.log", &*session_name))
        });

        let now = chrono::Utc::now().to_rfc3339();
        let goblin = Goblin {
            id: id.clone(),
            name: name.to_string(),
            agent_key: definition.key.clone(),
            project_path: project_root,
            worktree_path,
            branch: BranchName::new(branch),
            session_name,
            capture_path,
            status: GoblinStatus::Running,
            cleanup_pending: false,
            created_at: now.clone(),
            updated_at: now,
        };

        // 8. Persist; a store failure rolls everything back
        if let Err(e) = self.store.upsert(goblin.clone()) {
            warn!(
                event = "core.coordinator.spawn_persist_failed",
                name = name,
                error = %e
            );
            compensation.unwind();
            return Err(e.into());
        }

        info!(
            event = "core.coordinator.spawn_completed",
            name = name,
            goblin_id = %goblin.id,
            branch = %goblin.branch,
            session = %goblin.session_name
        );
        Ok(goblin)
    }
}
