//! State-changing lifecycle operations: stop, kill, pause, resume.

use gforge_protocol::GoblinStatus;
use tracing::{info, warn};

use crate::goblins::Goblin;

use super::{Coordinator, CoordinatorError};

impl Coordinator {
    /// Kill the session but keep the worktree, so `changes`/`diff` stay
    /// meaningful for post-mortem review. The capture file is kept too.
    pub fn stop(&self, name_or_id: &str) -> Result<Goblin, CoordinatorError> {
        let mut goblin = self.resolve(name_or_id)?;
        info!(
            event = "core.coordinator.stop_started",
            name = %goblin.name,
            goblin_id = %goblin.id
        );

        self.sessions.kill(&goblin.session_name)?;

        goblin.status = GoblinStatus::Stopped;
        goblin.touch();
        self.store.upsert(goblin.clone())?;

        info!(event = "core.coordinator.stop_completed", name = %goblin.name);
        Ok(goblin)
    }

    /// Forcibly remove session and worktree, then delete the record.
    ///
    /// When the session is gone but worktree removal fails, the record is
    /// kept in `Dead` with `cleanup_pending` set; a later kill retries the
    /// removal and completes. Unknown goblins are `NotFound`, not success.
    pub fn kill(&self, name_or_id: &str) -> Result<(), CoordinatorError> {
        let mut goblin = self.resolve(name_or_id)?;
        info!(
            event = "core.coordinator.kill_started",
            name = %goblin.name,
            goblin_id = %goblin.id
        );

        self.sessions.kill(&goblin.session_name)?;

        if let Err(e) = self.worktrees.remove(&goblin.id) {
            warn!(
                event = "core.coordinator.kill_worktree_failed",
                name = %goblin.name,
                error = %e
            );
            goblin.status = GoblinStatus::Dead;
            goblin.cleanup_pending = true;
            goblin.touch();
            self.store.upsert(goblin.clone())?;
            return Err(CoordinatorError::CleanupPending {
                name: goblin.name,
                message: e.to_string(),
            });
        }

        // Capture retention: kill discards the log; a failure here is a
        // warning, not an error.
        if goblin.capture_path.exists()
            && let Err(e) = std::fs::remove_file(&goblin.capture_path)
        {
            warn!(
                event = "core.coordinator.kill_capture_cleanup_failed",
                name = %goblin.name,
                capture = %goblin.capture_path.display(),
                error = %e
            );
        }

        self.store.remove(&goblin.id)?;
        info!(event = "core.coordinator.kill_completed", name = %goblin.name);
        Ok(())
    }

    /// Suspend a running goblin's agent process.
    pub fn pause(&self, name_or_id: &str) -> Result<Goblin, CoordinatorError> {
        let mut goblin = self.resolve(name_or_id)?;
        if goblin.status != GoblinStatus::Running {
            return Err(CoordinatorError::BadInput {
                message: format!(
                    "goblin '{}' is {}, only running goblins can be paused",
                    goblin.name, goblin.status
                ),
            });
        }

        self.sessions.pause(&goblin.session_name)?;
        goblin.status = GoblinStatus::Paused;
        goblin.touch();
        self.store.upsert(goblin.clone())?;

        info!(event = "core.coordinator.pause_completed", name = %goblin.name);
        Ok(goblin)
    }

    /// Resume a paused goblin's agent process.
    pub fn resume(&self, name_or_id: &str) -> Result<Goblin, CoordinatorError> {
        let mut goblin = self.resolve(name_or_id)?;
        if goblin.status != GoblinStatus::Paused {
            return Err(CoordinatorError::BadInput {
                message: format!(
                    "goblin '{}' is {}, only paused goblins can be resumed",
                    goblin.name, goblin.status
                ),
            });
        }

        self.sessions.resume(&goblin.session_name)?;
        goblin.status = GoblinStatus::Running;
        goblin.touch();
        self.store.upsert(goblin.clone())?;

        info!(event = "core.coordinator.resume_completed", name = %goblin.name);
        Ok(goblin)
    }

    /// Deliver a raw natural-language instruction to the goblin's session.
    /// No templating, no state change.
    pub fn send_task(&self, name_or_id: &str, text: &str) -> Result<(), CoordinatorError> {
        let goblin = self.resolve(name_or_id)?;
        info!(
            event = "core.coordinator.send_task",
            name = %goblin.name,
            bytes = text.len()
        );
        self.sessions.send_command(&goblin.session_name, text)?;
        Ok(())
    }

    /// Run a blocking attach client for the goblin's session. Returns only
    /// when the user detaches; the coordinator never interrupts it.
    pub fn attach(&self, name_or_id: &str) -> Result<(), CoordinatorError> {
        let goblin = self.resolve(name_or_id)?;
        self.sessions.attach(&goblin.session_name)?;
        Ok(())
    }
}
