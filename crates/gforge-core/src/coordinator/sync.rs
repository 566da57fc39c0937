//! Startup and on-demand reconciliation of store records against the
//! substrates.

use gforge_protocol::GoblinStatus;
use tracing::{info, warn};

use super::{Coordinator, CoordinatorError};

impl Coordinator {
    /// Reconcile every goblin's status against the multiplexer server and
    /// the worktree directories.
    ///
    /// Run at startup and before refreshed listings. For each record:
    /// session missing -> live goblins become `Dead` (worktree kept);
    /// session present but worktree missing -> `Dead`; both present -> the
    /// live status stands. Records are never deleted here; only explicit
    /// operations remove them.
    pub fn reconcile(&self) -> Result<(), CoordinatorError> {
        self.sessions.sync()?;

        for mut goblin in self.store.list() {
            if !goblin.is_live() {
                continue;
            }

            let session_exists = match self.sessions.exists(&goblin.session_name) {
                Ok(exists) => exists,
                Err(e) => {
                    warn!(
                        event = "core.coordinator.reconcile_probe_failed",
                        name = %goblin.name,
                        error = %e
                    );
                    continue;
                }
            };

            let verdict = if !session_exists {
                Some("session missing")
            } else if !self.worktrees.exists(&goblin.id) {
                Some("worktree missing")
            } else {
                match self.sessions.pane_dead(&goblin.session_name) {
                    Ok(true) => Some("agent process exited"),
                    Ok(false) => None,
                    Err(e) => {
                        warn!(
                            event = "core.coordinator.reconcile_probe_failed",
                            name = %goblin.name,
                            error = %e
                        );
                        None
                    }
                }
            };

            if let Some(reason) = verdict {
                info!(
                    event = "core.coordinator.reconcile_marked_dead",
                    name = %goblin.name,
                    goblin_id = %goblin.id,
                    reason = reason
                );
                goblin.status = GoblinStatus::Dead;
                goblin.touch();
                self.store.upsert(goblin)?;
            }
        }

        Ok(())
    }
}
