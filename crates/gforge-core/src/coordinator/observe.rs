//! Read-only operations: list, get, stats, output, changes, diff.

use gforge_protocol::{GoblinStatus, StatusCounts};
use tracing::warn;

use crate::goblins::Goblin;

use super::{Coordinator, CoordinatorError};

impl Coordinator {
    /// All goblins in the store, oldest first.
    pub fn list(&self) -> Vec<Goblin> {
        self.store.list()
    }

    /// Like [`list`](Self::list), but reconciled against the substrates
    /// first so statuses reflect reality.
    pub fn list_refreshed(&self) -> Result<Vec<Goblin>, CoordinatorError> {
        self.reconcile()?;
        Ok(self.store.list())
    }

    /// Look up one goblin by name or id prefix.
    pub fn get(&self, name_or_id: &str) -> Result<Goblin, CoordinatorError> {
        self.resolve(name_or_id)
    }

    /// Counts per status over the store.
    pub fn stats(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for goblin in self.store.list() {
            counts.total += 1;
            match goblin.status {
                GoblinStatus::Created => counts.created += 1,
                GoblinStatus::Running => counts.running += 1,
                GoblinStatus::Paused => counts.paused += 1,
                GoblinStatus::Stopped => counts.stopped += 1,
                GoblinStatus::Dead => counts.dead += 1,
                GoblinStatus::Complete => counts.complete += 1,
                _ => {}
            }
        }
        counts
    }

    /// Last `lines` lines of the goblin's output.
    ///
    /// Reads the tail of the continuous capture file; when the file is
    /// missing or unreadable (capture setup may have failed at create time),
    /// falls back to a live pane snapshot.
    pub fn output(&self, name_or_id: &str, lines: u32) -> Result<String, CoordinatorError> {
        let goblin = self.resolve(name_or_id)?;

        match std::fs::read_to_string(&goblin.capture_path) {
            Ok(content) => Ok(tail_lines(&content, lines)),
            Err(e) => {
                warn!(
                    event = "core.coordinator.capture_read_failed",
                    name = %goblin.name,
                    capture = %goblin.capture_path.display(),
                    error = %e,
                    "Falling back to pane snapshot"
                );
                Ok(self.sessions.capture_pane(&goblin.session_name, lines)?)
            }
        }
    }

    /// Files changed in the goblin's worktree relative to its merge base.
    pub fn changes(&self, name_or_id: &str) -> Result<Vec<String>, CoordinatorError> {
        let goblin = self.resolve(name_or_id)?;
        Ok(self.worktrees.changes(&goblin.worktree_path)?)
    }

    /// Unified diff of the goblin's worktree.
    pub fn diff(&self, name_or_id: &str, staged_only: bool) -> Result<String, CoordinatorError> {
        let goblin = self.resolve(name_or_id)?;
        Ok(self.worktrees.diff(&goblin.worktree_path, staged_only)?)
    }
}

/// Last `lines` lines of `content`, preserving original line endings.
fn tail_lines(content: &str, lines: u32) -> String {
    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines as usize);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::tail_lines;

    #[test]
    fn test_tail_lines_shorter_than_limit() {
        assert_eq!(tail_lines("a\nb", 10), "a\nb");
        assert_eq!(tail_lines("", 10), "");
    }

    #[test]
    fn test_tail_lines_truncates_front() {
        assert_eq!(tail_lines("a\nb\nc\nd", 2), "c\nd");
        assert_eq!(tail_lines("a\nb\nc\nd\n", 3), "b\nc\nd");
    }

    #[test]
    fn test_tail_lines_zero() {
        assert_eq!(tail_lines("a\nb", 0), "");
    }
}
