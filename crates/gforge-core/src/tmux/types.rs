use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Tracked state of a multiplexer session.
///
/// `Created` covers every live session (tmux itself has no richer notion we
/// track); `Dead` is assigned by `sync()` when the server no longer lists
/// the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    Dead,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

/// One tracked session in the private multiplexer server.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub name: String,
    pub window_id: Option<String>,
    pub pane_id: Option<String>,
    pub working_dir: PathBuf,
    pub state: SessionState,
    pub created_at: String,
    /// Where `pipe-pane` appends the session's output. `None` when capture
    /// setup failed (a warning, not an error) or the session was adopted.
    pub capture_path: Option<PathBuf>,
}

/// Options for `send_text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    /// Skip the post-send settle delay. Used for key events.
    pub suppress_delay: bool,
}

/// Pane identifiers and liveness as reported by `list-panes`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneInfo {
    pub window_id: String,
    pub pane_id: String,
    pub dead: bool,
    pub pid: Option<i32>,
}

/// Result of reconciling the in-memory table against the live server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Sessions present externally but previously untracked.
    pub adopted: Vec<String>,
    /// Tracked sessions missing from the server, now marked dead.
    pub marked_dead: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_display() {
        assert_eq!(SessionState::Created.to_string(), "created");
        assert_eq!(SessionState::Dead.to_string(), "dead");
    }

    #[test]
    fn test_send_options_default_delays() {
        let opts = SendOptions::default();
        assert!(!opts.suppress_delay);
    }

    #[test]
    fn test_sync_report_default_is_empty() {
        let report = SyncReport::default();
        assert!(report.adopted.is_empty());
        assert!(report.marked_dead.is_empty());
    }
}
