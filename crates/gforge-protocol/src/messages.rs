use serde::{Deserialize, Serialize};

use crate::types::{ErrorCode, GoblinSummary};

/// Client -> Coordinator command documents.
///
/// Each variant maps to one newline-framed JSON document with `"action"` as
/// the tag field and flat argument fields, e.g.
/// `{"action":"spawn","name":"coder","agent":"claude","project":"/src/app"}`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    /// Spawn a new goblin. `branch` empty or absent means "derive one".
    Spawn {
        name: String,
        agent: String,
        project: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        branch: Option<String>,
    },

    /// List all goblins in the store.
    List,

    /// Look up a single goblin by name or id prefix.
    Status { name: String },

    /// Deliver a task instruction to a goblin's session.
    Send { name: String, text: String },

    /// Snapshot the last `lines` lines of a goblin's output.
    Capture {
        name: String,
        #[serde(default = "default_capture_lines")]
        lines: u32,
    },

    /// Kill the session but keep the worktree for post-mortem review.
    Stop { name: String },

    /// Remove session, worktree, and record.
    Kill { name: String },

    /// Per-status counts over the store.
    Stats,
}

fn default_capture_lines() -> u32 {
    100
}

/// Per-status goblin counts as returned by `stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub created: usize,
    pub running: usize,
    pub paused: usize,
    pub stopped: usize,
    pub dead: usize,
    pub complete: usize,
    pub total: usize,
}

/// Successful reply document: `{"status":"ok", ...payload}`.
///
/// Only the fields relevant to the answered action are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OkReply {
    /// Always the literal string `"ok"`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goblin: Option<GoblinSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goblins: Option<Vec<GoblinSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatusCounts>,
}

impl OkReply {
    pub fn empty() -> Self {
        Self {
            status: "ok".to_string(),
            ..Default::default()
        }
    }

    pub fn with_goblin(goblin: GoblinSummary) -> Self {
        Self {
            goblin: Some(goblin),
            ..Self::empty()
        }
    }

    pub fn with_goblins(goblins: Vec<GoblinSummary>) -> Self {
        Self {
            goblins: Some(goblins),
            ..Self::empty()
        }
    }

    pub fn with_output(output: String) -> Self {
        Self {
            output: Some(output),
            ..Self::empty()
        }
    }

    pub fn with_stats(stats: StatusCounts) -> Self {
        Self {
            stats: Some(stats),
            ..Self::empty()
        }
    }
}

/// Error reply document: `{"error":"not_found","message":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: ErrorCode,
    pub message: String,
}

/// Coordinator -> client reply, one document per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Ok(OkReply),
    Error(ErrorReply),
}

impl Reply {
    pub fn error(error: ErrorCode, message: impl Into<String>) -> Self {
        Reply::Error(ErrorReply {
            error,
            message: message.into(),
        })
    }
}

/// Inbound status/event document (voice-daemon -> coordinator direction).
///
/// The facade acknowledges these but attaches no policy to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: String,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Any inbound document: a command or a status/event.
///
/// Commands carry `"action"`, events carry `"status"`; the two field sets are
/// disjoint so untagged deserialization is unambiguous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Frame {
    Command(Request),
    Event(StatusEvent),
}
