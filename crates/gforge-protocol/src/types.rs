use serde::{Deserialize, Serialize};

/// Generate a newtype wrapper around `String` with standard trait impls.
///
/// Each generated type gets: `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`,
/// `Serialize`/`Deserialize` (transparent), `Display`, `Deref<Target=str>`,
/// `AsRef<str>`, `Borrow<str>`, `From<String>`, `From<&str>`.
macro_rules! newtype_string {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

newtype_string! {
    /// Opaque goblin identifier, stable for the life of the record.
    GoblinId
}

newtype_string! {
    /// Name under which a goblin's session is registered in the private
    /// multiplexer server (e.g. `"gf-coder-1a2b3c4d"`).
    SessionName
}

newtype_string! {
    /// Git branch checked out inside a goblin's worktree (e.g. `"gf/coder"`).
    BranchName
}

/// Lifecycle status of a goblin.
///
/// `Created`, `Running`, and `Paused` are the "live" states over which goblin
/// names must be unique. `Stopped` records are kept for diff review; `Dead`
/// records await explicit cleanup; `Complete` is terminal and removed.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoblinStatus {
    Created,
    Running,
    Paused,
    Stopped,
    Dead,
    Complete,
}

impl GoblinStatus {
    /// Whether a goblin in this status holds the name-uniqueness slot.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            GoblinStatus::Created | GoblinStatus::Running | GoblinStatus::Paused
        )
    }
}

impl std::fmt::Display for GoblinStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoblinStatus::Created => write!(f, "created"),
            GoblinStatus::Running => write!(f, "running"),
            GoblinStatus::Paused => write!(f, "paused"),
            GoblinStatus::Stopped => write!(f, "stopped"),
            GoblinStatus::Dead => write!(f, "dead"),
            GoblinStatus::Complete => write!(f, "complete"),
        }
    }
}

/// Machine-readable error kinds carried in wire error replies.
///
/// Maps 1:1 with the coordinator's error taxonomy. Unknown codes from future
/// daemon versions deserialize to `Unknown` via `#[serde(other)]`.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    AlreadyExists,
    BadInput,
    BranchBusy,
    SubstrateFailure,
    Timeout,
    CleanupPending,
    StoreFailure,
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Convert a string error code to an `ErrorCode`.
    pub fn from_code(code: &str) -> Self {
        serde_json::from_value(serde_json::Value::String(code.to_string()))
            .unwrap_or(ErrorCode::Unknown)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotFound => write!(f, "not_found"),
            ErrorCode::AlreadyExists => write!(f, "already_exists"),
            ErrorCode::BadInput => write!(f, "bad_input"),
            ErrorCode::BranchBusy => write!(f, "branch_busy"),
            ErrorCode::SubstrateFailure => write!(f, "substrate_failure"),
            ErrorCode::Timeout => write!(f, "timeout"),
            ErrorCode::CleanupPending => write!(f, "cleanup_pending"),
            ErrorCode::StoreFailure => write!(f, "store_failure"),
            ErrorCode::Unknown => write!(f, "unknown"),
        }
    }
}

/// Wire summary of a goblin as returned over IPC.
///
/// This is the facade's view of a record; the coordinator's internal type
/// carries the same data plus ownership semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoblinSummary {
    pub id: GoblinId,
    pub name: String,
    pub agent: String,
    pub project_path: String,
    pub worktree_path: String,
    pub branch: BranchName,
    pub session_name: SessionName,
    pub capture_path: String,
    pub status: GoblinStatus,
    #[serde(default)]
    pub cleanup_pending: bool,
    pub created_at: String,
    pub updated_at: String,
}
