//! The private terminal-multiplexer substrate.
//!
//! Every tmux call goes through [`commands::TmuxCli`], which addresses the
//! server via its own socket label (`tmux -L gforge`) so goblin sessions are
//! invisible to, and isolated from, the user's own tmux usage.

pub mod commands;
pub mod errors;
pub mod manager;
pub mod types;

pub use errors::TmuxError;
pub use manager::SessionManager;
pub use types::{PaneInfo, SendOptions, SessionRecord, SessionState, SyncReport};
