//! gforge-core: Core library for coordinating concurrent CLI coding agents.
//!
//! This library provides the business logic for managing goblins (isolated
//! agent instances, each bound to its own git worktree and terminal
//! multiplexer session). It is used by the IPC daemon and the CLI.
//!
//! # Main Entry Points
//!
//! - [`coordinator`] - Spawn, observe, and tear down goblins
//! - [`tmux`] - Private multiplexer server and session lifecycle
//! - [`registry`] - Agent definitions and host detection
//! - [`goblins`] - Durable goblin records and the single-file store

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod escape;
pub mod goblins;
pub mod logging;
pub mod registry;
pub mod substrate;
pub mod tmux;

// Re-export newtypes and shared domain enums from gforge-protocol
pub use gforge_protocol::{BranchName, GoblinId, GoblinStatus, GoblinSummary, SessionName};

pub use config::CoreConfig;
pub use coordinator::{Coordinator, CoordinatorError, SpawnRequest};
pub use goblins::{Goblin, Store, StoreError};
pub use registry::{AgentDefinition, AgentRegistry, Capability, DetectedAgent, DetectionProbe};
pub use substrate::{SessionSubstrate, WorktreeSubstrate};
pub use tmux::{SendOptions, SessionManager, SessionRecord, SessionState, SyncReport, TmuxError};

// Re-export logging initialization
pub use logging::init_logging;
