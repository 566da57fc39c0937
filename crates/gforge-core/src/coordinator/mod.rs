//! The coordinator: goblin lifecycle over the session and worktree
//! substrates, with the store as the single source of truth.

pub mod errors;
mod lifecycle;
mod observe;
mod spawn;
mod sync;


use std::path::PathBuf;
use std::sync::Arc;

use gforge_git::WorktreeManager;
use gforge_protocol::SessionName;

use crate::config::CoreConfig;
use crate::goblins::{Goblin, Store};
use crate::registry::AgentRegistry;
use crate::substrate::{SessionSubstrate, WorktreeSubstrate};
use crate::tmux::{SessionManager, commands::TmuxCli};

pub use errors::CoordinatorError;

/// Everything Spawn needs from the caller. `branch` empty means "derive a
/// conventional one from the goblin name".
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub name: String,
    pub agent_key: String,
    pub project_path: PathBuf,
    pub branch: Option<String>,
}

/// Composes the registry, worktree manager, session manager, and store into
/// the goblin lifecycle. The only component with write access to the store.
pub struct Coordinator {
    pub(crate) sessions: Arc<dyn SessionSubstrate>,
    pub(crate) worktrees: Arc<dyn WorktreeSubstrate>,
    pub(crate) registry: Arc<AgentRegistry>,
    pub(crate) store: Store,
    pub(crate) config: CoreConfig,
}

impl Coordinator {
    /// Build a coordinator over explicit substrates. Tests hand in fakes;
    /// production normally goes through [`Coordinator::with_defaults`].
    pub fn new(
        sessions: Arc<dyn SessionSubstrate>,
        worktrees: Arc<dyn WorktreeSubstrate>,
        registry: Arc<AgentRegistry>,
        store: Store,
        config: CoreConfig,
    ) -> Self {
        Self {
            sessions,
            worktrees,
            registry,
            store,
            config,
        }
    }

    /// Build a coordinator wired to the real tmux and git substrates and the
    /// store at the configured path.
    pub fn with_defaults(config: CoreConfig) -> Result<Self, CoordinatorError> {
        let cli = TmuxCli::new(config.socket_label.clone())
            .with_timeouts(config.create_timeout, config.send_timeout);
        let sessions = Arc::new(SessionManager::new(cli, config.capture_dir.clone()));
        let worktrees = Arc::new(
            WorktreeManager::new(config.worktree_base.clone())
                .with_timeouts(config.create_timeout, config.send_timeout),
        );
        let registry = Arc::new(AgentRegistry::builtin());
        let store = Store::open(config.store_path.clone())?;
        Ok(Self::new(sessions, worktrees, registry, store, config))
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Resolve `name_or_id` to a goblin: the live goblin of that name first,
    /// falling back to a unique prefix match on the id.
    pub fn resolve(&self, name_or_id: &str) -> Result<Goblin, CoordinatorError> {
        if let Some(goblin) = self.store.find_live_by_name(name_or_id) {
            return Ok(goblin);
        }

        let mut matches = self.store.find_by_id_prefix(name_or_id);
        match matches.len() {
            0 => Err(CoordinatorError::NotFound {
                name: name_or_id.to_string(),
            }),
            1 => Ok(matches.remove(0)),
            n => Err(CoordinatorError::BadInput {
                message: format!("'{}' matches {} goblin ids, be more specific", name_or_id, n),
            }),
        }
    }

    /// Session name for a new goblin: readable, and suffixed with an id
    /// fragment so stopped goblins never collide with a successor of the
    /// same name.
    pub(crate) fn session_name_for(&self, name: &str, id: &str) -> SessionName {
        let short_id: String = id.chars().take(8).collect();
        SessionName::new(format!("gf-{}-{}", name, short_id))
    }
}
