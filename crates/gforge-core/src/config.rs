//! Runtime configuration for the core.
//!
//! Goblin Forge deliberately has no config-file layer of its own; callers
//! construct a `CoreConfig` (usually via [`CoreConfig::resolve`]) and hand it
//! to the coordinator. File-based configuration is an outer-layer concern.

use std::path::PathBuf;
use std::time::Duration;

use gforge_paths::{GforgePaths, PathError};

/// Socket label for the private multiplexer server. Sessions created under
/// this label are invisible to the user's own tmux server.
pub const DEFAULT_SOCKET_LABEL: &str = "gforge";

/// Prefix for derived goblin branches (`gf/<name>`).
pub const DEFAULT_BRANCH_PREFIX: &str = "gf";

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Label passed to `tmux -L` on every multiplexer call.
    pub socket_label: String,
    /// Prefix used when Spawn derives a branch from the goblin name.
    pub branch_prefix: String,
    /// Directory under which each goblin's worktree checkout is created.
    pub worktree_base: PathBuf,
    /// Directory holding per-session capture logs.
    pub capture_dir: PathBuf,
    /// Path of the single-file goblin store.
    pub store_path: PathBuf,
    /// Wall-clock limit for create-class substrate calls.
    pub create_timeout: Duration,
    /// Wall-clock limit for send- and query-class substrate calls.
    pub send_timeout: Duration,
}

impl CoreConfig {
    /// Build a config rooted at the user's `~/.gforge` directory.
    pub fn resolve() -> Result<Self, PathError> {
        Ok(Self::from_paths(&GforgePaths::resolve()?))
    }

    /// Build a config from an explicit path layout. Use in tests.
    pub fn from_paths(paths: &GforgePaths) -> Self {
        Self {
            socket_label: DEFAULT_SOCKET_LABEL.to_string(),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            worktree_base: paths.worktrees_dir(),
            capture_dir: paths.logs_dir(),
            store_path: paths.store_file(),
            create_timeout: Duration::from_secs(20),
            send_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paths_layout() {
        let paths = GforgePaths::from_dir(PathBuf::from("/home/user/.gforge"));
        let config = CoreConfig::from_paths(&paths);

        assert_eq!(config.socket_label, "gforge");
        assert_eq!(config.branch_prefix, "gf");
        assert_eq!(
            config.worktree_base,
            PathBuf::from("/home/user/.gforge/worktrees")
        );
        assert_eq!(config.capture_dir, PathBuf::from("/home/user/.gforge/logs"));
        assert_eq!(
            config.store_path,
            PathBuf::from("/home/user/.gforge/goblins.json")
        );
    }

    #[test]
    fn test_default_timeouts() {
        let paths = GforgePaths::from_dir(PathBuf::from("/tmp/.gforge"));
        let config = CoreConfig::from_paths(&paths);
        assert_eq!(config.create_timeout, Duration::from_secs(20));
        assert_eq!(config.send_timeout, Duration::from_secs(5));
    }
}
