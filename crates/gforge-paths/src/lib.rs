use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found — set $HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for the `~/.gforge/` directory layout.
///
/// Single source of truth for every path under `~/.gforge/`. Use `resolve()`
/// in production code and `from_dir()` in tests.
#[derive(Debug, Clone)]
pub struct GforgePaths {
    gforge_dir: PathBuf,
}

impl GforgePaths {
    /// Resolve paths from the user's home directory (`~/.gforge`).
    pub fn resolve() -> Result<Self, PathError> {
        let home = dirs::home_dir().ok_or(PathError::HomeNotFound)?;
        Ok(Self {
            gforge_dir: home.join(".gforge"),
        })
    }

    /// Create paths from an explicit base directory. Use in tests.
    pub fn from_dir(gforge_dir: PathBuf) -> Self {
        Self { gforge_dir }
    }

    /// The base `~/.gforge` directory.
    pub fn gforge_dir(&self) -> &Path {
        &self.gforge_dir
    }

    // --- Top-level subdirectories ---

    /// Base directory under which every goblin's worktree checkout lives.
    pub fn worktrees_dir(&self) -> PathBuf {
        self.gforge_dir.join("worktrees")
    }

    /// Directory holding per-session capture logs.
    pub fn logs_dir(&self) -> PathBuf {
        self.gforge_dir.join("logs")
    }

    // --- Top-level files ---

    /// The single-file goblin store.
    pub fn store_file(&self) -> PathBuf {
        self.gforge_dir.join("goblins.json")
    }

    pub fn daemon_socket(&self) -> PathBuf {
        self.gforge_dir.join("daemon.sock")
    }

    pub fn daemon_pid_file(&self) -> PathBuf {
        self.gforge_dir.join("daemon.pid")
    }

    // --- Parameterized paths ---

    /// Worktree checkout root for one goblin: `~/.gforge/worktrees/<goblin_id>`.
    pub fn worktree_dir(&self, goblin_id: &str) -> PathBuf {
        let safe_id = goblin_id.replace('/', "_");
        self.worktrees_dir().join(safe_id)
    }

    /// Append-only capture log for one session: `~/.gforge/logs/<session>.log`.
    pub fn capture_file(&self, session_name: &str) -> PathBuf {
        let safe_name = session_name.replace('/', "_");
        self.logs_dir().join(format!("{safe_name}.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_paths() -> GforgePaths {
        GforgePaths::from_dir(PathBuf::from("/home/user/.gforge"))
    }

    #[test]
    fn test_resolve_returns_ok_when_home_set() {
        // HOME is set in CI and dev environments
        let result = GforgePaths::resolve();
        assert!(result.is_ok());
        let paths = result.unwrap();
        assert!(paths.gforge_dir().to_string_lossy().contains(".gforge"));
    }

    #[test]
    fn test_from_dir() {
        let paths = GforgePaths::from_dir(PathBuf::from("/tmp/test-gforge"));
        assert_eq!(paths.gforge_dir(), Path::new("/tmp/test-gforge"));
    }

    #[test]
    fn test_worktrees_dir() {
        assert_eq!(
            test_paths().worktrees_dir(),
            PathBuf::from("/home/user/.gforge/worktrees")
        );
    }

    #[test]
    fn test_logs_dir() {
        assert_eq!(
            test_paths().logs_dir(),
            PathBuf::from("/home/user/.gforge/logs")
        );
    }

    #[test]
    fn test_store_file() {
        assert_eq!(
            test_paths().store_file(),
            PathBuf::from("/home/user/.gforge/goblins.json")
        );
    }

    #[test]
    fn test_daemon_socket() {
        assert_eq!(
            test_paths().daemon_socket(),
            PathBuf::from("/home/user/.gforge/daemon.sock")
        );
    }

    #[test]
    fn test_daemon_pid_file() {
        assert_eq!(
            test_paths().daemon_pid_file(),
            PathBuf::from("/home/user/.gforge/daemon.pid")
        );
    }

    #[test]
    fn test_worktree_dir() {
        assert_eq!(
            test_paths().worktree_dir("abc123"),
            PathBuf::from("/home/user/.gforge/worktrees/abc123")
        );
    }

    #[test]
    fn test_worktree_dir_sanitizes_slashes() {
        assert_eq!(
            test_paths().worktree_dir("a/b"),
            PathBuf::from("/home/user/.gforge/worktrees/a_b")
        );
    }

    #[test]
    fn test_capture_file() {
        assert_eq!(
            test_paths().capture_file("gf-coder-1a2b3c4d"),
            PathBuf::from("/home/user/.gforge/logs/gf-coder-1a2b3c4d.log")
        );
    }

    #[test]
    fn test_capture_file_sanitizes_slashes() {
        assert_eq!(
            test_paths().capture_file("gf/odd"),
            PathBuf::from("/home/user/.gforge/logs/gf_odd.log")
        );
    }

    #[test]
    fn test_path_error_message() {
        let err = PathError::HomeNotFound;
        let msg = err.to_string();
        assert!(msg.contains("home directory not found"));
        assert!(msg.contains("$HOME"));
    }
}
