//! PID file handling: one daemon per user.

use std::path::Path;

use tracing::warn;

/// Returns the pid of a live daemon recorded at `pid_path`, if any.
///
/// A stale file (unparseable, or pointing at a dead process) is treated as
/// no daemon running and removed.
pub fn check_daemon_running(pid_path: &Path) -> Option<u32> {
    let content = std::fs::read_to_string(pid_path).ok()?;
    let pid: u32 = match content.trim().parse() {
        Ok(pid) => pid,
        Err(_) => {
            warn!(
                event = "daemon.pid.stale_unparseable",
                path = %pid_path.display()
            );
            let _ = std::fs::remove_file(pid_path);
            return None;
        }
    };

    if process_alive(pid) {
        Some(pid)
    } else {
        warn!(event = "daemon.pid.stale_dead_process", pid = pid);
        let _ = std::fs::remove_file(pid_path);
        None
    }
}

/// Signal 0 probes process existence without touching it.
fn process_alive(pid: u32) -> bool {
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None).is_ok()
}

pub fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = pid_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(pid_path, std::process::id().to_string())
}

pub fn remove_pid_file(pid_path: &Path) {
    if pid_path.exists()
        && let Err(e) = std::fs::remove_file(pid_path)
    {
        warn!(
            event = "daemon.pid.cleanup_failed",
            path = %pid_path.display(),
            error = %e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_check_sees_current_process() {
        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("daemon.pid");

        write_pid_file(&pid_path).unwrap();
        assert_eq!(check_daemon_running(&pid_path), Some(std::process::id()));
    }

    #[test]
    fn test_missing_file_means_not_running() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(check_daemon_running(&dir.path().join("absent.pid")), None);
    }

    #[test]
    fn test_unparseable_file_is_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let pid_path = dir.path().join("daemon.pid");
        std::fs::write(&pid_path, "not-a-pid").unwrap();

        assert_eq!(check_daemon_running(&pid_path), None);
        assert!(!pid_path.exists());
    }

    #[test]
    fn test_remove_pid_file_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        remove_pid_file(&dir.path().join("absent.pid"));
    }
}
