//! Centralized git CLI wrappers.
//!
//! All production `std::process::Command::new("git")` calls in gforge-git live
//! here. Each function validates arguments, logs structured events, and maps
//! errors consistently.
//!
//! **Why CLI instead of git2?** Worktree add/remove respects the host
//! repository's own locking, and diff output here is rendered for humans, so
//! the CLI's text is exactly what callers want. git2 is still used for
//! in-process queries (see `project.rs`).

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::errors::GitError;

/// Validate a git argument to prevent injection.
///
/// Rejects values that start with `-` (option injection), contain control
/// characters, or contain `::` sequences (refspec injection).
pub fn validate_git_arg(value: &str, label: &str) -> Result<(), GitError> {
    if value.starts_with('-') {
        return Err(GitError::OperationFailed {
            message: format!("Invalid {label}: '{value}' (must not start with '-')"),
        });
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(GitError::OperationFailed {
            message: format!("Invalid {label}: contains control characters"),
        });
    }
    if value.contains("::") {
        return Err(GitError::OperationFailed {
            message: format!("Invalid {label}: '::' sequences are not allowed"),
        });
    }
    Ok(())
}

/// Run `git` in `dir` with a wall-clock timeout.
///
/// The child is polled rather than waited on so a hung repository tool cannot
/// block the caller past `timeout`; on expiry the child is killed and
/// `GitError::Timeout` is returned.
pub fn run_git(dir: &Path, args: &[&str], timeout: Duration) -> Result<Output, GitError> {
    let mut child = Command::new("git")
        .current_dir(dir)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| GitError::OperationFailed {
            message: format!("Failed to execute git in {}: {}", dir.display(), e),
        })?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait().map_err(GitError::from)? {
            Some(_) => break,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GitError::Timeout {
                    operation: args.first().unwrap_or(&"git").to_string(),
                    seconds: timeout.as_secs(),
                });
            }
            None => std::thread::sleep(Duration::from_millis(10)),
        }
    }

    child.wait_with_output().map_err(GitError::from)
}

/// Create a linked worktree at `path`, creating `branch` when `new_branch` is
/// set and checking out the existing branch otherwise.
///
/// Distinguishes BranchBusy (branch checked out elsewhere) from PathCollision
/// (target already registered) so callers can produce actionable errors.
pub fn worktree_add(
    repo: &Path,
    path: &Path,
    branch: &str,
    new_branch: bool,
    timeout: Duration,
) -> Result<(), GitError> {
    validate_git_arg(branch, "branch name")?;

    info!(
        event = "git.cli.worktree_add_started",
        repo = %repo.display(),
        path = %path.display(),
        branch = branch,
        new_branch = new_branch
    );

    let path_str = path.display().to_string();
    let args: Vec<&str> = if new_branch {
        vec!["worktree", "add", "-b", branch, path_str.as_str()]
    } else {
        vec!["worktree", "add", path_str.as_str(), branch]
    };

    let output = run_git(repo, &args, timeout)?;
    if output.status.success() {
        info!(
            event = "git.cli.worktree_add_completed",
            path = %path.display(),
            branch = branch
        );
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lowered = stderr.to_lowercase();

    if lowered.contains("already checked out") || lowered.contains("already used by worktree") {
        warn!(
            event = "git.cli.worktree_add_branch_busy",
            branch = branch,
            stderr = %stderr.trim()
        );
        return Err(GitError::BranchBusy {
            branch: branch.to_string(),
            message: stderr.trim().to_string(),
        });
    }
    if lowered.contains("already exists") {
        warn!(
            event = "git.cli.worktree_add_path_collision",
            path = %path.display(),
            stderr = %stderr.trim()
        );
        return Err(GitError::PathCollision {
            path: path.display().to_string(),
        });
    }

    warn!(
        event = "git.cli.worktree_add_failed",
        branch = branch,
        stderr = %stderr.trim()
    );
    Err(GitError::OperationFailed {
        message: format!(
            "git worktree add failed (exit {}): {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        ),
    })
}

/// Deregister and delete a linked worktree. Idempotent: "not a working tree"
/// class failures are treated as already-removed.
pub fn worktree_remove(repo: &Path, path: &Path, timeout: Duration) -> Result<(), GitError> {
    info!(
        event = "git.cli.worktree_remove_started",
        repo = %repo.display(),
        path = %path.display()
    );

    let path_str = path.display().to_string();
    let output = run_git(
        repo,
        &["worktree", "remove", "--force", path_str.as_str()],
        timeout,
    )?;

    if output.status.success() {
        info!(event = "git.cli.worktree_remove_completed", path = %path.display());
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lowered = stderr.to_lowercase();

    // Already-gone worktrees are a success for removal purposes.
    let benign_patterns = ["is not a working tree", "no such file or directory"];
    if benign_patterns.iter().any(|p| lowered.contains(p)) {
        info!(event = "git.cli.worktree_remove_already_gone", path = %path.display());
        return Ok(());
    }

    warn!(
        event = "git.cli.worktree_remove_failed",
        path = %path.display(),
        stderr = %stderr.trim()
    );
    Err(GitError::WorktreeRemovalFailed {
        path: path.display().to_string(),
        message: stderr.trim().to_string(),
    })
}

/// Drop stale administrative entries for worktrees whose directories are gone.
pub fn worktree_prune(repo: &Path, timeout: Duration) -> Result<(), GitError> {
    let output = run_git(repo, &["worktree", "prune"], timeout)?;
    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(GitError::OperationFailed {
            message: format!("git worktree prune failed: {}", stderr.trim()),
        })
    }
}

/// Checkout root of the repository that owns a linked worktree.
///
/// From inside a worktree, `--git-common-dir` points at the host
/// repository's `.git` directory even when the worktree's own table record
/// is long gone (e.g. after a coordinator restart).
pub fn common_repo_root(worktree: &Path, timeout: Duration) -> Result<PathBuf, GitError> {
    let output = run_git(worktree, &["rev-parse", "--git-common-dir"], timeout)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::OperationFailed {
            message: format!("git rev-parse --git-common-dir failed: {}", stderr.trim()),
        });
    }

    let common = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let common_dir = if Path::new(&common).is_absolute() {
        PathBuf::from(common)
    } else {
        worktree.join(common)
    };
    common_dir
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| GitError::OperationFailed {
            message: format!("unexpected --git-common-dir output: {}", common_dir.display()),
        })
}

/// Merge base of HEAD with its upstream, falling back to `HEAD` when the
/// branch has no upstream yet (fresh goblin branches never do).
pub fn merge_base_with_upstream(dir: &Path, timeout: Duration) -> Result<String, GitError> {
    let output = run_git(dir, &["merge-base", "HEAD", "@{upstream}"], timeout)?;
    if output.status.success() {
        let base = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !base.is_empty() {
            return Ok(base);
        }
    }
    Ok("HEAD".to_string())
}

/// Paths changed in the working tree relative to `base`, staged and unstaged
/// collapsed into one set.
pub fn diff_name_only(dir: &Path, base: &str, timeout: Duration) -> Result<Vec<String>, GitError> {
    let output = run_git(dir, &["diff", "--name-only", base], timeout)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::DiffFailed {
            message: stderr.trim().to_string(),
        });
    }
    Ok(lines_of(&output.stdout))
}

/// Untracked (but not ignored) files in the working tree.
pub fn untracked_files(dir: &Path, timeout: Duration) -> Result<Vec<String>, GitError> {
    let output = run_git(
        dir,
        &["ls-files", "--others", "--exclude-standard"],
        timeout,
    )?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::DiffFailed {
            message: stderr.trim().to_string(),
        });
    }
    Ok(lines_of(&output.stdout))
}

/// Unified diff text for the working tree, staged changes only when
/// `staged_only` is set.
pub fn diff(dir: &Path, staged_only: bool, timeout: Duration) -> Result<String, GitError> {
    let args: &[&str] = if staged_only {
        &["diff", "--staged"]
    } else {
        &["diff"]
    };
    let output = run_git(dir, args, timeout)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::DiffFailed {
            message: stderr.trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn lines_of(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
