//! Centralized tmux CLI wrappers.
//!
//! All production `std::process::Command::new("tmux")` calls live here. Every
//! invocation carries `-L <label>` so the private server's sessions never mix
//! with the user's default server, and `kill-server` against the label has a
//! bounded blast radius.

use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::errors::TmuxError;
use super::types::PaneInfo;

/// Session geometry for detached creation. Wide enough that full-screen
/// agents render without wrapping when later attached.
pub const SESSION_WIDTH: u32 = 200;
pub const SESSION_HEIGHT: u32 = 50;

/// Thin invoker for the private tmux server.
#[derive(Debug, Clone)]
pub struct TmuxCli {
    label: String,
    create_timeout: Duration,
    send_timeout: Duration,
}

impl TmuxCli {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            create_timeout: Duration::from_secs(20),
            send_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeouts(mut self, create: Duration, send: Duration) -> Self {
        self.create_timeout = create;
        self.send_timeout = send;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run `tmux -L <label> <args>` with a wall-clock timeout. On expiry the
    /// child is killed and `TmuxError::Timeout` is returned.
    fn run(&self, args: &[&str], timeout: Duration) -> Result<Output, TmuxError> {
        let mut child = Command::new("tmux")
            .arg("-L")
            .arg(&self.label)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TmuxError::CommandFailed {
                command: args.first().unwrap_or(&"tmux").to_string(),
                message: format!("Failed to execute tmux: {}", e),
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait().map_err(TmuxError::from)? {
                Some(_) => break,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(TmuxError::Timeout {
                        operation: args.first().unwrap_or(&"tmux").to_string(),
                        seconds: timeout.as_secs(),
                    });
                }
                None => std::thread::sleep(Duration::from_millis(10)),
            }
        }

        child.wait_with_output().map_err(TmuxError::from)
    }

    fn fail(command: &str, output: &Output) -> TmuxError {
        TmuxError::CommandFailed {
            command: command.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Create a detached session at the defined geometry with the given
    /// working directory.
    pub fn new_session(&self, name: &str, working_dir: &Path) -> Result<(), TmuxError> {
        info!(
            event = "core.tmux.new_session_started",
            session = name,
            working_dir = %working_dir.display()
        );

        let dir = working_dir.display().to_string();
        let width = SESSION_WIDTH.to_string();
        let height = SESSION_HEIGHT.to_string();
        let output = self.run(
            &[
                "new-session",
                "-d",
                "-s",
                name,
                "-c",
                dir.as_str(),
                "-x",
                width.as_str(),
                "-y",
                height.as_str(),
            ],
            self.create_timeout,
        )?;

        if output.status.success() {
            info!(event = "core.tmux.new_session_completed", session = name);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.to_lowercase().contains("duplicate session") {
            // Lost a create race against another caller
            return Err(TmuxError::AlreadyExists {
                name: name.to_string(),
            });
        }
        Err(Self::fail("new-session", &output))
    }

    /// Kill a session. "No such session" class failures are benign so the
    /// operation is idempotent.
    pub fn kill_session(&self, name: &str) -> Result<(), TmuxError> {
        let output = self.run(&["kill-session", "-t", name], self.create_timeout)?;
        if output.status.success() {
            info!(event = "core.tmux.kill_session_completed", session = name);
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let lowered = stderr.to_lowercase();
        let benign = ["no such session", "can't find session", "no server running"];
        if benign.iter().any(|p| lowered.contains(p)) {
            debug!(event = "core.tmux.kill_session_already_gone", session = name);
            Ok(())
        } else {
            Err(Self::fail("kill-session", &output))
        }
    }

    pub fn has_session(&self, name: &str) -> Result<bool, TmuxError> {
        // has-session exits nonzero both for "missing" and "no server yet";
        // either way the session does not exist.
        let output = self.run(&["has-session", "-t", name], self.send_timeout)?;
        Ok(output.status.success())
    }

    /// Names of all sessions on the private server. An absent server means
    /// an empty list, not an error.
    pub fn list_sessions(&self) -> Result<Vec<String>, TmuxError> {
        let output = self.run(
            &["list-sessions", "-F", "#{session_name}"],
            self.send_timeout,
        )?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
            if stderr.contains("no server running") || stderr.contains("error connecting") {
                return Ok(Vec::new());
            }
            return Err(Self::fail("list-sessions", &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    /// Window/pane identifiers and liveness for a session's single pane.
    pub fn pane_info(&self, name: &str) -> Result<PaneInfo, TmuxError> {
        let output = self.run(
            &[
                "list-panes",
                "-t",
                name,
                "-F",
                "#{window_id} #{pane_id} #{pane_dead} #{pane_pid}",
            ],
            self.send_timeout,
        )?;
        if !output.status.success() {
            return Err(Self::fail("list-panes", &output));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.lines().next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();
        let window_id = parts.next().unwrap_or("").to_string();
        let pane_id = parts.next().unwrap_or("").to_string();
        let dead = parts.next().map(|v| v != "0").unwrap_or(true);
        let pid = parts.next().and_then(|v| v.parse::<i32>().ok());

        Ok(PaneInfo {
            window_id,
            pane_id,
            dead,
            pid,
        })
    }

    /// Start appending everything written to the pane into `capture_path`.
    ///
    /// `-o` keeps an existing pipe open instead of toggling it off, so a
    /// repeated start is harmless.
    pub fn pipe_pane_start(&self, name: &str, capture_path: &Path) -> Result<(), TmuxError> {
        let sink = format!("cat >> '{}'", capture_path.display());
        let output = self.run(
            &["pipe-pane", "-t", name, "-o", sink.as_str()],
            self.send_timeout,
        )?;
        if output.status.success() {
            info!(
                event = "core.tmux.pipe_pane_started",
                session = name,
                capture = %capture_path.display()
            );
            Ok(())
        } else {
            Err(Self::fail("pipe-pane", &output))
        }
    }

    /// Stop the pane's output pipe. Best-effort before kill.
    pub fn pipe_pane_stop(&self, name: &str) -> Result<(), TmuxError> {
        let output = self.run(&["pipe-pane", "-t", name], self.send_timeout)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Self::fail("pipe-pane", &output))
        }
    }

    /// Deliver pre-escaped text via literal-input mode. `--` terminates
    /// option parsing so text starting with `-` survives.
    pub fn send_literal(&self, name: &str, escaped: &str) -> Result<(), TmuxError> {
        let output = self.run(
            &["send-keys", "-t", name, "-l", "--", escaped],
            self.send_timeout,
        )?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Self::fail("send-keys", &output))
        }
    }

    /// Deliver a named key (Enter, C-c, Escape, ...) through tmux's key-name
    /// grammar, never literally.
    pub fn send_key(&self, name: &str, key: &str) -> Result<(), TmuxError> {
        let output = self.run(&["send-keys", "-t", name, key], self.send_timeout)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Self::fail("send-keys", &output))
        }
    }

    /// Snapshot the last `lines` lines of the pane buffer.
    pub fn capture_pane(&self, name: &str, lines: u32) -> Result<String, TmuxError> {
        let start = format!("-{}", lines);
        let output = self.run(
            &["capture-pane", "-t", name, "-p", "-S", start.as_str()],
            self.send_timeout,
        )?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Self::fail("capture-pane", &output))
        }
    }

    /// Run a blocking attach client wired to the caller's terminal. Returns
    /// when the user detaches. Deliberately unbounded: attach has no timeout.
    pub fn attach_session(&self, name: &str) -> Result<(), TmuxError> {
        info!(event = "core.tmux.attach_started", session = name);

        let status = Command::new("tmux")
            .arg("-L")
            .arg(&self.label)
            .args(["attach-session", "-t", name])
            .status()
            .map_err(|e| TmuxError::CommandFailed {
                command: "attach-session".to_string(),
                message: format!("Failed to execute tmux: {}", e),
            })?;

        if status.success() {
            info!(event = "core.tmux.attach_completed", session = name);
            Ok(())
        } else {
            warn!(
                event = "core.tmux.attach_failed",
                session = name,
                code = status.code().unwrap_or(-1)
            );
            Err(TmuxError::CommandFailed {
                command: "attach-session".to_string(),
                message: format!("exit code {}", status.code().unwrap_or(-1)),
            })
        }
    }
}
