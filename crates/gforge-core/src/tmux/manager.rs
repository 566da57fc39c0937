//! The session table and its lifecycle operations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{info, warn};

use crate::escape::{escape_literal, send_settle_delay};

use super::commands::TmuxCli;
use super::errors::TmuxError;
use super::types::{SendOptions, SessionRecord, SessionState, SyncReport};

/// One tracked session plus its dedicated send mutex.
///
/// The send mutex is the single most important correctness mechanism here:
/// concurrent callers targeting the same session serialize through it, so one
/// send's characters never interleave with another's.
struct SessionEntry {
    record: Mutex<SessionRecord>,
    send_lock: Mutex<()>,
}

/// Owns the private multiplexer server and every session created under it.
///
/// The table lock is held only for table reads and updates, never across a
/// tmux subprocess. Operations against different sessions never contend on
/// the send path.
pub struct SessionManager {
    cli: TmuxCli,
    capture_dir: PathBuf,
    table: RwLock<HashMap<String, Arc<SessionEntry>>>,
}

impl SessionManager {
    pub fn new(cli: TmuxCli, capture_dir: PathBuf) -> Self {
        Self {
            cli,
            capture_dir,
            table: RwLock::new(HashMap::new()),
        }
    }

    pub fn capture_dir(&self) -> &Path {
        &self.capture_dir
    }

    fn entry(&self, name: &str) -> Result<Arc<SessionEntry>, TmuxError> {
        self.table
            .read()
            .expect("session table lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| TmuxError::NotFound {
                name: name.to_string(),
            })
    }

    /// Create a detached session rooted at `working_dir` and start output
    /// capture.
    ///
    /// Capture is wired up after creation and before any command is sent so
    /// no initial output is lost. A capture failure degrades the session
    /// (snapshot-only output) rather than failing it.
    pub fn create(&self, name: &str, working_dir: &Path) -> Result<SessionRecord, TmuxError> {
        if self
            .table
            .read()
            .expect("session table lock poisoned")
            .contains_key(name)
        {
            return Err(TmuxError::AlreadyExists {
                name: name.to_string(),
            });
        }
        if self.cli.has_session(name)? {
            return Err(TmuxError::AlreadyExists {
                name: name.to_string(),
            });
        }
        if !working_dir.is_dir() {
            return Err(TmuxError::BadPath {
                path: working_dir.display().to_string(),
            });
        }

        self.cli.new_session(name, working_dir)?;

        let pane = match self.cli.pane_info(name) {
            Ok(pane) => Some(pane),
            Err(e) => {
                warn!(
                    event = "core.tmux.pane_info_failed",
                    session = name,
                    error = %e
                );
                None
            }
        };

        let capture_path = self.start_capture(name);

        let record = SessionRecord {
            name: name.to_string(),
            window_id: pane.as_ref().map(|p| p.window_id.clone()),
            pane_id: pane.as_ref().map(|p| p.pane_id.clone()),
            working_dir: working_dir.to_path_buf(),
            state: SessionState::Created,
            created_at: chrono::Utc::now().to_rfc3339(),
            capture_path,
        };

        self.table
            .write()
            .expect("session table lock poisoned")
            .insert(
                name.to_string(),
                Arc::new(SessionEntry {
                    record: Mutex::new(record.clone()),
                    send_lock: Mutex::new(()),
                }),
            );

        Ok(record)
    }

    /// Start `pipe-pane` capture for a session. Returns the capture path, or
    /// `None` when setup failed. The session stays usable either way.
    fn start_capture(&self, name: &str) -> Option<PathBuf> {
        if let Err(e) = std::fs::create_dir_all(&self.capture_dir) {
            warn!(
                event = "core.tmux.capture_dir_create_failed",
                session = name,
                capture_dir = %self.capture_dir.display(),
                error = %e,
                "Capture disabled for this session; output limited to pane snapshots"
            );
            return None;
        }

        let capture_path = self
            .capture_dir
            .join(format!("{}.log", name.replace('/', "_")));
        match self.cli.pipe_pane_start(name, &capture_path) {
            Ok(()) => Some(capture_path),
            Err(e) => {
                warn!(
                    event = "core.tmux.capture_start_failed",
                    session = name,
                    error = %e,
                    "Capture disabled for this session; output limited to pane snapshots"
                );
                None
            }
        }
    }

    /// Run a blocking attach client for the session. Returns when the user
    /// detaches.
    pub fn attach(&self, name: &str) -> Result<(), TmuxError> {
        let _ = self.entry(name)?;
        self.cli.attach_session(name)
    }

    /// Stop capture, kill the session, and drop it from the table.
    ///
    /// Acquires the session's send mutex first so an in-flight send (and its
    /// settle delay) completes before the session disappears. Idempotent:
    /// killing an unknown or already-dead session succeeds.
    pub fn kill(&self, name: &str) -> Result<(), TmuxError> {
        let entry = self
            .table
            .read()
            .expect("session table lock poisoned")
            .get(name)
            .cloned();

        if let Some(entry) = &entry {
            let _guard = entry.send_lock.lock().expect("send lock poisoned");
            if let Err(e) = self.cli.pipe_pane_stop(name) {
                warn!(
                    event = "core.tmux.capture_stop_failed",
                    session = name,
                    error = %e
                );
            }
            self.cli.kill_session(name)?;
        } else {
            // Untracked (e.g. adopted then restarted): still reap the server
            // side so kill stays idempotent.
            self.cli.kill_session(name)?;
        }

        self.table
            .write()
            .expect("session table lock poisoned")
            .remove(name);

        info!(event = "core.tmux.session_killed", session = name);
        Ok(())
    }

    /// Deliver `text` verbatim to the session's pane.
    ///
    /// Escaping happens here (backslash doubled, then newline substituted)
    /// and a settle delay follows unless suppressed, so back-to-back sends
    /// don't outrun the terminal.
    pub fn send_text(&self, name: &str, text: &str, opts: SendOptions) -> Result<(), TmuxError> {
        let entry = self.entry(name)?;
        let _guard = entry.send_lock.lock().expect("send lock poisoned");
        self.send_text_locked(name, text, opts)
    }

    fn send_text_locked(
        &self,
        name: &str,
        text: &str,
        opts: SendOptions,
    ) -> Result<(), TmuxError> {
        let escaped = escape_literal(text);
        self.cli.send_literal(name, &escaped)?;
        if !opts.suppress_delay {
            std::thread::sleep(send_settle_delay(text.len()));
        }
        Ok(())
    }

    /// Deliver a named key (Enter, C-c, Escape, ...). No settle delay.
    pub fn send_key(&self, name: &str, key: &str) -> Result<(), TmuxError> {
        let entry = self.entry(name)?;
        let _guard = entry.send_lock.lock().expect("send lock poisoned");
        self.cli.send_key(name, key)
    }

    /// Text followed by Enter, as one atomic unit under the send mutex.
    pub fn send_command(&self, name: &str, command: &str) -> Result<(), TmuxError> {
        let entry = self.entry(name)?;
        let _guard = entry.send_lock.lock().expect("send lock poisoned");
        self.send_text_locked(name, command, SendOptions::default())?;
        self.cli.send_key(name, "Enter")
    }

    /// Snapshot the last `lines` lines of the pane buffer. Distinct from the
    /// continuous capture file, and a pure observer.
    pub fn capture_pane(&self, name: &str, lines: u32) -> Result<String, TmuxError> {
        let _ = self.entry(name)?;
        self.cli.capture_pane(name, lines)
    }

    pub fn get(&self, name: &str) -> Option<SessionRecord> {
        self.table
            .read()
            .expect("session table lock poisoned")
            .get(name)
            .map(|e| e.record.lock().expect("record lock poisoned").clone())
    }

    pub fn list(&self) -> Vec<SessionRecord> {
        self.table
            .read()
            .expect("session table lock poisoned")
            .values()
            .map(|e| e.record.lock().expect("record lock poisoned").clone())
            .collect()
    }

    /// Whether the server currently has a session of this name, tracked or
    /// not.
    pub fn exists(&self, name: &str) -> Result<bool, TmuxError> {
        self.cli.has_session(name)
    }

    /// Whether the session's pane process has terminated.
    pub fn pane_dead(&self, name: &str) -> Result<bool, TmuxError> {
        Ok(self.cli.pane_info(name)?.dead)
    }

    /// PID of the session's pane process, if it is still running.
    pub fn pane_pid(&self, name: &str) -> Result<Option<i32>, TmuxError> {
        let pane = self.cli.pane_info(name)?;
        Ok(if pane.dead { None } else { pane.pid })
    }

    /// Suspend the pane's process with SIGSTOP.
    pub fn pause(&self, name: &str) -> Result<(), TmuxError> {
        self.signal_pane(name, nix::sys::signal::Signal::SIGSTOP)
    }

    /// Resume a paused pane process with SIGCONT.
    pub fn resume(&self, name: &str) -> Result<(), TmuxError> {
        self.signal_pane(name, nix::sys::signal::Signal::SIGCONT)
    }

    fn signal_pane(&self, name: &str, signal: nix::sys::signal::Signal) -> Result<(), TmuxError> {
        let _ = self.entry(name)?;
        let pane = self.cli.pane_info(name)?;
        let pid = match (pane.dead, pane.pid) {
            (false, Some(pid)) => pid,
            _ => {
                return Err(TmuxError::CommandFailed {
                    command: "signal".to_string(),
                    message: format!("session '{}' has no running pane process", name),
                });
            }
        };

        nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), signal).map_err(|e| {
            TmuxError::CommandFailed {
                command: "signal".to_string(),
                message: format!("failed to deliver {:?} to pid {}: {}", signal, pid, e),
            }
        })?;

        info!(
            event = "core.tmux.pane_signaled",
            session = name,
            pid = pid,
            signal = ?signal
        );
        Ok(())
    }

    /// Reconcile the in-memory table against the server's session list.
    ///
    /// Tracked sessions missing externally are marked `Dead`; external
    /// sessions we don't know are adopted with minimal metadata.
    pub fn sync(&self) -> Result<SyncReport, TmuxError> {
        let external: std::collections::HashSet<String> =
            self.cli.list_sessions()?.into_iter().collect();
        let mut report = SyncReport::default();

        {
            let table = self.table.read().expect("session table lock poisoned");
            for (name, entry) in table.iter() {
                if !external.contains(name) {
                    let mut record = entry.record.lock().expect("record lock poisoned");
                    if record.state != SessionState::Dead {
                        record.state = SessionState::Dead;
                        report.marked_dead.push(name.clone());
                    }
                }
            }
        }

        {
            let mut table = self.table.write().expect("session table lock poisoned");
            for name in &external {
                if !table.contains_key(name) {
                    let record = SessionRecord {
                        name: name.clone(),
                        window_id: None,
                        pane_id: None,
                        working_dir: PathBuf::new(),
                        state: SessionState::Created,
                        created_at: chrono::Utc::now().to_rfc3339(),
                        capture_path: None,
                    };
                    table.insert(
                        name.clone(),
                        Arc::new(SessionEntry {
                            record: Mutex::new(record),
                            send_lock: Mutex::new(()),
                        }),
                    );
                    report.adopted.push(name.clone());
                }
            }
        }

        if !report.adopted.is_empty() || !report.marked_dead.is_empty() {
            info!(
                event = "core.tmux.sync_completed",
                adopted = report.adopted.len(),
                marked_dead = report.marked_dead.len()
            );
        }
        Ok(report)
    }
}
