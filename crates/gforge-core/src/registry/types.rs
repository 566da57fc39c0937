//! Agent definition types.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Abstract capability tags an agent advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Code,
    Git,
    Web,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Code => write!(f, "code"),
            Capability::Git => write!(f, "git"),
            Capability::Web => write!(f, "web"),
        }
    }
}

/// How to detect an installed agent on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionProbe {
    /// Binary that must resolve on `PATH`.
    pub binary: String,
    /// Optional version command (e.g. `["--version"]`). When non-empty the
    /// probe only succeeds if this command exits successfully; its first
    /// output line becomes the discovered version string.
    #[serde(default)]
    pub version_args: Vec<String>,
}

/// A launchable agent definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    /// Registry key, lowercase (e.g. `"claude"`, `"aider"`).
    pub key: String,
    pub display_name: String,
    /// Executable to launch inside the goblin's session.
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment overrides applied as `KEY=value` assignments on the
    /// launch command line.
    #[serde(default)]
    pub env: Vec<(String, String)>,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
    pub probe: DetectionProbe,
    /// One-line install instruction shown for missing agents.
    pub install_hint: String,
}

impl AgentDefinition {
    /// Render the single command line submitted to a goblin's session.
    ///
    /// Environment overrides become POSIX prefix assignments; every token is
    /// quoted so spaces and shell metacharacters survive the shell.
    pub fn launch_command_line(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.env.len() + self.args.len());
        for (key, value) in &self.env {
            parts.push(format!("{}={}", key, shell_quote(value)));
        }
        parts.push(shell_quote(&self.command));
        for arg in &self.args {
            parts.push(shell_quote(arg));
        }
        parts.join(" ")
    }
}

/// Quote a token for a POSIX shell command line.
///
/// Plain tokens pass through untouched; anything else is single-quoted with
/// embedded single quotes spliced as `'\''`.
pub fn shell_quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:@+%,".contains(c));
    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', "'\\''"))
    }
}

/// A definition whose probe succeeded on this host.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedAgent {
    pub definition: AgentDefinition,
    pub binary_path: PathBuf,
    pub version: Option<String>,
}
