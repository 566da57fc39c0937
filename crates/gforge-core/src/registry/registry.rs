//! Key -> definition lookup and host probing.

use std::collections::BTreeMap;
use std::process::Command;

use tracing::{debug, warn};

use super::builtin::builtin_definitions;
use super::types::{AgentDefinition, DetectedAgent};

/// Read-only registry of agent definitions, keyed by lowercase agent key.
///
/// Built-ins are loaded at construction; user-defined agents are layered on
/// top (last writer wins per key). The coordinator never mutates this;
/// editing custom entries is a configuration-time concern.
pub struct AgentRegistry {
    definitions: BTreeMap<String, AgentDefinition>,
}

impl AgentRegistry {
    /// Registry with only the built-in agents.
    pub fn builtin() -> Self {
        Self::with_custom(Vec::new())
    }

    /// Registry with built-ins plus user-defined agents. A custom definition
    /// whose key matches a built-in replaces it.
    pub fn with_custom(custom: Vec<AgentDefinition>) -> Self {
        let mut definitions = BTreeMap::new();
        for def in builtin_definitions().into_iter().chain(custom) {
            definitions.insert(def.key.to_lowercase(), def);
        }
        Self { definitions }
    }

    /// Look up a definition by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&AgentDefinition> {
        self.definitions.get(&key.to_lowercase())
    }

    /// All known definitions, ordered by key.
    pub fn list(&self) -> Vec<&AgentDefinition> {
        self.definitions.values().collect()
    }

    /// Comma-separated keys for error messages.
    pub fn known_keys(&self) -> String {
        self.definitions
            .keys()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Definitions whose detection probe succeeds on this host, annotated
    /// with the resolved binary path and version string.
    pub fn scan(&self) -> Vec<DetectedAgent> {
        self.definitions
            .values()
            .filter_map(|def| probe(def))
            .collect()
    }

    /// Complement of `scan()`: known agents not installed here. The
    /// definition's `install_hint` tells the operator what to do about it.
    pub fn not_installed(&self) -> Vec<&AgentDefinition> {
        self.definitions
            .values()
            .filter(|def| probe(def).is_none())
            .collect()
    }
}

/// Run one definition's probe: the binary must resolve on PATH, and the
/// version command (when configured) must exit successfully.
fn probe(def: &AgentDefinition) -> Option<DetectedAgent> {
    let binary_path = match which::which(&def.probe.binary) {
        Ok(path) => path,
        Err(_) => {
            debug!(
                event = "core.registry.probe_binary_missing",
                agent = %def.key,
                binary = %def.probe.binary
            );
            return None;
        }
    };

    let version = if def.probe.version_args.is_empty() {
        None
    } else {
        match Command::new(&binary_path).args(&def.probe.version_args).output() {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                stdout.lines().next().map(|l| l.trim().to_string())
            }
            Ok(output) => {
                warn!(
                    event = "core.registry.probe_version_failed",
                    agent = %def.key,
                    code = output.status.code().unwrap_or(-1)
                );
                return None;
            }
            Err(e) => {
                warn!(
                    event = "core.registry.probe_version_failed",
                    agent = %def.key,
                    error = %e
                );
                return None;
            }
        }
    };

    Some(DetectedAgent {
        definition: def.clone(),
        binary_path,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::types::{Capability, DetectionProbe};
    use std::collections::BTreeSet;

    fn custom_def(key: &str, command: &str) -> AgentDefinition {
        AgentDefinition {
            key: key.to_string(),
            display_name: key.to_string(),
            command: command.to_string(),
            args: vec![],
            env: vec![],
            capabilities: BTreeSet::from([Capability::Code]),
            probe: DetectionProbe {
                binary: command.to_string(),
                version_args: vec![],
            },
            install_hint: format!("install {}", key),
        }
    }

    #[test]
    fn test_get_known_agent() {
        let registry = AgentRegistry::builtin();
        let claude = registry.get("claude");
        assert!(claude.is_some());
        assert_eq!(claude.unwrap().command, "claude");
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let registry = AgentRegistry::builtin();
        assert!(registry.get("Claude").is_some());
        assert!(registry.get("AIDER").is_some());
    }

    #[test]
    fn test_get_unknown_agent() {
        let registry = AgentRegistry::builtin();
        assert!(registry.get("unknown").is_none());
        assert!(registry.get("").is_none());
    }

    #[test]
    fn test_list_is_ordered_by_key() {
        let registry = AgentRegistry::builtin();
        let keys: Vec<&str> = registry.list().iter().map(|d| d.key.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_custom_agent_extends_builtins() {
        let registry = AgentRegistry::with_custom(vec![custom_def("myagent", "my-agent")]);
        assert!(registry.get("myagent").is_some());
        assert!(registry.get("claude").is_some());
    }

    #[test]
    fn test_custom_agent_overrides_builtin_key() {
        let mut custom = custom_def("claude", "claude-nightly");
        custom.display_name = "Claude Nightly".to_string();
        let registry = AgentRegistry::with_custom(vec![custom]);
        assert_eq!(registry.get("claude").unwrap().command, "claude-nightly");
    }

    #[test]
    fn test_known_keys_lists_all() {
        let registry = AgentRegistry::builtin();
        let keys = registry.known_keys();
        assert!(keys.contains("claude"));
        assert!(keys.contains("aider"));
        assert!(keys.contains(", "));
    }

    #[test]
    fn test_scan_detects_a_real_binary() {
        // `sh` exists on any Unix host this test runs on; probing it stands
        // in for a real agent install.
        let registry = AgentRegistry::with_custom(vec![custom_def("shell", "sh")]);
        let detected = registry.scan();
        assert!(detected.iter().any(|d| d.definition.key == "shell"));
        let shell = detected
            .iter()
            .find(|d| d.definition.key == "shell")
            .unwrap();
        assert!(shell.binary_path.ends_with("sh"));
        assert!(shell.version.is_none());
    }

    #[test]
    fn test_not_installed_reports_missing_binary() {
        let registry = AgentRegistry::with_custom(vec![custom_def(
            "ghost",
            "gforge-definitely-not-installed",
        )]);
        let missing = registry.not_installed();
        assert!(missing.iter().any(|d| d.key == "ghost"));
        let ghost = missing.iter().find(|d| d.key == "ghost").unwrap();
        assert_eq!(ghost.install_hint, "install ghost");
    }

    #[test]
    fn test_scan_and_not_installed_partition_the_registry() {
        let registry = AgentRegistry::builtin();
        let detected = registry.scan().len();
        let missing = registry.not_installed().len();
        assert_eq!(detected + missing, registry.list().len());
    }
}
