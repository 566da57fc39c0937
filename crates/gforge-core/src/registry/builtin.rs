//! Built-in agent definitions.
//!
//! Custom agents from user configuration are layered on top of these by
//! `AgentRegistry::with_custom`; the set below is what ships.

use std::collections::BTreeSet;

use super::types::{AgentDefinition, Capability, DetectionProbe};

fn def(
    key: &str,
    display_name: &str,
    command: &str,
    args: &[&str],
    capabilities: &[Capability],
    version_args: &[&str],
    install_hint: &str,
) -> AgentDefinition {
    AgentDefinition {
        key: key.to_string(),
        display_name: display_name.to_string(),
        command: command.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        env: vec![],
        capabilities: BTreeSet::from_iter(capabilities.iter().copied()),
        probe: DetectionProbe {
            binary: command.to_string(),
            version_args: version_args.iter().map(|a| a.to_string()).collect(),
        },
        install_hint: install_hint.to_string(),
    }
}

/// All agents Goblin Forge knows out of the box.
pub fn builtin_definitions() -> Vec<AgentDefinition> {
    use Capability::{Code, Git, Web};
    vec![
        def(
            "claude",
            "Claude Code",
            "claude",
            &[],
            &[Code, Git, Web],
            &["--version"],
            "npm install -g @anthropic-ai/claude-code",
        ),
        def(
            "aider",
            "Aider",
            "aider",
            &[],
            &[Code, Git],
            &["--version"],
            "pipx install aider-chat",
        ),
        def(
            "codex",
            "Codex CLI",
            "codex",
            &[],
            &[Code, Git],
            &["--version"],
            "npm install -g @openai/codex",
        ),
        def(
            "gemini",
            "Gemini CLI",
            "gemini",
            &[],
            &[Code, Git, Web],
            &["--version"],
            "npm install -g @google/gemini-cli",
        ),
        def(
            "ollama",
            "Ollama",
            "ollama",
            &["run", "llama3"],
            &[Code],
            &["--version"],
            "https://ollama.com/download",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_are_unique_and_lowercase() {
        let defs = builtin_definitions();
        let mut keys: Vec<&str> = defs.iter().map(|d| d.key.as_str()).collect();
        let len = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), len, "duplicate builtin agent key");
        for def in &defs {
            assert_eq!(def.key, def.key.to_lowercase());
        }
    }

    #[test]
    fn test_builtin_contains_expected_agents() {
        let defs = builtin_definitions();
        for key in ["claude", "aider", "codex", "gemini", "ollama"] {
            assert!(
                defs.iter().any(|d| d.key == key),
                "builtin registry should contain '{}'",
                key
            );
        }
    }

    #[test]
    fn test_every_builtin_has_probe_and_hint() {
        for def in builtin_definitions() {
            assert!(!def.probe.binary.is_empty(), "{} has no probe", def.key);
            assert!(
                !def.install_hint.is_empty(),
                "{} has no install hint",
                def.key
            );
            assert!(!def.capabilities.is_empty(), "{} has no tags", def.key);
        }
    }

    #[test]
    fn test_claude_launch_command() {
        let defs = builtin_definitions();
        let claude = defs.iter().find(|d| d.key == "claude").unwrap();
        assert_eq!(claude.launch_command_line(), "claude");
    }

    #[test]
    fn test_ollama_launch_command_includes_model() {
        let defs = builtin_definitions();
        let ollama = defs.iter().find(|d| d.key == "ollama").unwrap();
        assert_eq!(ollama.launch_command_line(), "ollama run llama3");
    }
}
