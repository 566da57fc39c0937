//! Agent registry: mapping agent keys to launchable definitions and probing
//! the host for which agents are actually installed.

pub mod builtin;
pub mod registry;
pub mod types;

pub use builtin::builtin_definitions;
pub use registry::AgentRegistry;
pub use types::{AgentDefinition, Capability, DetectedAgent, DetectionProbe};
