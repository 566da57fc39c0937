//! gforge-git: ephemeral worktree checkouts for Goblin Forge.
//!
//! Each goblin gets a linked worktree of the host repository, bound to its
//! own branch, so concurrent agents never collide on working-copy state.
//! Worktree add/remove and diff queries shell out to the git CLI; repository
//! discovery and branch queries use git2 in-process.

pub mod cli;
pub mod errors;
pub mod manager;
pub mod project;
pub mod test_support;

pub use errors::GitError;
pub use manager::{WorktreeManager, WorktreeRecord};
