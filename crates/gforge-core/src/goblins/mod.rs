//! Goblin records and the durable single-file store.

pub mod store;
pub mod types;

pub use store::{Store, StoreError};
pub use types::Goblin;
