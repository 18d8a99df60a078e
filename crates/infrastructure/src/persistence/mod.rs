//! Key-value store backends for the credential store.

mod file_store;
mod memory_store;

pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
