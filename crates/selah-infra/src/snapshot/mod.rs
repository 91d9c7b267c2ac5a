//! Snapshot stores for the rate-limit table.

mod file;
mod memory;

pub use file::JsonFileSnapshotStore;
pub use memory::InMemorySnapshotStore;
