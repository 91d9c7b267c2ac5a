use async_trait::async_trait;

use crate::domain::EndpointTable;

/// Durable storage for the whole rate-limit table.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved table. `Ok(None)` when nothing was saved yet.
    async fn load(&self) -> Result<Option<EndpointTable>, SnapshotError>;

    /// Replace the stored table with `table`.
    async fn save(&self, table: &EndpointTable) -> Result<(), SnapshotError>;
}

/// Snapshot I/O errors.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization failed: {0}")]
    Serialization(String),
}
