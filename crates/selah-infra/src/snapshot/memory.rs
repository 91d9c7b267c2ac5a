//! In-memory snapshot store - used when `RATE_LIMIT_PERSIST=false` and in tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use selah_core::domain::EndpointTable;
use selah_core::ports::{SnapshotError, SnapshotStore};

/// Keeps the last saved table in memory.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    saved: RwLock<Option<EndpointTable>>,
    saves: AtomicUsize,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<Option<EndpointTable>, SnapshotError> {
        Ok(self.saved.read().await.clone())
    }

    async fn save(&self, table: &EndpointTable) -> Result<(), SnapshotError> {
        *self.saved.write().await = Some(table.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use selah_core::domain::CounterEntry;

    #[tokio::test]
    async fn test_load_returns_last_save() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load().await.unwrap().is_none());

        let mut table = EndpointTable::new();
        table.insert("feeling_get", "1.2.3.4", CounterEntry::start(Utc::now()));
        store.save(&table).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(table));
        assert_eq!(store.save_count(), 1);
    }
}
