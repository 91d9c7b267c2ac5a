//! JSON file snapshot store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use selah_core::domain::EndpointTable;
use selah_core::ports::{SnapshotError, SnapshotStore};

/// Stores the whole table as one JSON document.
///
/// Saves go to a sibling temp file that is flushed to disk and then renamed
/// over the target, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "rate_limits.json".into());
        name.push(format!(".tmp.{}", std::process::id()));
        self.path.with_file_name(name)
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn load(&self) -> Result<Option<EndpointTable>, SnapshotError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))
    }

    async fn save(&self, table: &EndpointTable) -> Result<(), SnapshotError> {
        let bytes =
            serde_json::to_vec(table).map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &bytes).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}
