use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::draft_store::{DraftStore, StoreError, COLLECTION_NAME, RECORD_KEY};
use crate::models::draft::Draft;

/// Filesystem-backed draft store.
///
/// Layout: `<root>/formData/currentForm.json`. The collection directory is
/// created once, on the first operation. Writes go to a temp file in the
/// collection, are fsynced and then renamed over the record, so a save is
/// durable and all-or-nothing before it resolves.
pub struct FileDraftStore {
    root: PathBuf,
    collection: OnceCell<PathBuf>,
}

impl FileDraftStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            collection: OnceCell::new(),
        }
    }

    pub fn record_path(&self) -> PathBuf {
        self.root
            .join(COLLECTION_NAME)
            .join(format!("{RECORD_KEY}.json"))
    }

    /// Resolves the collection directory, running the one-time schema step.
    async fn open(&self) -> Result<&Path, StoreError> {
        let dir = self
            .collection
            .get_or_try_init(|| async {
                let dir = self.root.join(COLLECTION_NAME);
                if !tokio::fs::try_exists(&dir).await? {
                    info!("Creating draft collection at {}", dir.display());
                    tokio::fs::create_dir_all(&dir).await?;
                }
                Ok::<_, StoreError>(dir)
            })
            .await?;
        Ok(dir.as_path())
    }
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn save(&self, draft: &Draft) -> Result<(), StoreError> {
        let dir = self.open().await?.to_path_buf();
        let record = self.record_path();
        let bytes = serde_json::to_vec_pretty(draft)?;

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&record).map_err(|e| e.error)?;
            Ok(())
        })
        .await??;

        debug!("Draft saved");
        Ok(())
    }

    async fn load(&self) -> Result<Option<Draft>, StoreError> {
        self.open().await?;
        match tokio::fs::read(self.record_path()).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.open().await?;
        match tokio::fs::remove_file(self.record_path()).await {
            Ok(()) => {
                debug!("Draft cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
