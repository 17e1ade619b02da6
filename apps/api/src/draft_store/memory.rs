use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::draft_store::{DraftStore, StoreError};
use crate::models::draft::Draft;

/// In-process draft store. Holds the serialized record, so a load returns
/// exactly what the file store would.
#[derive(Default)]
pub struct MemoryDraftStore {
    record: Mutex<Option<Vec<u8>>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn save(&self, draft: &Draft) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(draft)?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        Ok(())
    }

    async fn load(&self) -> Result<Option<Draft>, StoreError> {
        let record = self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match record {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
