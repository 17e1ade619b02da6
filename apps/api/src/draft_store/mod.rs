//! Durable storage for the single in-progress draft.
//!
//! Exactly one record ("current draft") is ever resident. `save` overwrites
//! it wholesale, `load` returns it or `None`, `clear` deletes it. Errors are
//! returned to the caller; only the autosave path (see [`debounce`]) swallows
//! them.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::draft::Draft;

pub mod debounce;
pub mod file;
pub mod memory;

pub use debounce::Debouncer;
pub use file::FileDraftStore;
pub use memory::MemoryDraftStore;

/// Name of the collection holding the draft record.
pub const COLLECTION_NAME: &str = "formData";
/// Fixed key of the single draft record.
pub const RECORD_KEY: &str = "currentForm";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Draft record is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Carried in `AppState` as `Arc<dyn DraftStore>`.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save(&self, draft: &Draft) -> Result<(), StoreError>;

    async fn load(&self) -> Result<Option<Draft>, StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}
