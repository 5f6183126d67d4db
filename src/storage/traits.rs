//! Storage trait definitions

use crate::model::{CopurchaseModel, ModelId};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for model storage backends
///
/// Implementations must be thread-safe (Send + Sync) to support
/// concurrent access from multiple threads. Models are immutable values,
/// so `save_model` replaces any previous version wholesale.
pub trait ModelStore: Send + Sync {
    /// Persist a model, replacing any stored model with the same ID
    fn save_model(&self, model: &CopurchaseModel) -> StorageResult<()>;

    /// Load a model by ID
    fn load_model(&self, id: &ModelId) -> StorageResult<Option<CopurchaseModel>>;

    /// Delete a model and all its count rows
    fn delete_model(&self, id: &ModelId) -> StorageResult<bool>;

    /// List all stored model IDs
    fn list_models(&self) -> StorageResult<Vec<ModelId>>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: ModelStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
