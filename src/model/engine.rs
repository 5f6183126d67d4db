//! CopraEngine: the main entry point for building and querying models

use super::item::ItemId;
use super::model::{CopurchaseModel, ModelId};
use crate::recommend::{Recommendation, RecommendError, RecommendQuery};
use crate::storage::{ModelStore, StorageError};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur in Copra operations
#[derive(Debug, Error)]
pub enum CopraError {
    #[error("Model not found: {0}")]
    ModelNotFound(ModelId),

    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Copra operations
pub type CopraResult<T> = Result<T, CopraError>;

/// The main Copra engine
///
/// Registry of built models, handing out shared read access for
/// recommendation calls. Models are immutable, so concurrent queries need
/// no locking: every `get_model` returns an `Arc` clone of the same value.
/// With a backing store attached, inserted models are persisted and
/// `load_all` rehydrates the registry on startup.
#[derive(Default)]
pub struct CopraEngine {
    /// All models managed by this engine
    models: DashMap<ModelId, Arc<CopurchaseModel>>,
    /// Optional persistence backend
    store: Option<Arc<dyn ModelStore>>,
}

impl CopraEngine {
    /// Create a new in-memory engine
    pub fn new() -> Self {
        Self {
            models: DashMap::new(),
            store: None,
        }
    }

    /// Create an engine backed by a persistent store
    pub fn with_store(store: Arc<dyn ModelStore>) -> Self {
        Self {
            models: DashMap::new(),
            store: Some(store),
        }
    }

    /// Load every stored model into the registry
    ///
    /// Returns the number of models loaded. A no-op without a store.
    pub fn load_all(&self) -> CopraResult<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        let mut loaded = 0;
        for id in store.list_models()? {
            if let Some(model) = store.load_model(&id)? {
                self.models.insert(id, Arc::new(model));
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Register a model, persisting it if a store is attached
    ///
    /// A model with the same ID replaces the previous one. Returns the
    /// model ID.
    pub fn insert_model(&self, model: CopurchaseModel) -> CopraResult<ModelId> {
        if let Some(store) = &self.store {
            store.save_model(&model)?;
        }
        let id = model.id().clone();
        self.models.insert(id.clone(), Arc::new(model));
        Ok(id)
    }

    /// Get shared read access to a model by ID
    pub fn get_model(&self, id: &ModelId) -> Option<Arc<CopurchaseModel>> {
        self.models.get(id).map(|r| r.clone())
    }

    /// Find a model by name
    pub fn find_model_by_name(&self, name: &str) -> Option<Arc<CopurchaseModel>> {
        self.models
            .iter()
            .find(|r| r.value().name() == name)
            .map(|r| r.value().clone())
    }

    /// Remove a model from the registry and the store
    pub fn remove_model(&self, id: &ModelId) -> CopraResult<bool> {
        if let Some(store) = &self.store {
            store.delete_model(id)?;
        }
        Ok(self.models.remove(id).is_some())
    }

    /// List all registered model IDs
    pub fn list_models(&self) -> Vec<ModelId> {
        self.models.iter().map(|r| r.key().clone()).collect()
    }

    /// Get the number of registered models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Check if a model is registered
    pub fn has_model(&self, id: &ModelId) -> bool {
        self.models.contains_key(id)
    }

    /// Recommend items for a cart against a registered model
    pub fn recommend(
        &self,
        id: &ModelId,
        cart: &[ItemId],
        top_n: usize,
    ) -> CopraResult<Recommendation> {
        let model = self
            .get_model(id)
            .ok_or_else(|| CopraError::ModelNotFound(id.clone()))?;

        let recommendation = RecommendQuery::for_cart(cart.iter().cloned())
            .top_n(top_n)
            .execute(&model)?;
        Ok(recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Order;

    fn test_model(name: &str) -> CopurchaseModel {
        CopurchaseModel::from_orders(
            name,
            vec![
                Order::from_items(["A", "B"]),
                Order::from_items(["A", "C"]),
            ],
        )
    }

    #[test]
    fn test_create_engine() {
        let engine = CopraEngine::new();
        assert_eq!(engine.model_count(), 0);
    }

    #[test]
    fn test_insert_model() {
        let engine = CopraEngine::new();
        let model = test_model("orders");
        let id = model.id().clone();

        let returned_id = engine.insert_model(model).unwrap();
        assert_eq!(id, returned_id);
        assert_eq!(engine.model_count(), 1);
        assert!(engine.has_model(&id));
    }

    #[test]
    fn test_get_model() {
        let engine = CopraEngine::new();
        let model = test_model("orders");
        let id = model.id().clone();

        engine.insert_model(model).unwrap();

        let retrieved = engine.get_model(&id);
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().name(), "orders");
    }

    #[test]
    fn test_find_model_by_name() {
        let engine = CopraEngine::new();
        engine.insert_model(test_model("groceries")).unwrap();

        assert!(engine.find_model_by_name("groceries").is_some());
        assert!(engine.find_model_by_name("hardware").is_none());
    }

    #[test]
    fn test_remove_model() {
        let engine = CopraEngine::new();
        let model = test_model("orders");
        let id = model.id().clone();

        engine.insert_model(model).unwrap();
        assert_eq!(engine.model_count(), 1);

        let removed = engine.remove_model(&id).unwrap();
        assert!(removed);
        assert_eq!(engine.model_count(), 0);
    }

    #[test]
    fn test_recommend_routes_to_model() {
        let engine = CopraEngine::new();
        let model = test_model("orders");
        let id = model.id().clone();
        engine.insert_model(model).unwrap();

        let rec = engine
            .recommend(&id, &[ItemId::from("A")], 2)
            .unwrap();
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn test_recommend_unknown_model_errors() {
        let engine = CopraEngine::new();
        let missing = ModelId::from_string("model:missing");

        let err = engine.recommend(&missing, &[ItemId::from("A")], 2);
        assert!(matches!(err, Err(CopraError::ModelNotFound(_))));
    }
}
