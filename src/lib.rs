//! Copra: Co-Purchase Recommendation Engine
//!
//! Mines historical order baskets into an immutable co-occurrence model and
//! answers cart queries with a fixed-length recommendation list, ranked by a
//! blend of co-occurrence strength and overall popularity.
//!
//! # Core Concepts
//!
//! - **Orders**: Historical transactions, reduced to distinct item sets
//! - **Model**: Immutable popularity and symmetric co-occurrence tables
//! - **Recommendations**: Ranked candidates with a most-popular fallback fill
//!
//! # Example
//!
//! ```
//! use copra::{CopurchaseModel, Order, RecommendQuery};
//!
//! let model = CopurchaseModel::from_orders(
//!     "orders",
//!     vec![
//!         Order::from_items(["bread", "milk"]),
//!         Order::from_items(["bread", "eggs"]),
//!     ],
//! );
//!
//! let recommendation = RecommendQuery::for_cart(["bread"])
//!     .top_n(2)
//!     .execute(&model)
//!     .unwrap();
//! assert_eq!(recommendation.len(), 2);
//! ```

pub mod ingest;
mod model;
pub mod pipeline;
pub mod recommend;
pub mod storage;

pub use model::{
    CopraEngine, CopraError, CopraResult, CopurchaseModel, ItemId, ModelBuilder, ModelId,
    ModelMetadata, Order,
};
pub use pipeline::{PipelineConfig, PipelineError, PipelineResult, PipelineSummary};
pub use recommend::{Recommendation, RecommendError, RecommendQuery, ScoredItem};
pub use storage::{ModelStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
