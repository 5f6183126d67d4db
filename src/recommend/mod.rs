//! Cart-to-recommendation queries over a built model

mod query;
mod types;

pub use query::{RecommendError, RecommendQuery, DEFAULT_POPULARITY_WEIGHT, DEFAULT_TOP_N};
pub use types::{Recommendation, ScoredItem};
