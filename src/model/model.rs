//! The immutable co-purchase model

use super::item::ItemId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a model
///
/// Serializes as a plain string (UUID or semantic ID like "model:orders-2024")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Create a new random ModelId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a ModelId from a string (semantic ID)
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ModelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Metadata about a built model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// When the model was built
    pub built_at: Option<DateTime<Utc>>,
    /// Number of historical orders consumed during the build
    pub order_count: u64,
    /// Number of distinct co-occurring item pairs
    pub pair_count: u64,
    /// Where the order history came from (file path, dataset name)
    pub source: Option<String>,
}

/// An immutable co-purchase model: item popularity plus pairwise co-occurrence
///
/// Built once from historical orders by [`super::ModelBuilder`], then read-only
/// for the lifetime of the process. Lookups of absent items or pairs yield
/// zero rather than erroring. The co-occurrence table is stored as a symmetric
/// adjacency, so `co_occurrence(i, j) == co_occurrence(j, i)` holds by
/// construction and self-pairs are never present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopurchaseModel {
    id: ModelId,
    name: String,
    popularity: HashMap<ItemId, u64>,
    co_occurrence: HashMap<ItemId, HashMap<ItemId, u64>>,
    metadata: ModelMetadata,
}

impl CopurchaseModel {
    /// Assemble a model from canonical pair counts
    ///
    /// Pairs must be canonically ordered (first < second) and free of
    /// self-pairs; the builder and the SQLite store both guarantee this.
    pub(crate) fn from_parts(
        id: ModelId,
        name: impl Into<String>,
        popularity: HashMap<ItemId, u64>,
        pairs: impl IntoIterator<Item = ((ItemId, ItemId), u64)>,
        metadata: ModelMetadata,
    ) -> Self {
        let mut co_occurrence: HashMap<ItemId, HashMap<ItemId, u64>> = HashMap::new();
        for ((a, b), count) in pairs {
            co_occurrence
                .entry(a.clone())
                .or_default()
                .insert(b.clone(), count);
            co_occurrence.entry(b).or_default().insert(a, count);
        }

        Self {
            id,
            name: name.into(),
            popularity,
            co_occurrence,
            metadata,
        }
    }

    /// Build a model directly from a sequence of orders
    pub fn from_orders<I>(name: impl Into<String>, orders: I) -> Self
    where
        I: IntoIterator<Item = super::item::Order>,
    {
        let mut builder = super::ModelBuilder::new();
        for order in orders {
            builder.add_order(&order);
        }
        builder.build(name)
    }

    /// Model identifier
    pub fn id(&self) -> &ModelId {
        &self.id
    }

    /// Human-readable model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Number of distinct historical orders containing the item
    ///
    /// Absent items yield zero.
    pub fn popularity(&self, item: &ItemId) -> u64 {
        self.popularity.get(item).copied().unwrap_or(0)
    }

    /// Number of historical orders containing both items
    ///
    /// Symmetric in its arguments; absent pairs and self-pairs yield zero.
    pub fn co_occurrence(&self, a: &ItemId, b: &ItemId) -> u64 {
        if a == b {
            return 0;
        }
        self.co_occurrence
            .get(a)
            .and_then(|partners| partners.get(b))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate the co-occurrence partners of an item with their counts
    ///
    /// Every partner has a strictly positive count. Items never seen during
    /// the build have no partners.
    pub fn partners(&self, item: &ItemId) -> impl Iterator<Item = (&ItemId, u64)> + '_ {
        self.co_occurrence
            .get(item)
            .into_iter()
            .flat_map(|partners| partners.iter().map(|(id, count)| (id, *count)))
    }

    /// Iterate every known item
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.popularity.keys()
    }

    /// Iterate the full popularity table
    pub fn popularity_table(&self) -> impl Iterator<Item = (&ItemId, u64)> {
        self.popularity.iter().map(|(id, count)| (id, *count))
    }

    /// Iterate every unordered pair once, in canonical (first < second) form
    pub fn canonical_pairs(&self) -> impl Iterator<Item = (&ItemId, &ItemId, u64)> + '_ {
        self.co_occurrence.iter().flat_map(|(a, partners)| {
            partners
                .iter()
                .filter_map(move |(b, count)| (a < b).then_some((a, b, *count)))
        })
    }

    /// Number of distinct items
    pub fn item_count(&self) -> usize {
        self.popularity.len()
    }

    /// Number of distinct co-occurring pairs
    pub fn pair_count(&self) -> u64 {
        self.metadata.pair_count
    }

    /// Number of historical orders consumed during the build
    pub fn order_count(&self) -> u64 {
        self.metadata.order_count
    }

    /// Whether the model saw no items at all
    pub fn is_empty(&self) -> bool {
        self.popularity.is_empty()
    }

    /// The globally most popular item
    ///
    /// Ties break toward the lexicographically smallest identifier so that
    /// fallback fill is deterministic. Returns None on an empty model.
    pub fn most_popular(&self) -> Option<&ItemId> {
        self.popularity
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(item, _)| item)
    }
}
