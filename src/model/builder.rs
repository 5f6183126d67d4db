//! Single-pass accumulation of popularity and co-occurrence counts

use super::item::{ItemId, Order};
use super::model::{CopurchaseModel, ModelId, ModelMetadata};
use chrono::Utc;
use std::collections::HashMap;

/// Accumulates order-level counts and produces an immutable model
///
/// Each order contributes one popularity increment per distinct item and one
/// co-occurrence increment per distinct unordered pair, regardless of
/// duplicates in the raw record. Pairs are keyed in canonical ascending
/// order, so {i, j} and {j, i} always land on the same entry.
///
/// Builders are mergeable: partial builders produced from shards of the
/// order history sum into the same counts as a single sequential pass.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    popularity: HashMap<ItemId, u64>,
    pairs: HashMap<(ItemId, ItemId), u64>,
    order_count: u64,
    source: Option<String>,
}

impl ModelBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where the order history comes from (file path, dataset name)
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Consume one historical order
    ///
    /// An order with zero or one distinct items contributes only to
    /// popularity (or nothing); that is normal, not an error.
    pub fn add_order(&mut self, order: &Order) {
        self.order_count += 1;

        let items: Vec<&ItemId> = order.items().collect();
        for item in &items {
            *self.popularity.entry((*item).clone()).or_insert(0) += 1;
        }

        // Order iteration is ascending, so (items[i], items[j]) with i < j
        // is already the canonical pair key.
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                let key = (items[i].clone(), items[j].clone());
                *self.pairs.entry(key).or_insert(0) += 1;
            }
        }
    }

    /// Consume a sequence of historical orders
    pub fn add_orders<'a, I>(&mut self, orders: I)
    where
        I: IntoIterator<Item = &'a Order>,
    {
        for order in orders {
            self.add_order(order);
        }
    }

    /// Merge another builder's counts into this one
    ///
    /// Associative and commutative: sharded builds merge into exactly the
    /// counts a sequential pass would produce.
    pub fn merge(&mut self, other: ModelBuilder) {
        for (item, count) in other.popularity {
            *self.popularity.entry(item).or_insert(0) += count;
        }
        for (pair, count) in other.pairs {
            *self.pairs.entry(pair).or_insert(0) += count;
        }
        self.order_count += other.order_count;
        if self.source.is_none() {
            self.source = other.source;
        }
    }

    /// Number of orders consumed so far
    pub fn order_count(&self) -> u64 {
        self.order_count
    }

    /// Number of distinct items seen so far
    pub fn item_count(&self) -> usize {
        self.popularity.len()
    }

    /// Finalize into an immutable model
    pub fn build(self, name: impl Into<String>) -> CopurchaseModel {
        let metadata = ModelMetadata {
            built_at: Some(Utc::now()),
            order_count: self.order_count,
            pair_count: self.pairs.len() as u64,
            source: self.source,
        };

        tracing::debug!(
            orders = self.order_count,
            items = self.popularity.len(),
            pairs = self.pairs.len(),
            "built co-purchase model"
        );

        CopurchaseModel::from_parts(ModelId::new(), name, self.popularity, self.pairs, metadata)
    }
}
