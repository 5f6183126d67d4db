//! Recommendation result structures

use crate::model::ItemId;
use serde::{Deserialize, Serialize};

/// A genuine candidate with its accumulated score
///
/// Score = summed co-occurrence counts with the cart plus the popularity
/// bias. Scores are relative, not probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: ItemId,
    pub score: f64,
}

/// Result of a recommendation query
///
/// `items` always has exactly the requested length. The trailing
/// `fill_count` entries were fallback-filled with the globally most popular
/// item and may repeat an earlier entry or an item already in the cart;
/// the leading entries are genuine candidates, excluded from the cart and
/// mutually distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended items, best-first
    pub items: Vec<ItemId>,
    /// The ranked genuine candidates behind the leading entries
    pub candidates: Vec<ScoredItem>,
    /// How many trailing slots were fallback-filled
    pub fill_count: usize,
}

impl Recommendation {
    /// Number of recommended items (equals the requested count)
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the recommendation list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether no genuine candidate was found at all
    pub fn is_fallback_only(&self) -> bool {
        self.candidates.is_empty()
    }
}
