//! Item identifiers and historical orders

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifier for a purchasable item
///
/// Opaque token with exact, case-sensitive equality. Ordered so pairs of
/// items have a stable canonical form and equal-score ranking ties break
/// deterministically.
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create an ItemId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is blank (empty after trimming)
    ///
    /// Blank entries come from empty cart slots or trailing commas in raw
    /// order records; they are dropped during normalization.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One historical transaction, reduced to its distinct item set
///
/// Duplicate items in a raw order record collapse to a single occurrence:
/// co-occurrence is order-level presence, not purchase quantity. Iteration
/// order is ascending by identifier, so pair enumeration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order {
    items: BTreeSet<ItemId>,
}

impl Order {
    /// Create an empty order
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an order from raw items, collapsing duplicates
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Add an item to the order
    ///
    /// Returns false if the item was already present.
    pub fn insert(&mut self, item: impl Into<ItemId>) -> bool {
        self.items.insert(item.into())
    }

    /// Check whether the order contains an item
    pub fn contains(&self, item: &ItemId) -> bool {
        self.items.contains(item)
    }

    /// Iterate the distinct items in ascending identifier order
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter()
    }

    /// Number of distinct items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the order has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Into<ItemId>> FromIterator<T> for Order {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}
