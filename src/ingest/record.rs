//! Raw order-record and cart-slot parsing

use crate::model::ItemId;

/// Split a raw order field into item identifiers
///
/// Items are comma-separated; surrounding whitespace is trimmed and entries
/// that are blank after trimming are dropped. Duplicates are kept: order-level
/// deduplication belongs to [`crate::model::Order`].
pub fn split_items(raw: &str) -> Vec<ItemId> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ItemId::from)
        .collect()
}

/// Assemble a cart from fixed item-slot values
///
/// Missing or blank slots are absent, not errors.
pub fn cart_from_slots<'a, I>(slots: I) -> Vec<ItemId>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    slots
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ItemId::from)
        .collect()
}
