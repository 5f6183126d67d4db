//! Synthetic order corpus builders

use copra::{CopurchaseModel, ModelBuilder, Order};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Build orders from slices of item names
pub fn orders(raw: &[&[&str]]) -> Vec<Order> {
    raw.iter()
        .map(|items| Order::from_items(items.iter().copied()))
        .collect()
}

/// Grocery-flavored corpus with predictable strong pairs
///
/// bread+milk co-occur in four orders, bread+eggs in two, and jam appears
/// in six orders (the outright popularity leader).
pub fn grocery_corpus() -> Vec<Order> {
    orders(&[
        &["bread", "milk", "jam"],
        &["bread", "milk"],
        &["bread", "milk", "eggs", "jam"],
        &["bread", "milk", "jam"],
        &["bread", "eggs"],
        &["jam"],
        &["jam"],
        &["jam"],
    ])
}

/// Seeded random corpus: `n` orders of 1..=5 items drawn from a fixed catalog
pub fn random_corpus(seed: u64, n: usize) -> Vec<Order> {
    const CATALOG: [&str; 12] = [
        "apples", "bananas", "bread", "butter", "cereal", "cheese", "coffee", "eggs", "jam",
        "milk", "tea", "yogurt",
    ];

    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let size = rng.gen_range(1..=5);
            Order::from_items((0..size).map(|_| CATALOG[rng.gen_range(0..CATALOG.len())]))
        })
        .collect()
}

/// Build a model from a slice of orders
pub fn model_from(orders: &[Order]) -> CopurchaseModel {
    let mut builder = ModelBuilder::new();
    builder.add_orders(orders);
    builder.build("test-model")
}
