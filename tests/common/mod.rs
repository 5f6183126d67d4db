//! Common test utilities for Copra integration tests
//!
//! This module provides shared helpers for building synthetic order
//! corpora and writing temporary CSV fixtures.

pub mod corpus;
pub mod fixtures;

pub use corpus::{grocery_corpus, model_from, orders, random_corpus};
pub use fixtures::{write_carts_csv, write_orders_csv, write_yaml};
