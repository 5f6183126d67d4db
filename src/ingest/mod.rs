//! Tabular ingest: order history files, cart query files, and the
//! recommendation output writer

mod record;
mod tabular;

pub use record::{cart_from_slots, split_items};
pub use tabular::{
    CartCsvReader, CartFile, CartRow, OrderCsvReader, RecommendationCsvWriter,
    DEFAULT_CART_COLUMNS, DEFAULT_ORDERS_COLUMN,
};

use thiserror::Error;

/// Errors that can occur while reading or writing tabular files
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing column: {column}")]
    MissingColumn { column: String },
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;
