//! Batch recommendation pipeline
//!
//! Wires the ingest readers, the model builder, and the recommender into the
//! end-to-end flow: read order history, build a model, read cart queries,
//! recommend per row, write the output file with appended recommendation
//! columns.

use crate::ingest::{
    CartCsvReader, IngestError, OrderCsvReader, RecommendationCsvWriter, DEFAULT_CART_COLUMNS,
    DEFAULT_ORDERS_COLUMN,
};
use crate::model::ModelBuilder;
use crate::recommend::{RecommendError, RecommendQuery, DEFAULT_POPULARITY_WEIGHT, DEFAULT_TOP_N};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while running the pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Configuration for one batch pipeline run
///
/// Only the three file paths are required; every tunable defaults to the
/// standard values (`ORDERS` column, `item1..item3` slots, three
/// recommendations, 0.1 popularity weight). Loadable from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Order history CSV
    pub orders: PathBuf,
    /// Cart query CSV
    pub carts: PathBuf,
    /// Output CSV to write
    pub output: PathBuf,
    /// Column holding the comma-separated item list
    #[serde(default = "default_orders_column")]
    pub orders_column: String,
    /// Cart item-slot columns
    #[serde(default = "default_cart_columns")]
    pub cart_columns: Vec<String>,
    /// Number of recommendations per cart
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Weight of the popularity bias
    #[serde(default = "default_popularity_weight")]
    pub popularity_weight: f64,
    /// Name for the built model
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

fn default_orders_column() -> String {
    DEFAULT_ORDERS_COLUMN.to_string()
}

fn default_cart_columns() -> Vec<String> {
    DEFAULT_CART_COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_popularity_weight() -> f64 {
    DEFAULT_POPULARITY_WEIGHT
}

fn default_model_name() -> String {
    "order-history".to_string()
}

impl PipelineConfig {
    /// Create a config with default tunables
    pub fn new(
        orders: impl Into<PathBuf>,
        carts: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            orders: orders.into(),
            carts: carts.into(),
            output: output.into(),
            orders_column: default_orders_column(),
            cart_columns: default_cart_columns(),
            top_n: default_top_n(),
            popularity_weight: default_popularity_weight(),
            model_name: default_model_name(),
        }
    }

    /// Load a config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

/// Summary of a completed pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Orders read from the history file
    pub orders_read: usize,
    /// Distinct items in the built model
    pub distinct_items: usize,
    /// Cart rows processed
    pub carts_processed: usize,
    /// Rows that needed fallback fill to reach full length
    pub filled_rows: usize,
}

/// Run the batch pipeline
pub fn run(config: &PipelineConfig) -> PipelineResult<PipelineSummary> {
    let orders = OrderCsvReader::with_column(&config.orders_column).read_path(&config.orders)?;
    tracing::info!(
        orders = orders.len(),
        path = %config.orders.display(),
        "loaded order history"
    );

    let mut builder = ModelBuilder::new().with_source(config.orders.display().to_string());
    builder.add_orders(&orders);
    let model = builder.build(config.model_name.as_str());
    tracing::info!(
        items = model.item_count(),
        pairs = model.pair_count(),
        "built co-purchase model"
    );

    let cart_file =
        CartCsvReader::with_columns(config.cart_columns.iter().cloned()).read_path(&config.carts)?;

    let mut recommendations = Vec::with_capacity(cart_file.rows.len());
    let mut filled_rows = 0;
    for row in &cart_file.rows {
        let recommendation = RecommendQuery::for_cart(row.cart.iter().cloned())
            .top_n(config.top_n)
            .popularity_weight(config.popularity_weight)
            .execute(&model)?;
        if recommendation.fill_count > 0 {
            filled_rows += 1;
        }
        recommendations.push(recommendation.items);
    }

    RecommendationCsvWriter::new(config.top_n).write_path(
        &config.output,
        &cart_file,
        &recommendations,
    )?;
    tracing::info!(
        carts = cart_file.rows.len(),
        filled = filled_rows,
        path = %config.output.display(),
        "wrote recommendations"
    );

    Ok(PipelineSummary {
        orders_read: orders.len(),
        distinct_items: model.item_count(),
        carts_processed: cart_file.rows.len(),
        filled_rows,
    })
}
