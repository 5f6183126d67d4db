//! CSV readers and writers for order history and cart query files

use super::record::{cart_from_slots, split_items};
use super::{IngestError, IngestResult};
use crate::model::{ItemId, Order};
use csv::StringRecord;
use std::io::{Read, Write};
use std::path::Path;

/// Default name of the order-history column holding the item list
pub const DEFAULT_ORDERS_COLUMN: &str = "ORDERS";

/// Default names of the cart item-slot columns
pub const DEFAULT_CART_COLUMNS: [&str; 3] = ["item1", "item2", "item3"];

/// Locate a named column in a header record
fn column_index(headers: &StringRecord, column: &str) -> IngestResult<usize> {
    headers
        .iter()
        .position(|header| header == column)
        .ok_or_else(|| IngestError::MissingColumn {
            column: column.to_string(),
        })
}

/// Reader for historical order CSV files
///
/// Each row carries a comma-separated item list in a single column
/// (default `ORDERS`); every row becomes one [`Order`], with duplicates
/// collapsing on insertion. A blank item list yields an empty order,
/// which contributes nothing to a model build.
pub struct OrderCsvReader {
    column: String,
}

impl OrderCsvReader {
    /// Create a reader using the default `ORDERS` column
    pub fn new() -> Self {
        Self {
            column: DEFAULT_ORDERS_COLUMN.to_string(),
        }
    }

    /// Create a reader using a custom item-list column
    pub fn with_column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    /// Read orders from a file path
    pub fn read_path(&self, path: impl AsRef<Path>) -> IngestResult<Vec<Order>> {
        let file = std::fs::File::open(path)?;
        self.read(file)
    }

    /// Read orders from any reader
    pub fn read<R: Read>(&self, reader: R) -> IngestResult<Vec<Order>> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let index = column_index(csv_reader.headers()?, &self.column)?;

        let mut orders = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let raw = record.get(index).unwrap_or("");
            orders.push(Order::from_items(split_items(raw)));
        }
        Ok(orders)
    }
}

impl Default for OrderCsvReader {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of a cart query file: the original fields plus the assembled cart
#[derive(Debug, Clone)]
pub struct CartRow {
    /// The row exactly as read, for echoing into the output file
    pub fields: StringRecord,
    /// The cart assembled from the item-slot columns
    pub cart: Vec<ItemId>,
}

/// A parsed cart query file
#[derive(Debug, Clone)]
pub struct CartFile {
    /// Header record of the input file
    pub headers: StringRecord,
    /// All rows, in input order
    pub rows: Vec<CartRow>,
}

/// Reader for cart query CSV files
///
/// Carts arrive as fixed item-slot columns (default `item1,item2,item3`);
/// blank slots are absent. The original fields are retained so the output
/// writer can echo them alongside the recommendations.
pub struct CartCsvReader {
    columns: Vec<String>,
}

impl CartCsvReader {
    /// Create a reader using the default `item1..item3` slot columns
    pub fn new() -> Self {
        Self {
            columns: DEFAULT_CART_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Create a reader using custom slot columns
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a cart file from a path
    pub fn read_path(&self, path: impl AsRef<Path>) -> IngestResult<CartFile> {
        let file = std::fs::File::open(path)?;
        self.read(file)
    }

    /// Read a cart file from any reader
    pub fn read<R: Read>(&self, reader: R) -> IngestResult<CartFile> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let indices = self
            .columns
            .iter()
            .map(|column| column_index(&headers, column))
            .collect::<IngestResult<Vec<_>>>()?;

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            let cart = cart_from_slots(indices.iter().map(|&index| record.get(index)));
            rows.push(CartRow {
                fields: record,
                cart,
            });
        }

        Ok(CartFile { headers, rows })
    }
}

impl Default for CartCsvReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer appending `RECOMMENDATION_1..=N` columns to cart query rows
pub struct RecommendationCsvWriter {
    top_n: usize,
}

impl RecommendationCsvWriter {
    /// Create a writer for `top_n` recommendation columns
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Write the output file to a path
    pub fn write_path(
        &self,
        path: impl AsRef<Path>,
        file: &CartFile,
        recommendations: &[Vec<ItemId>],
    ) -> IngestResult<()> {
        let out = std::fs::File::create(path)?;
        self.write(out, file, recommendations)
    }

    /// Write the output file to any writer
    ///
    /// Rows and recommendation lists are zipped in order; each list is
    /// expected to have exactly `top_n` entries.
    pub fn write<W: Write>(
        &self,
        writer: W,
        file: &CartFile,
        recommendations: &[Vec<ItemId>],
    ) -> IngestResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut headers = file.headers.clone();
        for slot in 1..=self.top_n {
            headers.push_field(&format!("RECOMMENDATION_{}", slot));
        }
        csv_writer.write_record(&headers)?;

        for (row, items) in file.rows.iter().zip(recommendations) {
            let mut record = row.fields.clone();
            for item in items {
                record.push_field(item.as_str());
            }
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
