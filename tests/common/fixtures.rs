//! Temporary CSV and YAML fixture writers

use std::path::{Path, PathBuf};

/// Write an order history CSV with an `ORDER_ID,ORDERS` header
///
/// Each entry is one row's raw comma-separated item list.
pub fn write_orders_csv(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut contents = String::from("ORDER_ID,ORDERS\n");
    for (index, items) in rows.iter().enumerate() {
        contents.push_str(&format!("{},\"{}\"\n", index + 1, items));
    }
    std::fs::write(&path, contents).expect("failed to write orders fixture");
    path
}

/// Write a cart query CSV with a `CART_ID,item1,item2,item3` header
pub fn write_carts_csv(dir: &Path, name: &str, rows: &[[&str; 3]]) -> PathBuf {
    let path = dir.join(name);
    let mut contents = String::from("CART_ID,item1,item2,item3\n");
    for (index, [a, b, c]) in rows.iter().enumerate() {
        contents.push_str(&format!("{},{},{},{}\n", index + 1, a, b, c));
    }
    std::fs::write(&path, contents).expect("failed to write carts fixture");
    path
}

/// Write a YAML file with the given contents
pub fn write_yaml(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write yaml fixture");
    path
}
