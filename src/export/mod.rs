//! Export module for Trackr
//!
//! Writes data fetched from the backend to local files:
//! - CSV: transactions and budgets (spreadsheet-compatible)
//! - JSON: transactions with export metadata
//! - YAML: the same document, human-readable

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::{export_budgets_csv, export_transactions_csv};
pub use json::{export_transactions_json, TransactionExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_transactions_yaml;
