//! JSON export functionality
//!
//! Wraps exported transactions with a schema version and summary metadata.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackrError, TrackrResult};
use crate::models::Transaction;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Transactions export document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Client version that created the export
    pub app_version: String,

    /// Backend the data came from
    pub source: String,

    pub transactions: Vec<Transaction>,

    pub metadata: ExportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,

    /// Date range of transactions (earliest)
    pub earliest_transaction: Option<String>,

    /// Date range of transactions (latest)
    pub latest_transaction: Option<String>,
}

impl TransactionExport {
    pub fn new(source: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            earliest_transaction: transactions.iter().map(|t| t.date).min().map(|d| d.to_string()),
            latest_transaction: transactions.iter().map(|t| t.date).max().map(|d| d.to_string()),
        };

        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            source: source.into(),
            transactions,
            metadata,
        }
    }
}

/// Export transactions to JSON
pub fn export_transactions_json<W: Write>(
    export: &TransactionExport,
    writer: &mut W,
    pretty: bool,
) -> TrackrResult<()> {
    let result = if pretty {
        serde_json::to_writer_pretty(&mut *writer, export)
    } else {
        serde_json::to_writer(&mut *writer, export)
    };
    result.map_err(|e| TrackrError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| TrackrError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_metadata_and_roundtrip() {
        let transactions: Vec<Transaction> = serde_json::from_str(
            r#"[
                {"id": 1, "amount": "5.00", "description": "Tea", "date": "2024-04-03", "type": "expense"},
                {"id": 2, "amount": "9.00", "description": "Cake", "date": "2024-03-30", "type": "expense"}
            ]"#,
        )
        .unwrap();

        let export = TransactionExport::new("http://localhost:8000", transactions);
        assert_eq!(export.metadata.transaction_count, 2);
        assert_eq!(export.metadata.earliest_transaction.as_deref(), Some("2024-03-30"));
        assert_eq!(export.metadata.latest_transaction.as_deref(), Some("2024-04-03"));

        let mut output = Vec::new();
        export_transactions_json(&export, &mut output, true).unwrap();

        let parsed: TransactionExport = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(parsed.transactions, export.transactions);
    }
}
