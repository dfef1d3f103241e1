//! YAML export functionality
//!
//! Same document as the JSON export, for reading by humans.

use std::io::Write;

use crate::error::{TrackrError, TrackrResult};
use crate::export::json::TransactionExport;

/// Export transactions to YAML
pub fn export_transactions_yaml<W: Write>(
    export: &TransactionExport,
    writer: &mut W,
) -> TrackrResult<()> {
    let err = |e: std::io::Error| TrackrError::Export(e.to_string());

    writeln!(writer, "# Trackr transaction export").map_err(err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(err)?;
    writeln!(writer, "# Source: {}", export.source).map_err(err)?;
    writeln!(writer).map_err(err)?;

    serde_yaml::to_writer(writer, export).map_err(|e| TrackrError::Export(e.to_string()))?;
    Ok(())
}
