//! CSV export functionality
//!
//! Exports transactions and budgets to spreadsheet-compatible CSV.

use std::io::Write;

use crate::error::{TrackrError, TrackrResult};
use crate::models::{Budget, Transaction};

fn export_error(e: csv::Error) -> TrackrError {
    TrackrError::Export(e.to_string())
}

/// Export transactions to CSV
pub fn export_transactions_csv<W: Write>(
    transactions: &[Transaction],
    writer: W,
) -> TrackrResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "ID",
        "Date",
        "Type",
        "Description",
        "Category",
        "Amount",
        "Notes",
    ])
    .map_err(export_error)?;

    for txn in transactions {
        csv.write_record([
            txn.id.to_string(),
            txn.date.to_string(),
            txn.kind.to_string(),
            txn.description.clone(),
            txn.category_label().unwrap_or_default().to_string(),
            txn.amount.to_decimal_string(),
            txn.notes.clone().unwrap_or_default(),
        ])
        .map_err(export_error)?;
    }

    csv.flush()
        .map_err(|e| TrackrError::Export(e.to_string()))?;
    Ok(())
}

/// Export budgets with their server-computed progress to CSV
pub fn export_budgets_csv<W: Write>(budgets: &[Budget], writer: W) -> TrackrResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "Month",
        "Category",
        "Budgeted",
        "Spent",
        "Remaining",
        "Percentage",
        "Over Budget",
    ])
    .map_err(export_error)?;

    for budget in budgets {
        let category = budget
            .category_label()
            .map(str::to_string)
            .unwrap_or_else(|| budget.category_id().to_string());
        csv.write_record([
            budget.month.to_string(),
            category,
            budget.amount.to_decimal_string(),
            budget.spent.to_decimal_string(),
            budget.remaining.to_decimal_string(),
            format!("{:.1}", budget.percentage),
            budget.is_over_budget.to_string(),
        ])
        .map_err(export_error)?;
    }

    csv.flush()
        .map_err(|e| TrackrError::Export(e.to_string()))?;
    Ok(())
}
