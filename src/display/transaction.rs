//! Transaction display formatting
//!
//! Register tables, single-transaction details and the statement preview.

use tabled::builder::Builder;

use super::{empty_state, truncate, Formatter};
use crate::models::{Page, Transaction, TransactionKind};
use crate::services::StatementPreview;

const DESCRIPTION_WIDTH: usize = 36;

/// Signed amount as shown in lists: expenses negative, income positive
fn signed_amount(fmt: &Formatter, kind: TransactionKind, amount: crate::models::Money) -> String {
    let shown = fmt.money(amount.abs());
    match kind {
        TransactionKind::Expense => format!("-{}", shown),
        TransactionKind::Income => format!("+{}", shown),
    }
}

/// Format one page of transactions as a table
pub fn format_transaction_page(fmt: &Formatter, page: &Page<Transaction>, page_number: u32) -> String {
    if page.results.is_empty() {
        return empty_state(
            "No transactions found.",
            "Add one with 'trackr expense add' or import a statement with 'trackr upload'.",
        );
    }

    let mut output = format_transaction_table(fmt, &page.results);

    output.push_str(&format!(
        "\nShowing {} of {} transactions",
        page.results.len(),
        page.count
    ));
    if page.has_next() {
        output.push_str(&format!(
            " (page {}; next with --page {})",
            page_number,
            page_number + 1
        ));
    }
    output.push('\n');
    output
}

/// Format transactions as a register table
pub fn format_transaction_table(fmt: &Formatter, transactions: &[Transaction]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Date", "Description", "Category", "Amount"]);

    for txn in transactions {
        builder.push_record([
            txn.id.to_string(),
            fmt.date(txn.date),
            truncate(&txn.description, DESCRIPTION_WIDTH),
            txn.category_label().unwrap_or("(uncategorized)").to_string(),
            signed_amount(fmt, txn.kind, txn.amount),
        ]);
    }

    let mut output = fmt.table(builder, &[0, 4]);
    output.push('\n');
    output
}

/// Format transaction details for display
pub fn format_transaction_details(fmt: &Formatter, txn: &Transaction) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", fmt.date(txn.date)));
    output.push_str(&format!("Type:        {}\n", txn.kind));
    output.push_str(&format!("Amount:      {}\n", fmt.money(txn.amount)));
    output.push_str(&format!("Description: {}\n", txn.description));

    match txn.category_label() {
        Some(name) => output.push_str(&format!("Category:    {}\n", name)),
        None => match txn.category_id() {
            Some(id) => output.push_str(&format!("Category:    #{}\n", id)),
            None => output.push_str("Category:    (uncategorized)\n"),
        },
    }

    if let Some(notes) = txn.notes.as_deref().filter(|n| !n.is_empty()) {
        output.push_str(&format!("Notes:       {}\n", notes));
    }
    if let Some(created) = txn.created_at {
        output.push_str(&format!("Created:     {}\n", created.format("%Y-%m-%d %H:%M")));
    }
    if let Some(updated) = txn.updated_at {
        output.push_str(&format!("Updated:     {}\n", updated.format("%Y-%m-%d %H:%M")));
    }

    output
}

/// Format the pending statement preview with 1-based row numbers
pub fn format_preview(fmt: &Formatter, preview: &StatementPreview) -> String {
    if preview.is_empty() {
        return empty_state(
            &format!("The preview of {} has no rows.", preview.source_file),
            "Discard it with 'trackr upload discard'.",
        );
    }

    let mut builder = Builder::default();
    builder.push_record(["Row", "Date", "Description", "Category", "Amount"]);
    for (i, row) in preview.rows.iter().enumerate() {
        builder.push_record([
            (i + 1).to_string(),
            fmt.date(row.date),
            truncate(&row.description, DESCRIPTION_WIDTH),
            row.category_label().unwrap_or("-").to_string(),
            signed_amount(fmt, row.kind, row.amount),
        ]);
    }

    let mut output = format!(
        "Preview of {} ({} rows, uploaded {})\n",
        preview.source_file,
        preview.len(),
        preview.uploaded_at.format("%Y-%m-%d %H:%M")
    );
    output.push_str(&fmt.table(builder, &[0, 4]));
    output.push_str(
        "\n\nEdit with 'trackr upload set-category' or 'trackr upload remove', \
         then store with 'trackr upload commit'.\n",
    );
    output
}
