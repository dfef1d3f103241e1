//! CLI commands for data export
//!
//! Transactions are fetched from the backend (every page) and written as
//! CSV, JSON or YAML; budgets of a month go to CSV.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};

use super::{parse_date, AppContext};
use crate::api::{BudgetsApi, ExpensesApi};
use crate::error::{TrackrError, TrackrResult};
use crate::export::{
    export_budgets_csv, export_transactions_csv, export_transactions_json,
    export_transactions_yaml, TransactionExport,
};
use crate::models::{BudgetMonth, TransactionFilter, TransactionKind};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// CSV format
    Csv,
    /// JSON format with export metadata
    Json,
    /// YAML format (human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export transactions to a file
    Transactions {
        /// Output file path
        output: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Only transactions of this category (name or ID)
        #[arg(short, long)]
        category: Option<String>,

        /// Only expenses or only income
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,

        /// Earliest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Latest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },

    /// Export the budgets of a month to CSV
    Budgets {
        /// Output file path
        output: PathBuf,

        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<BudgetMonth>,
    },
}

/// Handle export commands
pub fn handle_export_command(ctx: &AppContext, cmd: ExportCommands) -> TrackrResult<()> {
    ctx.require_login()?;

    match cmd {
        ExportCommands::Transactions {
            output,
            format,
            pretty,
            category,
            kind,
            from,
            to,
        } => {
            let category = match category {
                Some(needle) => Some(ctx.resolve_category(&needle)?.id),
                None => None,
            };
            let filter = TransactionFilter {
                category,
                kind,
                date_from: from,
                date_to: to,
                ordering: Some("date".into()),
                ..TransactionFilter::default()
            };
            let transactions = ExpensesApi::new(ctx.client()).list_all(&filter)?;
            let count = transactions.len();

            let mut writer = create_output(&output)?;
            match format {
                ExportFormat::Csv => export_transactions_csv(&transactions, &mut writer)?,
                ExportFormat::Json => {
                    let export = TransactionExport::new(ctx.client().base_url(), transactions);
                    export_transactions_json(&export, &mut writer, pretty)?;
                }
                ExportFormat::Yaml => {
                    let export = TransactionExport::new(ctx.client().base_url(), transactions);
                    export_transactions_yaml(&export, &mut writer)?;
                }
            }
            finish(writer, &output)?;

            println!("Exported {} transactions to: {}", count, output.display());
        }

        ExportCommands::Budgets { output, month } => {
            let month = month.unwrap_or_else(BudgetMonth::current);
            let budgets = BudgetsApi::new(ctx.client()).list(Some(month))?;

            let mut writer = create_output(&output)?;
            export_budgets_csv(&budgets, &mut writer)?;
            finish(writer, &output)?;

            println!(
                "Exported {} budgets for {} to: {}",
                budgets.len(),
                month,
                output.display()
            );
        }
    }

    Ok(())
}

fn create_output(output: &Path) -> TrackrResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        TrackrError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}

fn finish(mut writer: BufWriter<File>, output: &Path) -> TrackrResult<()> {
    writer.flush().map_err(|e| {
        TrackrError::Export(format!("Failed to write {}: {}", output.display(), e))
    })
}
