//! Expense CLI commands
//!
//! The transactions page: list with filters, details, manual entry, edits
//! and deletion. Every mutation invalidates the cached lists and the
//! figures derived from them.

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use super::{confirm, parse_date, parse_money, AppContext};
use crate::api::ExpensesApi;
use crate::cache::{QueryKey, Resource};
use crate::display::{format_transaction_details, format_transaction_page};
use crate::error::TrackrResult;
use crate::models::{
    Money, NewTransaction, TransactionFilter, TransactionId, TransactionKind, TransactionUpdate,
};

/// Caches that show stored transactions or numbers derived from them
const TRANSACTION_RESOURCES: [Resource; 3] =
    [Resource::Expenses, Resource::Analytics, Resource::Budgets];

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List transactions
    List {
        /// Filter by category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Filter by type (expense or income)
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
        /// Earliest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Latest date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        /// Search descriptions
        #[arg(short, long)]
        search: Option<String>,
        /// Sort order, e.g. "-date" or "amount"
        #[arg(long, default_value = "-date")]
        ordering: String,
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show transaction details
    Show {
        /// Transaction ID
        id: TransactionId,
    },

    /// Add a transaction
    Add {
        /// Amount (e.g., "12.50")
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// Description
        description: String,
        /// Type (expense or income)
        #[arg(short = 't', long = "type", default_value = "expense")]
        kind: TransactionKind,
        /// Transaction date (YYYY-MM-DD, defaults to today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Edit a transaction
    Edit {
        /// Transaction ID
        id: TransactionId,
        /// New amount
        #[arg(short, long, value_parser = parse_money)]
        amount: Option<Money>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// New type
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// New category name or ID
        #[arg(short, long, conflicts_with = "clear_category")]
        category: Option<String>,
        /// Remove the category
        #[arg(long)]
        clear_category: bool,
        /// New notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: TransactionId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Assign a category to a transaction ("none" clears it)
    #[command(name = "set-category")]
    SetCategory {
        /// Transaction ID
        id: TransactionId,
        /// Category name or ID, or "none"
        category: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(ctx: &AppContext, cmd: ExpenseCommands) -> TrackrResult<()> {
    ctx.require_login()?;
    let api = ExpensesApi::new(ctx.client());

    match cmd {
        ExpenseCommands::List {
            category,
            kind,
            from,
            to,
            search,
            ordering,
            page,
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
                search,
                ordering: Some(ordering),
                page: Some(page.max(1)),
            };

            let key = QueryKey::with_params(Resource::Expenses, format!("{:?}", filter));
            let result = ctx.cache.fetch(key, || api.list(&filter))?;
            print!(
                "{}",
                format_transaction_page(&ctx.formatter, &result, page.max(1))
            );
        }

        ExpenseCommands::Show { id } => {
            let txn = ctx
                .cache
                .fetch(QueryKey::with_params(Resource::Expenses, id.to_string()), || {
                    api.get(id)
                })?;
            print!("{}", format_transaction_details(&ctx.formatter, &txn));
        }

        ExpenseCommands::Add {
            amount,
            description,
            kind,
            date,
            category,
            notes,
        } => {
            let category = match category {
                Some(needle) => Some(ctx.resolve_category(&needle)?.id),
                None => None,
            };
            let new = NewTransaction {
                amount,
                description,
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                kind,
                category,
                notes,
            };
            new.validate()?;

            let txn = ctx
                .cache
                .mutate(&TRANSACTION_RESOURCES, || api.create(&new))?;
            println!("Added {}: {} ({})", kind, ctx.formatter.money(txn.amount), txn.description);
            println!("  ID: {}", txn.id);
        }

        ExpenseCommands::Edit {
            id,
            amount,
            description,
            kind,
            date,
            category,
            clear_category,
            notes,
        } => {
            let category = if clear_category {
                Some(None)
            } else {
                match category {
                    Some(needle) => Some(Some(ctx.resolve_category(&needle)?.id)),
                    None => None,
                }
            };
            let update = TransactionUpdate {
                amount,
                description,
                date,
                kind,
                category,
                notes,
            };
            update.validate()?;

            let txn = ctx
                .cache
                .mutate(&TRANSACTION_RESOURCES, || api.update(id, &update))?;
            println!("Updated transaction {}\n", txn.id);
            print!("{}", format_transaction_details(&ctx.formatter, &txn));
        }

        ExpenseCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete transaction {}?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            ctx.cache.mutate(&TRANSACTION_RESOURCES, || api.delete(id))?;
            println!("Deleted transaction {}", id);
        }

        ExpenseCommands::SetCategory { id, category } => {
            let target = if category.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(ctx.resolve_category(&category)?)
            };

            let txn = ctx.cache.mutate(&TRANSACTION_RESOURCES, || {
                api.update_category(id, target.as_ref().map(|c| c.id))
            })?;
            match target {
                Some(category) => println!("Transaction {} is now in {}", txn.id, category.name),
                None => println!("Transaction {} is now uncategorized", txn.id),
            }
        }
    }

    Ok(())
}
