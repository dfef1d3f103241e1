//! Budget CLI commands
//!
//! Monthly per-category limits. Spent, remaining and progress are shown
//! exactly as the backend reports them.

use clap::Subcommand;

use super::{parse_money, AppContext};
use crate::api::BudgetsApi;
use crate::cache::{QueryKey, Resource};
use crate::display::format_budget_list;
use crate::error::TrackrResult;
use crate::models::{BudgetId, BudgetMonth, BudgetUpdate, Money, NewBudget};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show budgets and their progress for a month
    List {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<BudgetMonth>,
    },

    /// Set a budget for a category
    Set {
        /// Category name or ID
        category: String,
        /// Amount (e.g., "300" or "300.00")
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<BudgetMonth>,
    },

    /// Edit a budget
    Edit {
        /// Budget ID
        id: BudgetId,
        /// New amount
        #[arg(short, long, value_parser = parse_money)]
        amount: Option<Money>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New month (YYYY-MM)
        #[arg(short, long)]
        month: Option<BudgetMonth>,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: BudgetId,
    },
}

/// Handle a budget command
pub fn handle_budget_command(ctx: &AppContext, cmd: BudgetCommands) -> TrackrResult<()> {
    ctx.require_login()?;
    let api = BudgetsApi::new(ctx.client());

    match cmd {
        BudgetCommands::List { month } => {
            let month = month.unwrap_or_else(BudgetMonth::current);
            let budgets = ctx.cache.fetch(
                QueryKey::with_params(Resource::Budgets, month.to_string()),
                || api.list(Some(month)),
            )?;
            print!(
                "{}",
                format_budget_list(&ctx.formatter, &budgets, Some(month))
            );
        }

        BudgetCommands::Set {
            category,
            amount,
            month,
        } => {
            let category = ctx.resolve_category(&category)?;
            let new = NewBudget {
                category: category.id,
                amount,
                month: month.unwrap_or_else(BudgetMonth::current),
            };
            new.validate()?;

            let budget = ctx.cache.mutate(&[Resource::Budgets], || api.create(&new))?;
            println!(
                "Budget set: {} {} for {}",
                category.name,
                ctx.formatter.money(budget.amount),
                budget.month
            );
            println!("  ID: {}", budget.id);
        }

        BudgetCommands::Edit {
            id,
            amount,
            category,
            month,
        } => {
            let category = match category {
                Some(needle) => Some(ctx.resolve_category(&needle)?.id),
                None => None,
            };
            let update = BudgetUpdate {
                amount,
                category,
                month,
            };
            update.validate()?;

            let budget = ctx
                .cache
                .mutate(&[Resource::Budgets], || api.update(id, &update))?;
            println!(
                "Updated budget {}: {} for {}",
                budget.id,
                ctx.formatter.money(budget.amount),
                budget.month
            );
        }

        BudgetCommands::Delete { id } => {
            ctx.cache.mutate(&[Resource::Budgets], || api.delete(id))?;
            println!("Deleted budget {}", id);
        }
    }

    Ok(())
}
