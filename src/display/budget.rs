//! Budget display formatting
//!
//! Progress bars are drawn from the percentage the backend supplies.

use tabled::builder::Builder;

use super::{empty_state, Formatter};
use crate::models::{Budget, BudgetMonth};

const BAR_WIDTH: usize = 20;

/// A fixed-width bar for a percentage; values past 100 fill the bar
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let clamped = if percentage.is_finite() {
        percentage.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((clamped / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

/// Format the budgets of a month with their progress
pub fn format_budget_list(fmt: &Formatter, budgets: &[Budget], month: Option<BudgetMonth>) -> String {
    let title = match month {
        Some(month) => format!("Budgets for {}", month),
        None => "Budgets".to_string(),
    };

    if budgets.is_empty() {
        return empty_state(
            &format!("{}: none set.", title),
            "Set one with 'trackr budget set <CATEGORY> <AMOUNT>'.",
        );
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Category", "Budgeted", "Spent", "Remaining", "Progress"]);
    for budget in budgets {
        let category = budget
            .category_label()
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", budget.category_id()));
        let marker = if budget.is_over_budget { " OVER" } else { "" };
        builder.push_record([
            budget.id.to_string(),
            category,
            fmt.money(budget.amount),
            fmt.money(budget.spent),
            fmt.money(budget.remaining),
            format!(
                "{} {:>5.1}%{}",
                progress_bar(budget.percentage, BAR_WIDTH),
                budget.percentage,
                marker
            ),
        ]);
    }

    let mut output = format!("{}\n", title);
    output.push_str(&fmt.table(builder, &[0, 2, 3, 4]));
    output.push('\n');

    let over = budgets.iter().filter(|b| b.is_over_budget).count();
    if over > 0 {
        output.push_str(&format!("\n{} budget(s) over the limit.\n", over));
    }
    output
}
