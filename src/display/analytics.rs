//! Analytics and dashboard display formatting
//!
//! Stat cards and breakdown tables. Totals, shares and balances are the
//! backend's figures; nothing is summed here.

use tabled::builder::Builder;

use super::budget::progress_bar;
use super::transaction::format_transaction_table;
use super::{empty_state, Formatter};
use crate::models::{AnalyticsSummary, Budget, CategoryAnalytics, MonthlyData, Transaction, User};

const SHARE_BAR_WIDTH: usize = 16;

/// Summary figures as a row of stat cards
pub fn format_summary_cards(fmt: &Formatter, summary: &AnalyticsSummary) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Income", "Expenses", "Net balance", "Transactions"]);
    builder.push_record([
        fmt.money(summary.total_income),
        fmt.money(summary.total_expenses),
        fmt.money(summary.net_balance),
        summary.transaction_count.to_string(),
    ]);

    let mut output = fmt.table(builder, &[0, 1, 2, 3]);
    output.push('\n');
    if let Some(top) = summary.top_category.as_deref().filter(|t| !t.is_empty()) {
        output.push_str(&format!("Top category: {}\n", top));
    }
    output
}

/// Spending per category with each share as a bar
pub fn format_by_category(fmt: &Formatter, rows: &[CategoryAnalytics]) -> String {
    if rows.is_empty() {
        return empty_state(
            "No spending in this period.",
            "Try a wider range with --from/--to.",
        );
    }

    let mut builder = Builder::default();
    builder.push_record(["Category", "Total", "Count", "Share"]);
    for row in rows {
        builder.push_record([
            row.label().to_string(),
            fmt.money(row.total),
            row.count.to_string(),
            format!(
                "{} {:>5.1}%",
                progress_bar(row.percentage, SHARE_BAR_WIDTH),
                row.percentage
            ),
        ]);
    }

    let mut output = fmt.table(builder, &[1, 2]);
    output.push('\n');
    output
}

/// Income, expenses and net per month
pub fn format_by_month(fmt: &Formatter, rows: &[MonthlyData]) -> String {
    if rows.is_empty() {
        return empty_state("No monthly data yet.", "Import a statement to get started.");
    }

    let mut builder = Builder::default();
    builder.push_record(["Month", "Income", "Expenses", "Net"]);
    for row in rows {
        builder.push_record([
            row.month.clone(),
            fmt.money(row.income),
            fmt.money(row.expenses),
            fmt.money(row.net),
        ]);
    }

    let mut output = fmt.table(builder, &[1, 2, 3]);
    output.push('\n');
    output
}

/// The landing view: greeting, stat cards, recent activity, budgets at risk
pub fn format_dashboard(
    fmt: &Formatter,
    user: Option<&User>,
    summary: &AnalyticsSummary,
    recent: &[Transaction],
    budgets: &[Budget],
) -> String {
    let mut output = String::new();

    if let Some(user) = user {
        output.push_str(&format!("Welcome back, {}\n\n", user.display_name()));
    }

    output.push_str(&format_summary_cards(fmt, summary));

    output.push_str("\nRecent transactions\n");
    if recent.is_empty() {
        output.push_str("  No transactions yet. Upload a statement with 'trackr upload'.\n");
    } else {
        output.push_str(&format_transaction_table(fmt, recent));
    }

    let at_risk: Vec<&Budget> = budgets
        .iter()
        .filter(|b| b.is_over_budget || b.percentage >= 80.0)
        .collect();
    if !at_risk.is_empty() {
        output.push_str("\nBudgets needing attention\n");
        for budget in at_risk {
            let name = budget
                .category_label()
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", budget.category_id()));
            output.push_str(&format!(
                "  {:<20} {} {:>5.1}%{}\n",
                name,
                progress_bar(budget.percentage, SHARE_BAR_WIDTH),
                budget.percentage,
                if budget.is_over_budget { " OVER" } else { "" }
            ));
        }
    }

    output
}
