//! Analytics and dashboard CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use super::{parse_date, AppContext};
use crate::api::{AnalyticsApi, BudgetsApi, ExpensesApi};
use crate::cache::{QueryKey, Resource};
use crate::display::{format_by_category, format_by_month, format_dashboard, format_summary_cards};
use crate::error::{TrackrError, TrackrResult};
use crate::models::{AnalyticsRange, BudgetMonth, TransactionFilter};

/// Transactions shown on the dashboard
const RECENT_COUNT: usize = 5;

/// Analytics subcommands
#[derive(Subcommand)]
pub enum AnalyticsCommands {
    /// Income, expenses and net balance
    Summary {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Spending broken down by category
    #[command(name = "by-category")]
    ByCategory {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Income and expenses per month
    #[command(name = "by-month")]
    ByMonth {
        #[command(flatten)]
        range: RangeArgs,
        /// Number of trailing months
        #[arg(short, long)]
        months: Option<u32>,
    },
}

/// Date range shared by the analytics commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

impl RangeArgs {
    fn into_range(self, months: Option<u32>) -> TrackrResult<AnalyticsRange> {
        let range = AnalyticsRange {
            start_date: self.from,
            end_date: self.to,
            months,
        };
        range.validate()?;
        Ok(range)
    }
}

fn range_key(range: &AnalyticsRange, view: &str) -> QueryKey {
    QueryKey::with_params(Resource::Analytics, format!("{}:{:?}", view, range))
}

/// Handle an analytics command
pub fn handle_analytics_command(ctx: &AppContext, cmd: AnalyticsCommands) -> TrackrResult<()> {
    ctx.require_login()?;
    let api = AnalyticsApi::new(ctx.client());

    match cmd {
        AnalyticsCommands::Summary { range } => {
            let range = range.into_range(None)?;
            let summary = ctx
                .cache
                .fetch(range_key(&range, "summary"), || api.summary(&range))?;
            print!("{}", format_summary_cards(&ctx.formatter, &summary));
        }

        AnalyticsCommands::ByCategory { range } => {
            let range = range.into_range(None)?;
            let rows = ctx
                .cache
                .fetch(range_key(&range, "by-category"), || api.by_category(&range))?;
            print!("{}", format_by_category(&ctx.formatter, &rows));
        }

        AnalyticsCommands::ByMonth { range, months } => {
            let range = range.into_range(months)?;
            let rows = ctx
                .cache
                .fetch(range_key(&range, "by-month"), || api.by_month(&range))?;
            print!("{}", format_by_month(&ctx.formatter, &rows));
        }
    }

    Ok(())
}

/// The landing page: profile greeting, summary, recent transactions and
/// budgets close to their limit
pub fn handle_dashboard(ctx: &AppContext) -> TrackrResult<()> {
    ctx.require_login()?;
    if !ctx.session.init() {
        return Err(TrackrError::SessionExpired);
    }

    let range = AnalyticsRange::default();
    let summary = ctx.cache.fetch(range_key(&range, "summary"), || {
        AnalyticsApi::new(ctx.client()).summary(&range)
    })?;

    let filter = TransactionFilter {
        ordering: Some("-date".into()),
        ..TransactionFilter::default()
    };
    let page = ctx.cache.fetch(
        QueryKey::with_params(Resource::Expenses, format!("{:?}", filter)),
        || ExpensesApi::new(ctx.client()).list(&filter),
    )?;
    let recent: Vec<_> = page.results.into_iter().take(RECENT_COUNT).collect();

    let month = BudgetMonth::current();
    let budgets = ctx.cache.fetch(
        QueryKey::with_params(Resource::Budgets, month.to_string()),
        || BudgetsApi::new(ctx.client()).list(Some(month)),
    )?;

    let user = ctx.session.current_user();
    print!(
        "{}",
        format_dashboard(&ctx.formatter, user.as_ref(), &summary, &recent, &budgets)
    );
    Ok(())
}
