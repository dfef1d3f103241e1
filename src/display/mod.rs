//! Display formatting for terminal output
//!
//! Every number shown here comes from the backend as-is; this module only
//! decides how it looks (currency symbol, date format, table borders).

pub mod analytics;
pub mod budget;
pub mod category;
pub mod transaction;
pub mod user;

use std::fmt::Write;

use chrono::NaiveDate;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::Table;

use crate::config::{Settings, Theme};
use crate::models::Money;

pub use analytics::{format_by_category, format_by_month, format_dashboard, format_summary_cards};
pub use budget::{format_budget_list, progress_bar};
pub use category::{format_category_list, format_rule_list};
pub use transaction::{format_preview, format_transaction_details, format_transaction_page};
pub use user::format_profile;

/// Presentation preferences taken from the settings file
#[derive(Debug, Clone)]
pub struct Formatter {
    pub currency_symbol: String,
    pub date_format: String,
    pub theme: Theme,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            theme: Theme::System,
        }
    }
}

impl Formatter {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            currency_symbol: settings.currency_symbol.clone(),
            date_format: settings.date_format.clone(),
            theme: settings.theme,
        }
    }

    pub fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Falls back to ISO dates when the configured format cannot render
    pub fn date(&self, date: NaiveDate) -> String {
        let mut rendered = String::new();
        match write!(rendered, "{}", date.format(&self.date_format)) {
            Ok(()) => rendered,
            Err(_) => date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Build a table with the theme's border style; `numeric` columns are
    /// right-aligned
    pub(crate) fn table(&self, builder: Builder, numeric: &[usize]) -> String {
        let mut table = builder.build();
        self.apply_style(&mut table);
        for column in numeric {
            table.modify(Columns::single(*column), Alignment::right());
        }
        table.to_string()
    }

    fn apply_style(&self, table: &mut Table) {
        match self.theme {
            Theme::Light => {
                table.with(Style::sharp());
            }
            Theme::Dark => {
                table.with(Style::rounded());
            }
            Theme::System => {
                table.with(Style::modern());
            }
        }
    }
}

/// Empty-state message with a hint about what to do next
pub fn empty_state(message: &str, hint: &str) -> String {
    format!("{}\n\n{}\n", message, hint)
}

/// Truncate a string to a maximum number of characters
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
