//! Read-only analytics aggregates
//!
//! Every figure here is computed server-side. Field aliases cover the
//! naming differences between backend revisions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::decimal::deserialize_decimal;
use super::ids::CategoryId;
use super::money::Money;
use crate::error::{TrackrError, TrackrResult};

/// Totals for a period (`/api/analytics/summary/`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default, alias = "income", alias = "total_credit")]
    pub total_income: Money,

    #[serde(default, alias = "expenses", alias = "total_debit")]
    pub total_expenses: Money,

    #[serde(default, alias = "balance", alias = "net")]
    pub net_balance: Money,

    #[serde(default, alias = "count")]
    pub transaction_count: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_category: Option<String>,
}

/// One row of `/api/analytics/by-month/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyData {
    pub month: String,

    #[serde(default, alias = "total_income", alias = "credit")]
    pub income: Money,

    #[serde(default, alias = "total_expenses", alias = "debit")]
    pub expenses: Money,

    #[serde(default, alias = "balance")]
    pub net: Money,
}

/// One row of `/api/analytics/by-category/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalytics {
    #[serde(default, alias = "category", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,

    #[serde(default, alias = "name", alias = "category__name")]
    pub category_name: String,

    #[serde(default, alias = "amount", alias = "total_amount")]
    pub total: Money,

    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub percentage: f64,

    #[serde(default, alias = "transaction_count")]
    pub count: u64,
}

impl CategoryAnalytics {
    pub fn label(&self) -> &str {
        if self.category_name.is_empty() {
            "Uncategorized"
        } else {
            &self.category_name
        }
    }
}

/// Date range parameters shared by the analytics endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AnalyticsRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Number of trailing months (by-month only)
    pub months: Option<u32>,
}

impl AnalyticsRange {
    pub fn validate(&self) -> TrackrResult<()> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(TrackrError::Validation(format!(
                    "Start date {} is after end date {}",
                    start, end
                )));
            }
        }
        if self.months == Some(0) {
            return Err(TrackrError::Validation("Months must be at least 1".into()));
        }
        Ok(())
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(start) = self.start_date {
            query.push(("start_date".to_string(), start.to_string()));
        }
        if let Some(end) = self.end_date {
            query.push(("end_date".to_string(), end.to_string()));
        }
        if let Some(months) = self.months {
            query.push(("months".to_string(), months.to_string()));
        }
        query
    }
}
