//! Budget model
//!
//! A budget is a per-category monthly spending limit. `spent`, `remaining`,
//! `percentage` and `is_over_budget` are computed by the backend and shown
//! as-is.

use chrono::{Datelike, Local, NaiveDate};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::decimal::deserialize_decimal;
use super::ids::{BudgetId, CategoryId};
use super::transaction::CategoryRef;
use super::money::Money;
use crate::error::{TrackrError, TrackrResult};

/// A calendar month, stored as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BudgetMonth(NaiveDate);

impl BudgetMonth {
    pub fn new(year: i32, month: u32) -> TrackrResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| TrackrError::Validation(format!("Invalid month: {}-{:02}", year, month)))
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for BudgetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for BudgetMonth {
    type Err = TrackrError;

    /// Accepts `YYYY-MM` and `YYYY-MM-DD`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::containing(date));
        }
        NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| {
                TrackrError::Validation(format!("Invalid month '{}'. Use YYYY-MM.", s))
            })
    }
}

impl Serialize for BudgetMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.format("%Y-%m-%d").to_string())
    }
}

impl<'de> Deserialize<'de> for BudgetMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A per-category monthly spending limit with backend-computed progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    pub category: CategoryRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    pub amount: Money,

    pub month: BudgetMonth,

    #[serde(default)]
    pub spent: Money,

    #[serde(default)]
    pub remaining: Money,

    /// Share of the limit already spent, 0-100+
    #[serde(default, deserialize_with = "deserialize_decimal")]
    pub percentage: f64,

    #[serde(default)]
    pub is_over_budget: bool,
}

impl Budget {
    pub fn category_id(&self) -> CategoryId {
        self.category.id()
    }

    /// Category name from the flattened field or the nested object
    pub fn category_label(&self) -> Option<&str> {
        self.category_name.as_deref().or_else(|| self.category.name())
    }
}

/// Fields for creating a budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBudget {
    pub category: CategoryId,
    pub amount: Money,
    pub month: BudgetMonth,
}

impl NewBudget {
    pub fn validate(&self) -> TrackrResult<()> {
        if !self.amount.is_positive() {
            return Err(TrackrError::Validation(
                "Budget amount must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Partial update for a budget
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BudgetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<BudgetMonth>,
}

impl BudgetUpdate {
    pub fn validate(&self) -> TrackrResult<()> {
        if *self == Self::default() {
            return Err(TrackrError::Validation("No changes specified".into()));
        }
        if let Some(amount) = self.amount {
            if !amount.is_positive() {
                return Err(TrackrError::Validation(
                    "Budget amount must be greater than zero".into(),
                ));
            }
        }
        Ok(())
    }
}
