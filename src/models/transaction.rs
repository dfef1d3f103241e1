//! Transaction (expense) model
//!
//! Mirrors the backend's expense resource. Two schema revisions exist in
//! the wild: one labels direction `DEBIT`/`CREDIT` under
//! `transaction_type`, the other `expense`/`income` under `type`. Both are
//! read; requests are written in the configured revision.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::ids::{CategoryId, TransactionId};
use super::money::Money;
use crate::config::SchemaRevision;
use crate::error::{TrackrError, TrackrResult};

/// Longest description the backend stores
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Direction of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    /// Money out (`expense` / `DEBIT`)
    Expense,
    /// Money in (`income` / `CREDIT`)
    Income,
}

impl TransactionKind {
    /// Value written on the wire for the given revision
    pub fn wire_value(&self, revision: SchemaRevision) -> &'static str {
        match (self, revision) {
            (Self::Expense, SchemaRevision::Current) => "expense",
            (Self::Income, SchemaRevision::Current) => "income",
            (Self::Expense, SchemaRevision::Legacy) => "DEBIT",
            (Self::Income, SchemaRevision::Legacy) => "CREDIT",
        }
    }

    /// Field name carrying the direction for the given revision
    pub fn wire_field(revision: SchemaRevision) -> &'static str {
        match revision {
            SchemaRevision::Current => "type",
            SchemaRevision::Legacy => "transaction_type",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "expense"),
            Self::Income => write!(f, "income"),
        }
    }
}

impl FromStr for TransactionKind {
    type Err = TrackrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "debit" | "out" => Ok(Self::Expense),
            "income" | "credit" | "in" => Ok(Self::Income),
            other => Err(TrackrError::Validation(format!(
                "Unknown transaction type '{}'. Use expense or income.",
                other
            ))),
        }
    }
}

impl Serialize for TransactionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_value(SchemaRevision::Current))
    }
}

impl<'de> Deserialize<'de> for TransactionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(|_| {
            de::Error::unknown_variant(&raw, &["expense", "income", "DEBIT", "CREDIT"])
        })
    }
}

/// Category reference as embedded in a transaction
///
/// Some endpoints return the bare id, others a nested object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(CategoryId),
    Nested {
        id: CategoryId,
        #[serde(default)]
        name: Option<String>,
    },
}

impl CategoryRef {
    pub fn id(&self) -> CategoryId {
        match self {
            Self::Id(id) => *id,
            Self::Nested { id, .. } => *id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Nested { name, .. } => name.as_deref(),
        }
    }
}

/// A single income or outgoing payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    pub amount: Money,

    #[serde(default)]
    pub category: Option<CategoryRef>,

    /// Flattened category name some serializers add next to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    #[serde(default)]
    pub description: String,

    pub date: NaiveDate,

    #[serde(rename = "type", alias = "transaction_type")]
    pub kind: TransactionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().map(CategoryRef::id)
    }

    /// Category name supplied by the backend, if any
    pub fn category_label(&self) -> Option<&str> {
        self.category_name
            .as_deref()
            .or_else(|| self.category.as_ref().and_then(CategoryRef::name))
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

/// Fields for creating a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Money,
    pub description: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: Option<CategoryId>,
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Client-side form validation
    pub fn validate(&self) -> TrackrResult<()> {
        validate_amount(self.amount)?;
        validate_description(&self.description)
    }

    pub fn to_payload(&self, revision: SchemaRevision) -> Value {
        let mut body = Map::new();
        body.insert("amount".into(), Value::from(self.amount.to_decimal_string()));
        body.insert(
            "description".into(),
            Value::from(self.description.trim()),
        );
        body.insert("date".into(), Value::from(self.date.to_string()));
        body.insert(
            TransactionKind::wire_field(revision).into(),
            Value::from(self.kind.wire_value(revision)),
        );
        body.insert(
            "category".into(),
            self.category.map_or(Value::Null, |id| Value::from(id.get())),
        );
        if let Some(notes) = &self.notes {
            body.insert("notes".into(), Value::from(notes.as_str()));
        }
        Value::Object(body)
    }
}

/// Partial update for `PATCH /api/expenses/:id/`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    /// `Some(None)` clears the category
    pub category: Option<Option<CategoryId>>,
    pub notes: Option<String>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> TrackrResult<()> {
        if self.is_empty() {
            return Err(TrackrError::Validation("No changes specified".into()));
        }
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }

    pub fn to_payload(&self, revision: SchemaRevision) -> Value {
        let mut body = Map::new();
        if let Some(amount) = self.amount {
            body.insert("amount".into(), Value::from(amount.to_decimal_string()));
        }
        if let Some(description) = &self.description {
            body.insert("description".into(), Value::from(description.trim()));
        }
        if let Some(date) = self.date {
            body.insert("date".into(), Value::from(date.to_string()));
        }
        if let Some(kind) = self.kind {
            body.insert(
                TransactionKind::wire_field(revision).into(),
                Value::from(kind.wire_value(revision)),
            );
        }
        if let Some(category) = self.category {
            body.insert(
                "category".into(),
                category.map_or(Value::Null, |id| Value::from(id.get())),
            );
        }
        if let Some(notes) = &self.notes {
            body.insert("notes".into(), Value::from(notes.as_str()));
        }
        Value::Object(body)
    }
}

/// Query filters for `GET /api/expenses/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TransactionFilter {
    pub category: Option<CategoryId>,
    pub kind: Option<TransactionKind>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub search: Option<String>,
    /// Backend ordering expression, e.g. `-date`
    pub ordering: Option<String>,
    pub page: Option<u32>,
}

impl TransactionFilter {
    pub fn validate(&self) -> TrackrResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(TrackrError::Validation(format!(
                    "Start date {} is after end date {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn to_query(&self, revision: SchemaRevision) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(category) = self.category {
            query.push(("category".to_string(), category.to_string()));
        }
        if let Some(kind) = self.kind {
            query.push((
                TransactionKind::wire_field(revision).to_string(),
                kind.wire_value(revision).to_string(),
            ));
        }
        if let Some(from) = self.date_from {
            query.push(("date_from".to_string(), from.to_string()));
        }
        if let Some(to) = self.date_to {
            query.push(("date_to".to_string(), to.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                query.push(("search".to_string(), search.to_string()));
            }
        }
        if let Some(ordering) = &self.ordering {
            query.push(("ordering".to_string(), ordering.clone()));
        }
        if let Some(page) = self.page {
            query.push(("page".to_string(), page.to_string()));
        }
        query
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// List responses come paginated or as a bare array depending on the view
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Paginated(Page<T>),
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub fn into_page(self) -> Page<T> {
        match self {
            Self::Paginated(page) => page,
            Self::Bare(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

fn validate_amount(amount: Money) -> TrackrResult<()> {
    if !amount.is_positive() {
        return Err(TrackrError::Validation(
            "Amount must be greater than zero".into(),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> TrackrResult<()> {
    let description = description.trim();
    if description.is_empty() {
        return Err(TrackrError::Validation("Description is required".into()));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(TrackrError::Validation(format!(
            "Description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(())
}
