//! Statement upload payloads
//!
//! `ParsedTransaction` is a row the backend extracted from an uploaded
//! statement but has not stored yet. `UploadResult` is what the direct
//! upload endpoint reports after storing rows itself.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::CategoryId;
use super::money::Money;
use super::transaction::{CategoryRef, NewTransaction, Transaction, TransactionKind};

/// A statement row awaiting review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub date: NaiveDate,

    #[serde(default)]
    pub description: String,

    pub amount: Money,

    #[serde(rename = "type", alias = "transaction_type")]
    pub kind: TransactionKind,

    /// Category suggested by the backend's rules, or chosen by the user
    #[serde(default, alias = "suggested_category")]
    pub category: Option<CategoryRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl ParsedTransaction {
    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().map(CategoryRef::id)
    }

    pub fn category_label(&self) -> Option<&str> {
        self.category_name
            .as_deref()
            .or_else(|| self.category.as_ref().and_then(CategoryRef::name))
    }

    /// Convert the (possibly edited) row into a create payload
    pub fn to_new_transaction(&self) -> NewTransaction {
        NewTransaction {
            amount: self.amount.abs(),
            description: self.description.clone(),
            date: self.date,
            kind: self.kind,
            category: self.category_id(),
            notes: None,
        }
    }
}

/// Outcome of a direct statement upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(default, alias = "transactions_created", alias = "imported")]
    pub created: u64,

    #[serde(default, alias = "duplicates", alias = "skipped_count")]
    pub skipped: u64,

    #[serde(default, alias = "auto_categorized")]
    pub categorized: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transactions: Vec<Transaction>,
}
