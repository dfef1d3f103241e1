//! Category rule model
//!
//! A rule maps a keyword to a category. The backend applies rules when it
//! classifies future transactions; the client only manages them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, CategoryRuleId};
use super::transaction::CategoryRef;
use crate::error::{TrackrError, TrackrResult};

const MAX_KEYWORD_LEN: usize = 100;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: CategoryRuleId,

    pub keyword: String,

    pub category: CategoryRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,

    /// Higher priority rules win when several keywords match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CategoryRule {
    pub fn category_id(&self) -> CategoryId {
        self.category.id()
    }

    /// Category name from the flattened field or the nested object
    pub fn category_label(&self) -> Option<&str> {
        self.category_name.as_deref().or_else(|| self.category.name())
    }
}

/// Fields for creating a rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategoryRule {
    pub keyword: String,
    pub category: CategoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl NewCategoryRule {
    pub fn validate(&self) -> TrackrResult<()> {
        validate_keyword(&self.keyword)
    }
}

/// Partial update for a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl CategoryRuleUpdate {
    pub fn validate(&self) -> TrackrResult<()> {
        if *self == Self::default() {
            return Err(TrackrError::Validation("No changes specified".into()));
        }
        if let Some(keyword) = &self.keyword {
            validate_keyword(keyword)?;
        }
        Ok(())
    }
}

fn validate_keyword(keyword: &str) -> TrackrResult<()> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(TrackrError::Validation("Keyword cannot be empty".into()));
    }
    if keyword.chars().count() > MAX_KEYWORD_LEN {
        return Err(TrackrError::Validation(format!(
            "Keyword must be at most {} characters",
            MAX_KEYWORD_LEN
        )));
    }
    Ok(())
}
