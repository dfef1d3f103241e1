//! Category model
//!
//! Categories are user-defined labels for grouping transactions. The
//! backend seeds a set of default categories which are flagged
//! `is_default`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use crate::error::{TrackrError, TrackrResult};

const MAX_NAME_LEN: usize = 50;

/// A transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    /// Emoji or icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Hex color, e.g. `#22c55e`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub is_default: bool,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.icon {
            Some(icon) if !icon.is_empty() => write!(f, "{} {}", icon, self.name),
            _ => write!(f, "{}", self.name),
        }
    }
}

/// Look up a category by id or by case-insensitive name
pub fn find_category<'a>(categories: &'a [Category], needle: &str) -> Option<&'a Category> {
    let needle = needle.trim();
    if let Ok(id) = needle.parse::<CategoryId>() {
        if let Some(found) = categories.iter().find(|c| c.id == id) {
            return Some(found);
        }
    }
    categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(needle))
}

/// Fields for creating a category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> TrackrResult<()> {
        validate_name(&self.name)?;
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(())
    }
}

/// Partial update for a category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CategoryUpdate {
    pub fn validate(&self) -> TrackrResult<()> {
        if *self == Self::default() {
            return Err(TrackrError::Validation("No changes specified".into()));
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(color) = &self.color {
            validate_color(color)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> TrackrResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackrError::Validation("Category name cannot be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TrackrError::Validation(format!(
            "Category name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_color(color: &str) -> TrackrResult<()> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(TrackrError::Validation(format!(
            "Color '{}' must look like #RRGGBB",
            color
        )));
    }
    Ok(())
}
