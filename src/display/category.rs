//! Category and category rule display formatting

use std::collections::HashMap;

use tabled::builder::Builder;

use super::{empty_state, Formatter};
use crate::models::{Category, CategoryId, CategoryRule};

/// Format categories as a table
pub fn format_category_list(fmt: &Formatter, categories: &[Category]) -> String {
    if categories.is_empty() {
        return empty_state(
            "No categories found.",
            "Create one with 'trackr category add <NAME>'.",
        );
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Color", "Default"]);
    for category in categories {
        builder.push_record([
            category.id.to_string(),
            category.to_string(),
            category.color.clone().unwrap_or_default(),
            if category.is_default { "yes" } else { "" }.to_string(),
        ]);
    }

    let mut output = fmt.table(builder, &[0]);
    output.push('\n');
    output
}

/// Format category rules as a table
///
/// Rules that only carry a category id get the name from `categories`.
pub fn format_rule_list(fmt: &Formatter, rules: &[CategoryRule], categories: &[Category]) -> String {
    if rules.is_empty() {
        return empty_state(
            "No category rules yet.",
            "Rules assign categories automatically. Add one with \
             'trackr rule add <KEYWORD> --category <CATEGORY>'.",
        );
    }

    let names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();

    let mut builder = Builder::default();
    builder.push_record(["ID", "Keyword", "Category", "Priority", "Active"]);
    for rule in rules {
        let category = rule
            .category_label()
            .or_else(|| names.get(&rule.category_id()).copied())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{}", rule.category_id()));
        builder.push_record([
            rule.id.to_string(),
            rule.keyword.clone(),
            category,
            rule.priority.map(|p| p.to_string()).unwrap_or_default(),
            if rule.is_active { "yes" } else { "no" }.to_string(),
        ]);
    }

    let mut output = fmt.table(builder, &[0, 3]);
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_list_resolves_names() {
        let categories: Vec<Category> =
            serde_json::from_str(r#"[{"id": 4, "name": "Transport"}]"#).unwrap();
        let rules: Vec<CategoryRule> = serde_json::from_str(
            r#"[{"id": 1, "keyword": "uber", "category": 4},
                {"id": 2, "keyword": "netflix", "category": 9, "is_active": false}]"#,
        )
        .unwrap();

        let output = format_rule_list(&Formatter::default(), &rules, &categories);
        assert!(output.contains("Transport"));
        assert!(output.contains("#9"));
        assert!(output.contains("no"));
    }

    #[test]
    fn test_empty_states() {
        let fmt = Formatter::default();
        assert!(format_category_list(&fmt, &[]).contains("No categories found."));
        assert!(format_rule_list(&fmt, &[], &[]).contains("No category rules yet."));
    }
}
