//! Category rule CLI commands
//!
//! Rules map a description keyword to a category; the backend applies
//! them when statements are imported.

use clap::Subcommand;

use super::AppContext;
use crate::api::CategoryRulesApi;
use crate::cache::{QueryKey, Resource};
use crate::display::format_rule_list;
use crate::error::TrackrResult;
use crate::models::{CategoryRuleId, CategoryRuleUpdate, NewCategoryRule};

/// Rule subcommands
#[derive(Subcommand)]
pub enum RuleCommands {
    /// List category rules
    List,

    /// Add a rule
    Add {
        /// Keyword matched against transaction descriptions
        keyword: String,
        /// Category name or ID to assign
        #[arg(short, long)]
        category: String,
        /// Priority (higher wins when several rules match)
        #[arg(short, long)]
        priority: Option<i32>,
    },

    /// Edit a rule
    Edit {
        /// Rule ID
        id: CategoryRuleId,
        /// New keyword
        #[arg(short, long)]
        keyword: Option<String>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<i32>,
        /// Enable the rule
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        /// Disable the rule
        #[arg(long)]
        disable: bool,
    },

    /// Delete a rule
    Delete {
        /// Rule ID
        id: CategoryRuleId,
    },
}

/// Handle a rule command
pub fn handle_rule_command(ctx: &AppContext, cmd: RuleCommands) -> TrackrResult<()> {
    ctx.require_login()?;
    let api = CategoryRulesApi::new(ctx.client());

    match cmd {
        RuleCommands::List => {
            let rules = ctx
                .cache
                .fetch(QueryKey::new(Resource::CategoryRules), || api.list())?;
            let categories = ctx.categories()?;
            print!("{}", format_rule_list(&ctx.formatter, &rules, &categories));
        }

        RuleCommands::Add {
            keyword,
            category,
            priority,
        } => {
            let category = ctx.resolve_category(&category)?;
            let new = NewCategoryRule {
                keyword,
                category: category.id,
                priority,
            };
            new.validate()?;

            let rule = ctx
                .cache
                .mutate(&[Resource::CategoryRules], || api.create(&new))?;
            println!("Added rule {}: '{}' -> {}", rule.id, rule.keyword, category.name);
        }

        RuleCommands::Edit {
            id,
            keyword,
            category,
            priority,
            enable,
            disable,
        } => {
            let category = match category {
                Some(needle) => Some(ctx.resolve_category(&needle)?.id),
                None => None,
            };
            let is_active = match (enable, disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let update = CategoryRuleUpdate {
                keyword,
                category,
                priority,
                is_active,
            };
            update.validate()?;

            let rule = ctx
                .cache
                .mutate(&[Resource::CategoryRules], || api.update(id, &update))?;
            println!(
                "Updated rule {}: '{}' ({})",
                rule.id,
                rule.keyword,
                if rule.is_active { "active" } else { "inactive" }
            );
        }

        RuleCommands::Delete { id } => {
            ctx.cache
                .mutate(&[Resource::CategoryRules], || api.delete(id))?;
            println!("Deleted rule {}", id);
        }
    }

    Ok(())
}
