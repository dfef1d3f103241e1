//! Category CLI commands
//!
//! Implements CLI commands for category management.

use clap::Subcommand;

use super::{confirm, AppContext};
use crate::api::CategoriesApi;
use crate::cache::Resource;
use crate::display::format_category_list;
use crate::error::TrackrResult;
use crate::models::{CategoryUpdate, NewCategory};

/// Deleting or renaming a category changes how transactions, rules and
/// budgets are labelled
const CATEGORY_RESOURCES: [Resource; 5] = [
    Resource::Categories,
    Resource::CategoryRules,
    Resource::Expenses,
    Resource::Budgets,
    Resource::Analytics,
];

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories
    List,

    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// Icon name
        #[arg(short, long)]
        icon: Option<String>,
        /// Color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New icon
        #[arg(short, long)]
        icon: Option<String>,
        /// New color as #RRGGBB
        #[arg(short, long)]
        color: Option<String>,
    },

    /// Delete a category
    Delete {
        /// Category name or ID
        category: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Handle a category command
pub fn handle_category_command(ctx: &AppContext, cmd: CategoryCommands) -> TrackrResult<()> {
    ctx.require_login()?;
    let api = CategoriesApi::new(ctx.client());

    match cmd {
        CategoryCommands::List => {
            let categories = ctx.categories()?;
            print!("{}", format_category_list(&ctx.formatter, &categories));
        }

        CategoryCommands::Add { name, icon, color } => {
            let new = NewCategory { name, icon, color };
            new.validate()?;

            let category = ctx.cache.mutate(&[Resource::Categories], || api.create(&new))?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Edit {
            category,
            name,
            icon,
            color,
        } => {
            let existing = ctx.resolve_category(&category)?;
            let update = CategoryUpdate { name, icon, color };
            update.validate()?;

            let updated = ctx
                .cache
                .mutate(&CATEGORY_RESOURCES, || api.update(existing.id, &update))?;
            println!("Updated category: {}", updated.name);
        }

        CategoryCommands::Delete { category, yes } => {
            let existing = ctx.resolve_category(&category)?;
            if !yes
                && !confirm(&format!(
                    "Delete category '{}'? Its transactions become uncategorized.",
                    existing.name
                ))?
            {
                println!("Cancelled.");
                return Ok(());
            }

            ctx.cache
                .mutate(&CATEGORY_RESOURCES, || api.delete(existing.id))?;
            println!("Deleted category: {}", existing.name);
        }
    }

    Ok(())
}
