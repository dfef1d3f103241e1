//! Statement upload CLI commands
//!
//! Two flows: `direct` hands the file to the backend, which parses and
//! stores it in one step. `preview` keeps the parsed rows locally so
//! categories can be fixed and rows dropped before `commit`.

use std::path::PathBuf;

use clap::Subcommand;

use super::{stderr_progress, AppContext};
use crate::display::format_preview;
use crate::error::TrackrResult;
use crate::models::UploadResult;
use crate::services::{load_statement_file, UploadService};

/// Upload subcommands
#[derive(Subcommand)]
pub enum UploadCommands {
    /// Upload a statement and store its transactions immediately
    Direct {
        /// Statement file (CSV, PDF, XLS or XLSX)
        file: PathBuf,
        /// MIME type to send instead of the detected one
        #[arg(long)]
        mime: Option<String>,
    },

    /// Upload a statement for review before storing it
    Preview {
        /// Statement file (CSV, PDF, XLS or XLSX)
        file: PathBuf,
        /// MIME type to send instead of the detected one
        #[arg(long)]
        mime: Option<String>,
    },

    /// Show the pending preview
    Show,

    /// Change the category of a preview row ("none" clears it)
    #[command(name = "set-category")]
    SetCategory {
        /// Row number as shown by 'trackr upload show'
        row: usize,
        /// Category name or ID, or "none"
        category: String,
    },

    /// Drop a row from the pending preview
    Remove {
        /// Row number as shown by 'trackr upload show'
        row: usize,
    },

    /// Store the reviewed rows
    Commit,

    /// Throw away the pending preview
    Discard,
}

/// Handle an upload command
pub fn handle_upload_command(ctx: &AppContext, cmd: UploadCommands) -> TrackrResult<()> {
    let service = UploadService::new(ctx.client(), &ctx.cache, &ctx.previews);

    match cmd {
        UploadCommands::Direct { file, mime } => {
            let statement =
                load_statement_file(&file, mime.as_deref(), ctx.settings.max_upload_bytes())?;
            ctx.require_login()?;

            let result =
                service.upload_direct(&statement, Some(stderr_progress("Uploading")))?;
            print_result(&statement.file_name, &result);
        }

        UploadCommands::Preview { file, mime } => {
            let statement =
                load_statement_file(&file, mime.as_deref(), ctx.settings.max_upload_bytes())?;
            ctx.require_login()?;

            let preview = service.preview(&statement, Some(stderr_progress("Uploading")))?;
            print!("{}", format_preview(&ctx.formatter, &preview));
        }

        UploadCommands::Show => {
            let preview = ctx.previews.require()?;
            print!("{}", format_preview(&ctx.formatter, &preview));
        }

        UploadCommands::SetCategory { row, category } => {
            let preview = if category.trim().eq_ignore_ascii_case("none") {
                service.set_category(row, None)?
            } else {
                ctx.require_login()?;
                let category = ctx.resolve_category(&category)?;
                service.set_category(row, Some(&category))?
            };
            println!("Row {} updated.\n", row);
            print!("{}", format_preview(&ctx.formatter, &preview));
        }

        UploadCommands::Remove { row } => {
            let (removed, preview) = service.remove_row(row)?;
            println!(
                "Removed row {}: {} {}\n",
                row,
                ctx.formatter.date(removed.date),
                removed.description
            );
            print!("{}", format_preview(&ctx.formatter, &preview));
        }

        UploadCommands::Commit => {
            ctx.require_login()?;
            let result = service.commit()?;
            print_result("preview", &result);
        }

        UploadCommands::Discard => {
            if ctx.previews.discard()? {
                println!("Pending preview discarded.");
            } else {
                println!("No pending preview.");
            }
        }
    }

    Ok(())
}

fn print_result(source: &str, result: &UploadResult) {
    println!("Imported {} transactions from {}", result.created, source);
    if result.skipped > 0 {
        println!("  Skipped (duplicates): {}", result.skipped);
    }
    if result.categorized > 0 {
        println!("  Auto-categorized: {}", result.categorized);
    }
    if let Some(message) = result.message.as_deref().filter(|m| !m.is_empty()) {
        println!("  {}", message);
    }
}
