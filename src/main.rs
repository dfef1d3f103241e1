use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use trackr::cli::{
    handle_analytics_command, handle_auth_command, handle_budget_command,
    handle_category_command, handle_dashboard, handle_expense_command, handle_export_command,
    handle_rule_command, handle_settings_command, handle_upload_command, AppContext,
};
use trackr::config::{Settings, TrackrPaths};

#[derive(Parser)]
#[command(
    name = "trackr",
    version,
    about = "Command-line client for the Trackr personal finance service",
    long_about = "Trackr keeps your bank statements, transactions, category rules, \
                  budgets and spending analytics on a Trackr server. This client \
                  signs in, uploads statements and shows what the server computed."
)]
struct Cli {
    /// Backend base URL for this invocation (overrides the settings file)
    #[arg(long, global = true, env = "TRACKR_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Overview: summary figures, recent transactions, budgets at risk
    #[command(alias = "home")]
    Dashboard,

    /// Sign in, sign out and manage the profile
    #[command(subcommand)]
    Auth(trackr::cli::AuthCommands),

    /// Transaction commands
    #[command(subcommand, alias = "txn", alias = "transaction")]
    Expense(trackr::cli::ExpenseCommands),

    /// Spending analytics
    #[command(subcommand)]
    Analytics(trackr::cli::AnalyticsCommands),

    /// Statement uploads
    #[command(subcommand)]
    Upload(trackr::cli::UploadCommands),

    /// Monthly budgets
    #[command(subcommand)]
    Budget(trackr::cli::BudgetCommands),

    /// Category auto-assignment rules
    #[command(subcommand)]
    Rule(trackr::cli::RuleCommands),

    /// Category management
    #[command(subcommand)]
    Category(trackr::cli::CategoryCommands),

    /// Export data to CSV, JSON or YAML
    #[command(subcommand)]
    Export(trackr::cli::ExportCommands),

    /// Show or change settings
    #[command(subcommand, alias = "config")]
    Settings(trackr::cli::SettingsCommands),
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// Log to stderr; `TRACKR_LOG` takes an env-filter directive
fn init_logging() {
    let filter = EnvFilter::try_from_env("TRACKR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = TrackrPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let ctx = AppContext::new(paths, settings, cli.api_url.as_deref())?;

    match cli.command {
        Some(Commands::Dashboard) => handle_dashboard(&ctx)?,
        Some(Commands::Auth(cmd)) => handle_auth_command(&ctx, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&ctx, cmd)?,
        Some(Commands::Analytics(cmd)) => handle_analytics_command(&ctx, cmd)?,
        Some(Commands::Upload(cmd)) => handle_upload_command(&ctx, cmd)?,
        Some(Commands::Budget(cmd)) => handle_budget_command(&ctx, cmd)?,
        Some(Commands::Rule(cmd)) => handle_rule_command(&ctx, cmd)?,
        Some(Commands::Category(cmd)) => handle_category_command(&ctx, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&ctx, cmd)?,
        Some(Commands::Settings(cmd)) => handle_settings_command(&ctx, cmd)?,
        None => {
            println!("Trackr - personal finance from the command line");
            println!();
            if ctx.session.has_credentials() {
                println!("Run 'trackr dashboard' for an overview.");
            } else {
                println!("Run 'trackr auth login' to sign in.");
            }
            println!("Run 'trackr --help' for usage information.");
        }
    }

    Ok(())
}
