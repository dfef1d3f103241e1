//! Settings CLI commands
//!
//! The settings page: backend URL, theme, formatting and wire revision.
//! Changes are written to the settings file immediately.

use clap::Subcommand;

use super::AppContext;
use crate::config::{SchemaRevision, Settings, Theme};
use crate::error::{TrackrError, TrackrResult};

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings and paths
    Show,

    /// Set the backend base URL
    #[command(name = "api-url")]
    ApiUrl {
        /// URL, e.g. https://trackr.example.com
        url: String,
    },

    /// Set the theme (light, dark or system)
    Theme { theme: Theme },

    /// Set the currency symbol used for amounts
    Currency { symbol: String },

    /// Set the date format (strftime, e.g. %d/%m/%Y)
    #[command(name = "date-format")]
    DateFormat { format: String },

    /// Set the backend wire revision (current or legacy)
    Revision { revision: SchemaRevision },

    /// Set the request timeout in seconds
    Timeout { seconds: u64 },

    /// Set the largest statement accepted for upload, in MB
    #[command(name = "max-upload")]
    MaxUpload { megabytes: u64 },

    /// Restore the default settings
    Reset,
}

/// Handle a settings command
pub fn handle_settings_command(ctx: &AppContext, cmd: SettingsCommands) -> TrackrResult<()> {
    if let SettingsCommands::Show = cmd {
        show(ctx);
        return Ok(());
    }

    let settings = apply(ctx.settings.clone(), cmd)?;
    settings.save(&ctx.paths)?;
    println!("Settings saved to {}", ctx.paths.settings_file().display());
    Ok(())
}

/// Apply one change to a copy of the settings
fn apply(mut settings: Settings, cmd: SettingsCommands) -> TrackrResult<Settings> {
    match cmd {
        SettingsCommands::Show => {}
        SettingsCommands::ApiUrl { url } => settings.set_api_base_url(&url)?,
        SettingsCommands::Theme { theme } => settings.theme = theme,
        SettingsCommands::Currency { symbol } => {
            let symbol = symbol.trim();
            if symbol.is_empty() || symbol.chars().count() > 4 {
                return Err(TrackrError::Validation(
                    "Currency symbol must be 1 to 4 characters".into(),
                ));
            }
            settings.currency_symbol = symbol.to_string();
        }
        SettingsCommands::DateFormat { format } => settings.set_date_format(&format)?,
        SettingsCommands::Revision { revision } => settings.schema_revision = revision,
        SettingsCommands::Timeout { seconds } => {
            if seconds == 0 {
                return Err(TrackrError::Validation("Timeout must be at least 1 second".into()));
            }
            settings.request_timeout_secs = seconds;
        }
        SettingsCommands::MaxUpload { megabytes } => {
            if megabytes == 0 {
                return Err(TrackrError::Validation("Upload limit must be at least 1 MB".into()));
            }
            settings.max_upload_mb = megabytes;
        }
        SettingsCommands::Reset => settings = Settings::default(),
    }
    Ok(settings)
}

fn show(ctx: &AppContext) {
    let settings = &ctx.settings;
    println!("Trackr Configuration");
    println!("====================");
    println!("Data directory:   {}", ctx.paths.base_dir().display());
    println!("Settings file:    {}", ctx.paths.settings_file().display());
    println!();
    println!("Settings:");
    println!("  API URL:        {}", settings.api_base_url);
    if ctx.client().base_url() != settings.api_base_url {
        println!("  (overridden):   {}", ctx.client().base_url());
    }
    println!("  Theme:          {}", settings.theme);
    println!("  Revision:       {}", settings.schema_revision);
    println!("  Currency:       {}", settings.currency_symbol);
    println!("  Date format:    {}", settings.date_format);
    println!("  Timeout:        {}s", settings.request_timeout_secs);
    println!("  Max upload:     {} MB", settings.max_upload_mb);
    println!("  Cache TTL:      {}s", settings.cache_ttl_secs);
    println!();
    println!(
        "Logged in:        {}",
        if ctx.session.has_credentials() { "yes" } else { "no" }
    );
    if ctx.previews.load().ok().flatten().is_some() {
        println!("Pending preview:  yes (see 'trackr upload show')");
    }
}
