//! CLI command handlers
//!
//! This module contains the implementation of CLI commands, bridging the
//! clap argument parsing with the API and service layers. Each command
//! group stands in for one page of the web client.

pub mod analytics;
pub mod auth;
pub mod budget;
pub mod category;
pub mod expense;
pub mod export;
pub mod rule;
pub mod settings;
pub mod upload;

pub use analytics::{handle_analytics_command, handle_dashboard, AnalyticsCommands};
pub use auth::{handle_auth_command, AuthCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands, ExportFormat};
pub use rule::{handle_rule_command, RuleCommands};
pub use settings::{handle_settings_command, SettingsCommands};
pub use upload::{handle_upload_command, UploadCommands};

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::{ApiClient, CategoriesApi, ProgressCallback};
use crate::cache::{QueryCache, QueryKey, Resource};
use crate::config::{Settings, TrackrPaths};
use crate::display::Formatter;
use crate::error::{TrackrError, TrackrResult};
use crate::models::{find_category, Category, Money};
use crate::services::{PreviewStore, Session};
use crate::storage::{FileTokenStore, TokenStore};

/// Everything a command handler needs, built once per invocation
pub struct AppContext {
    pub paths: TrackrPaths,
    pub settings: Settings,
    pub session: Session,
    pub cache: QueryCache,
    pub previews: PreviewStore,
    pub formatter: Formatter,
    client: Arc<ApiClient>,
}

impl AppContext {
    /// Wire up the client, session and local stores
    ///
    /// `api_url` overrides the configured backend for this invocation only;
    /// it is never written back to the settings file. Nothing here talks to
    /// the backend.
    pub fn new(paths: TrackrPaths, settings: Settings, api_url: Option<&str>) -> TrackrResult<Self> {
        let tokens: Arc<dyn TokenStore> =
            Arc::new(FileTokenStore::open(paths.credentials_file())?);

        let mut effective = settings.clone();
        if let Some(url) = api_url {
            effective.set_api_base_url(url)?;
        }
        let client = Arc::new(ApiClient::from_settings(&effective, tokens)?);
        let session = Session::new(Arc::clone(&client));

        Ok(Self {
            cache: QueryCache::new(Duration::from_secs(settings.cache_ttl_secs)),
            previews: PreviewStore::new(paths.preview_file()),
            formatter: Formatter::from_settings(&settings),
            session,
            client,
            paths,
            settings,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Fail before any request when no credentials are stored
    pub fn require_login(&self) -> TrackrResult<()> {
        self.session.require_credentials()
    }

    /// All categories, cached for the rest of the invocation
    pub fn categories(&self) -> TrackrResult<Vec<Category>> {
        self.cache.fetch(QueryKey::new(Resource::Categories), || {
            CategoriesApi::new(self.client()).list()
        })
    }

    /// Resolve a category given by id or name
    pub fn resolve_category(&self, needle: &str) -> TrackrResult<Category> {
        let categories = self.categories()?;
        find_category(&categories, needle)
            .cloned()
            .ok_or_else(|| TrackrError::category_not_found(needle))
    }
}

/// Parse a money amount from a command-line argument
pub fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| e.to_string())
}

/// Parse a `YYYY-MM-DD` date from a command-line argument
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}'. Use YYYY-MM-DD.", s))
}

/// Upload progress drawn as a bar on stderr
pub fn stderr_progress(label: &str) -> ProgressCallback {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_message(label.to_string());
    progress_callback(bar)
}

/// Drive `bar` from upload percentages; it finishes at 100
fn progress_callback(bar: ProgressBar) -> ProgressCallback {
    Arc::new(move |percent: u8| {
        bar.set_position(u64::from(percent.min(100)));
        if percent >= 100 && !bar.is_finished() {
            bar.finish();
        }
    })
}

/// Ask a yes/no question on stdin; anything but y/yes is no
pub fn confirm(prompt: &str) -> TrackrResult<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout()
        .flush()
        .map_err(|e| TrackrError::Io(e.to_string()))?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|e| TrackrError::Io(e.to_string()))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
