//! Authentication CLI commands
//!
//! Login, registration, logout and the profile page.

use std::io::Write;

use clap::Subcommand;
use zeroize::Zeroizing;

use super::AppContext;
use crate::api::UsersApi;
use crate::cache::{QueryKey, Resource};
use crate::config::SchemaRevision;
use crate::display::format_profile;
use crate::error::{TrackrError, TrackrResult};
use crate::models::{LoginRequest, ProfileUpdate, RegisterRequest};

/// Auth subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in and store the tokens
    Login {
        /// Email address (or username for legacy backends)
        #[arg(short, long, aliases = ["email", "username"])]
        user: Option<String>,
        /// Password (prompted when omitted)
        #[arg(long, env = "TRACKR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Username (required by legacy backends)
        #[arg(short, long)]
        username: Option<String>,
        /// First name
        #[arg(long)]
        first_name: Option<String>,
        /// Last name
        #[arg(long)]
        last_name: Option<String>,
        /// Password (prompted twice when omitted)
        #[arg(long, env = "TRACKR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored tokens
    Logout,

    /// Show who is signed in
    Whoami,

    /// Show or edit the profile
    Profile {
        /// New first name
        #[arg(long)]
        first_name: Option<String>,
        /// New last name
        #[arg(long)]
        last_name: Option<String>,
        /// New email address
        #[arg(long)]
        email: Option<String>,
        /// New avatar URL
        #[arg(long)]
        avatar: Option<String>,
    },
}

/// Handle an auth command
pub fn handle_auth_command(ctx: &AppContext, cmd: AuthCommands) -> TrackrResult<()> {
    match cmd {
        AuthCommands::Login { user, password } => {
            let label = match ctx.client().revision() {
                SchemaRevision::Current => "Email",
                SchemaRevision::Legacy => "Username",
            };
            let identifier = match user {
                Some(user) => user,
                None => prompt_line(&format!("{}: ", label))?,
            };
            let password = match password {
                Some(password) => Zeroizing::new(password),
                None => prompt_password("Password: ")?,
            };

            let request = LoginRequest {
                identifier,
                password,
            };
            request.validate()?;

            let user = ctx.session.login(&request)?;
            println!("Logged in as {}", user.display_name());
        }

        AuthCommands::Register {
            email,
            username,
            first_name,
            last_name,
            password,
        } => {
            let (password, password_confirm) = match password {
                Some(password) => (Zeroizing::new(password.clone()), Zeroizing::new(password)),
                None => (
                    prompt_password("Password: ")?,
                    prompt_password("Confirm password: ")?,
                ),
            };

            let request = RegisterRequest {
                email,
                username,
                first_name,
                last_name,
                password,
                password_confirm,
            };
            request.validate(ctx.client().revision())?;

            match ctx.session.register(&request)? {
                Some(user) => println!("Account created. Logged in as {}", user.display_name()),
                None => {
                    println!("Account created for {}", request.email);
                    println!("Run 'trackr auth login' to sign in.");
                }
            }
        }

        AuthCommands::Logout => {
            if !ctx.session.has_credentials() {
                println!("Not logged in.");
                return Ok(());
            }
            ctx.session.logout();
            ctx.cache.clear();
            println!("Logged out.");
        }

        AuthCommands::Whoami => {
            ctx.require_login()?;
            if !ctx.session.init() {
                return Err(TrackrError::SessionExpired);
            }
            if let Some(user) = ctx.session.current_user() {
                println!("{} <{}>", user.display_name(), user.email);
            }
        }

        AuthCommands::Profile {
            first_name,
            last_name,
            email,
            avatar,
        } => {
            ctx.require_login()?;
            let update = ProfileUpdate {
                first_name,
                last_name,
                email,
                avatar,
            };

            let user = if update.is_empty() {
                ctx.cache.fetch(QueryKey::new(Resource::User), || {
                    UsersApi::new(ctx.client()).me()
                })?
            } else {
                let user = ctx.cache.mutate(&[Resource::User], || {
                    UsersApi::new(ctx.client()).update_profile(&update)
                })?;
                ctx.session.set_user(user.clone());
                println!("Profile updated.\n");
                user
            };

            print!("{}", format_profile(&ctx.formatter, &user));
        }
    }

    Ok(())
}

fn prompt_line(prompt: &str) -> TrackrResult<String> {
    print!("{}", prompt);
    std::io::stdout()
        .flush()
        .map_err(|e| TrackrError::Io(e.to_string()))?;

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| TrackrError::Io(e.to_string()))?;
    Ok(line.trim().to_string())
}

fn prompt_password(prompt: &str) -> TrackrResult<Zeroizing<String>> {
    rpassword::prompt_password(prompt)
        .map(Zeroizing::new)
        .map_err(|e| TrackrError::Io(format!("Failed to read password: {}", e)))
}
