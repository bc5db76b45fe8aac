//! CLI command definitions and dispatch.

pub mod config;
pub mod login;
pub mod logout;
pub mod notifications;
pub mod whoami;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use photohub_auth::{FileTokenStore, SessionManager};
use photohub_client::ApiClient;
use photohub_core::config::AppConfig;
use photohub_core::error::AppError;
use photohub_core::traits::SessionContext;
use photohub_core::types::SessionToken;

use crate::output::OutputFormat;

/// PhotoHub: session and notification tools
#[derive(Debug, Parser)]
#[command(name = "photohub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in and store the session tokens
    Login(login::LoginArgs),
    /// Erase the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List or delete notifications
    Notifications(notifications::NotificationArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Login(args) => login::execute(args, &self.config).await,
            Commands::Logout => logout::execute(&self.config).await,
            Commands::Whoami => whoami::execute(&self.config, self.format).await,
            Commands::Notifications(args) => {
                notifications::execute(args, &self.config, self.format).await
            }
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// API client plus a session manager backed by the configured token file.
pub struct Context {
    pub api: Arc<ApiClient>,
    pub session: SessionManager,
}

impl Context {
    /// Build the context from a configuration file.
    pub fn open(config_path: &str) -> Result<Self, AppError> {
        let config = load_config(config_path)?;
        let api = Arc::new(ApiClient::new(&config.api)?);
        let store = Arc::new(FileTokenStore::new(&config.session.token_file));
        let session = SessionManager::new(api.clone(), store);
        Ok(Self { api, session })
    }

    /// The stored access token, or an error telling the user to log in.
    pub fn require_token(&self) -> Result<SessionToken, AppError> {
        self.session
            .access_token()
            .ok_or_else(|| AppError::authentication("Not logged in. Run `photohub login` first."))
    }
}
