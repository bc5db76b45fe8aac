//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use photohub_core::config::AppConfig;
use photohub_core::error::{AppError, ErrorKind};
use photohub_realtime::connection::SocketEndpoint;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Flattened configuration for table output
#[derive(Debug, Serialize, Tabled)]
struct ConfigRow {
    /// API base URL
    api: String,
    /// Realtime endpoint
    socket: String,
    /// Reconnect delay (ms)
    reconnect_ms: u64,
    /// Connect timeout (s)
    timeout_s: u64,
    /// Token file
    token_file: String,
    /// Log level
    log: String,
}

impl ConfigRow {
    fn new(config: &AppConfig) -> Self {
        let socket = SocketEndpoint::from_api_base(&config.api.base_url)
            .map(|e| e.to_string())
            .unwrap_or_else(|e| format!("invalid ({})", e.message));
        Self {
            api: config.api.base_url.clone(),
            socket,
            reconnect_ms: config.realtime.reconnect_delay_ms,
            timeout_s: config.realtime.connect_timeout_seconds,
            token_file: config.session.token_file.clone(),
            log: format!("{} ({})", config.logging.level, config.logging.format),
        }
    }
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&config)?;
                    println!("{json}");
                }
                OutputFormat::Table => output::print_item(&ConfigRow::new(&config), format),
            }
        }
        ConfigCommand::Validate => {
            let config = super::load_config(config_path)
                .inspect_err(|e| output::print_error(&format!("Configuration invalid: {e}")))?;
            let endpoint = SocketEndpoint::from_api_base(&config.api.base_url)?;

            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("API", &config.api.base_url);
            output::print_kv("Realtime", &endpoint.to_string());
            output::print_kv("Token file", &config.session.token_file);
        }
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to create directory", e)
                })?;
            }

            tokio::fs::write(out_path, default_config).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write config", e)
            })?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}
