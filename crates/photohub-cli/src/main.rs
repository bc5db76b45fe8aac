//! PhotoHub CLI entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use photohub_core::config::{AppConfig, LoggingConfig};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&logging_settings(&cli.config));

    if let Err(e) = cli.execute().await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Logging section of the config file; defaults when it cannot be read, so
/// the command itself gets to report the broken file.
fn logging_settings(config_path: &str) -> LoggingConfig {
    AppConfig::load(config_path)
        .map(|config| config.logging)
        .unwrap_or_default()
}

/// Logs go to stderr so `--format json` output stays machine-readable.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
