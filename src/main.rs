//! PhotoHub Notify: realtime notification watcher.
//!
//! Restores the stored session, keeps the notification collection in sync
//! over the realtime socket, and prints it whenever it changes.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use photohub_auth::{FileTokenStore, SessionManager};
use photohub_client::ApiClient;
use photohub_core::config::AppConfig;
use photohub_core::error::AppError;
use photohub_realtime::connection::WsConnector;
use photohub_realtime::notification::formatter::NotificationFormatter;
use photohub_realtime::{ConnectionState, NotificationSync, NotificationView};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Notification watcher failed");
        std::process::exit(1);
    }
}

/// Load configuration from file, the environment overlay, and variables
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("PHOTOHUB_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("PHOTOHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let env_config_path = format!("config/{env}.toml");

    AppConfig::load_layered(&[&config_path, &env_config_path])
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PhotoHub Notify v{}", env!("CARGO_PKG_VERSION"));

    let api = Arc::new(ApiClient::new(&config.api)?);
    let store = Arc::new(FileTokenStore::new(&config.session.token_file));
    let session = Arc::new(SessionManager::new(api.clone(), store));

    // Not fatal: without a session the transport stays idle.
    match session.load_principal().await {
        Ok(principal) => tracing::info!(user = %principal.username, "Session restored"),
        Err(e) => tracing::warn!(error = %e, "No active session; run `photohub login`"),
    }

    let sync = NotificationSync::start(
        &config.api.base_url,
        &config.realtime,
        session.clone(),
        api.clone(),
        Arc::new(WsConnector::new()),
    )?;

    let mut views = sync.subscribe();
    let mut states = sync.subscribe_state();
    render(&sync.view());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                render(&view);
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                if state == ConnectionState::Open || state == ConnectionState::Disconnected {
                    println!("[{state}]");
                }
            }
        }
    }

    sync.shutdown().await;
    tracing::info!("PhotoHub Notify stopped");
    Ok(())
}

fn render(view: &NotificationView) {
    for line in NotificationFormatter::render(view) {
        println!("{line}");
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
