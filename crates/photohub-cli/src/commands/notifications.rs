//! Notification CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use photohub_core::error::AppError;
use photohub_core::traits::NotificationApi;
use photohub_core::types::{Notification, NotificationId};
use photohub_realtime::NotificationView;
use photohub_realtime::notification::formatter::NotificationFormatter;

use crate::output::{self, OutputFormat};

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List current notifications
    List,
    /// Delete a notification
    Delete {
        /// Notification ID
        id: NotificationId,
    },
}

/// Notification display row
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    /// ID
    id: NotificationId,
    /// Unread marker
    #[tabled(rename = "")]
    unread: String,
    /// Actor initial
    #[tabled(rename = "from")]
    initial: char,
    /// What happened
    verb: String,
    /// Created
    created: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            unread: if n.is_unread() { "●" } else { "" }.to_string(),
            initial: NotificationFormatter::avatar_initial(n),
            verb: n.verb.clone(),
            created: NotificationFormatter::timestamp(n),
        }
    }
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::Context::open(config_path)?;
    let token = ctx.require_token()?;

    match &args.command {
        NotificationCommand::List => {
            let view = NotificationView::from(ctx.api.list_notifications(&token).await?);
            let rows: Vec<NotificationRow> = view.items.iter().map(NotificationRow::from).collect();

            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                output::print_kv("Unread", &view.unread_count.to_string());
            }
        }
        NotificationCommand::Delete { id } => {
            ctx.api.delete_notification(&token, *id).await?;
            output::print_success(&format!("Notification {id} deleted"));
        }
    }

    Ok(())
}
