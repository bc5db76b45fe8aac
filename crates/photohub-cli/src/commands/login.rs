//! `login` command.

use clap::Args;

use photohub_core::error::{AppError, ErrorKind};
use photohub_core::types::Credentials;

use crate::output;

/// Arguments for login
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Username (will prompt if not provided)
    #[arg(short, long)]
    pub username: Option<String>,
    /// Password (will prompt if not provided)
    #[arg(long)]
    pub password: Option<String>,
}

/// Execute login
pub async fn execute(args: &LoginArgs, config_path: &str) -> Result<(), AppError> {
    let ctx = super::Context::open(config_path)?;

    let username = match &args.username {
        Some(u) => u.clone(),
        None => dialoguer::Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Input error", e))?,
    };

    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Input error", e))?,
    };

    let principal = ctx.session.login(&Credentials::new(username, password)).await?;
    output::print_success(&format!("Logged in as {} ({})", principal.username, principal.role));
    Ok(())
}
