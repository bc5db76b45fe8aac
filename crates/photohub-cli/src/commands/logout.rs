//! `logout` command.

use photohub_core::error::AppError;

use crate::output;

/// Execute logout
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let ctx = super::Context::open(config_path)?;
    ctx.session.logout();
    output::print_success("Logged out");
    Ok(())
}
