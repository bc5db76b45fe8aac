//! `whoami` command.

use serde::Serialize;
use tabled::Tabled;

use photohub_core::error::AppError;
use photohub_core::types::Principal;

use crate::output::{self, OutputFormat};

/// Principal display row
#[derive(Debug, Serialize, Tabled)]
struct PrincipalRow {
    /// User ID
    id: i64,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Role
    role: String,
}

impl From<Principal> for PrincipalRow {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            username: p.username,
            email: p.email,
            role: p.role.to_string(),
        }
    }
}

/// Execute whoami
pub async fn execute(config_path: &str, format: OutputFormat) -> Result<(), AppError> {
    let ctx = super::Context::open(config_path)?;
    let principal = ctx.session.load_principal().await?;
    output::print_item(&PrincipalRow::from(principal), format);
    Ok(())
}
