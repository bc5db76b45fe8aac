//! The authenticated user as reported by `GET /auth/me/`.

use serde::{Deserialize, Serialize};

/// Platform role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Event coordinator.
    Coordinator,
    /// Photographer uploading event photos.
    Photographer,
    /// Regular member.
    Member,
    /// Public (unprivileged) account.
    Public,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Admin => "ADMIN",
            Self::Coordinator => "COORDINATOR",
            Self::Photographer => "PHOTOGRAPHER",
            Self::Member => "MEMBER",
            Self::Public => "PUBLIC",
        };
        f.write_str(label)
    }
}

/// The current principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Role.
    pub role: Role,
}
