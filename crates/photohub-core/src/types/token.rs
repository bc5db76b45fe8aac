//! Credentials and session tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque bearer credential.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is plausible enough to open a realtime connection:
    /// non-blank and at least `min_len` characters long.
    pub fn is_usable(&self, min_len: usize) -> bool {
        !self.0.trim().is_empty() && self.0.chars().count() >= min_len
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(***{} chars)", self.0.len())
    }
}

/// Access/refresh pair issued by `POST /token/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token used for API calls and the realtime handshake.
    pub access: SessionToken,
    /// Refresh token.
    pub refresh: SessionToken,
}

/// Username/password login request.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Build a credentials value.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
