//! Session capability handed to consumers that must react to login/logout.

use tokio::sync::watch;

use crate::types::{AuthState, SessionToken};

/// Read-only view of the session lifecycle.
///
/// Consumers subscribe to transitions instead of polling, and read the
/// current access token on demand (it may change between reads).
pub trait SessionContext: Send + Sync + std::fmt::Debug + 'static {
    /// Subscribe to authentication state transitions.
    fn subscribe(&self) -> watch::Receiver<AuthState>;

    /// The stored access token, if any.
    fn access_token(&self) -> Option<SessionToken>;
}
