//! Observable authentication state.

use crate::types::principal::Principal;

/// Snapshot of the session lifecycle, published to observers on every
/// transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// Whether the client currently considers itself logged in.
    pub authenticated: bool,
    /// The loaded principal, once known.
    pub principal: Option<Principal>,
    /// A login is in flight.
    pub loading: bool,
    /// Reason of the last failed login, if any.
    pub error: Option<String>,
    /// Incremented every time a new access token is stored, so observers can
    /// tell a credential change from an unrelated state update.
    pub epoch: u64,
}
