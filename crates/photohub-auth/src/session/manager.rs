//! Session lifecycle manager: login, principal re-hydration, logout.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use photohub_core::error::{AppError, ErrorKind};
use photohub_core::result::AppResult;
use photohub_core::traits::{AuthApi, SessionContext};
use photohub_core::types::{AuthState, Credentials, Principal, SessionToken};

use super::store::TokenStore;

/// Message reported when a stored token cannot be turned into a principal.
const LOAD_FAILED: &str = "Failed to load user";

/// Reason recorded when a login fails without a server-supplied detail.
const LOGIN_FAILED: &str = "Login failed";

/// Owns the authentication state and is the sole writer of stored tokens.
///
/// Every transition is published on a `watch` channel; the realtime
/// transport subscribes to it through [`SessionContext`].
pub struct SessionManager {
    /// Remote authentication endpoints.
    api: Arc<dyn AuthApi>,
    /// Durable token storage.
    store: Arc<dyn TokenStore>,
    /// Current state, shared with subscribers.
    state: watch::Sender<AuthState>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager.
    ///
    /// A token already present in `store` is optimistically treated as an
    /// authenticated session until [`load_principal`](Self::load_principal)
    /// confirms or rejects it.
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn TokenStore>) -> Self {
        let has_token = match store.load() {
            Ok(tokens) => tokens.is_some(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable token store");
                false
            }
        };

        let (state, _) = watch::channel(AuthState {
            authenticated: has_token,
            ..AuthState::default()
        });

        Self { api, store, state }
    }

    /// Whether the session is currently authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().authenticated
    }

    /// The loaded principal, if any.
    pub fn principal(&self) -> Option<Principal> {
        self.state.borrow().principal.clone()
    }

    /// Current state snapshot.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Exchange credentials for tokens, persist them, and load the principal.
    ///
    /// On failure the reason is recorded in [`AuthState::error`] and the
    /// authenticated flag is left untouched.
    pub async fn login(&self, credentials: &Credentials) -> AppResult<Principal> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.try_login(credentials).await {
            Ok(principal) => {
                info!(user = %principal.username, "Logged in");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.authenticated = true;
                    s.principal = Some(principal.clone());
                    s.epoch += 1;
                });
                Ok(principal)
            }
            Err(e) => {
                let reason = e
                    .detail
                    .clone()
                    .unwrap_or_else(|| LOGIN_FAILED.to_string());
                warn!(error = %e, "Login failed");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(reason);
                });
                Err(e)
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> AppResult<Principal> {
        let tokens = self.api.obtain_tokens(credentials).await?;
        self.store.save(&tokens)?;
        self.api.current_principal(&tokens.access).await
    }

    /// Re-hydrate the principal from a stored token.
    ///
    /// Any failure, including a missing token, forces the state back to
    /// unauthenticated. Not retried; the caller decides where to send the
    /// user next.
    pub async fn load_principal(&self) -> AppResult<Principal> {
        let Some(token) = self.access_token() else {
            self.mark_signed_out();
            return Err(AppError::authentication(LOAD_FAILED));
        };

        match self.api.current_principal(&token).await {
            Ok(principal) => {
                self.state.send_modify(|s| {
                    s.authenticated = true;
                    s.principal = Some(principal.clone());
                });
                Ok(principal)
            }
            Err(e) => {
                warn!(error = %e, "Stored token rejected; signing out");
                self.mark_signed_out();
                Err(AppError::with_source(ErrorKind::Authentication, LOAD_FAILED, e))
            }
        }
    }

    /// Erase stored tokens and clear the authenticated state.
    ///
    /// Subscribers observe the transition immediately.
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to erase stored tokens");
        }
        self.mark_signed_out();
        info!("Logged out");
    }

    fn mark_signed_out(&self) {
        self.state.send_if_modified(|s| {
            let changed = s.authenticated || s.principal.is_some();
            s.authenticated = false;
            s.principal = None;
            changed
        });
    }
}

impl SessionContext for SessionManager {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn access_token(&self) -> Option<SessionToken> {
        match self.store.load() {
            Ok(tokens) => tokens.map(|t| t.access),
            Err(e) => {
                warn!(error = %e, "Failed to read stored tokens");
                None
            }
        }
    }
}
