//! Remote API seams.
//!
//! The HTTP client implements these; tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Credentials, Notification, NotificationId, Principal, SessionToken, TokenPair};

/// Notification endpoints of the REST API.
#[async_trait]
pub trait NotificationApi: Send + Sync + std::fmt::Debug + 'static {
    /// `GET /notifications/`: the current snapshot, newest first.
    async fn list_notifications(&self, token: &SessionToken) -> AppResult<Vec<Notification>>;

    /// `DELETE /notifications/{id}/`.
    async fn delete_notification(&self, token: &SessionToken, id: NotificationId)
    -> AppResult<()>;
}

/// Authentication endpoints of the REST API.
#[async_trait]
pub trait AuthApi: Send + Sync + std::fmt::Debug + 'static {
    /// `POST /token/`: exchange credentials for an access/refresh pair.
    async fn obtain_tokens(&self, credentials: &Credentials) -> AppResult<TokenPair>;

    /// `GET /auth/me/`: the principal owning `token`.
    async fn current_principal(&self, token: &SessionToken) -> AppResult<Principal>;
}
