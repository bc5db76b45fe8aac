//! Notification endpoints (the snapshot fetcher and remote delete).

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use photohub_core::error::{AppError, ErrorKind};
use photohub_core::result::AppResult;
use photohub_core::traits::NotificationApi;
use photohub_core::types::{Notification, NotificationId, SessionToken};

use crate::client::ApiClient;

/// The list endpoint answers either with a bare array or with a paginated
/// envelope; a paginated body without `results` means "no notifications".
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NotificationListBody {
    Bare(Vec<Notification>),
    Paginated {
        #[serde(default)]
        results: Vec<Notification>,
    },
}

/// Decode a `GET /notifications/` body.
pub fn parse_notification_list(body: &str) -> AppResult<Vec<Notification>> {
    let parsed: NotificationListBody = serde_json::from_str(body).map_err(|e| {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Malformed notification list: {e}"),
            e,
        )
    })?;

    Ok(match parsed {
        NotificationListBody::Bare(items) => items,
        NotificationListBody::Paginated { results } => results,
    })
}

#[async_trait]
impl NotificationApi for ApiClient {
    async fn list_notifications(&self, token: &SessionToken) -> AppResult<Vec<Notification>> {
        let request = self.request(Method::GET, "notifications/", Some(token))?;
        let response = self.send(request).await?;
        let body = response.text().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Failed to read notification list",
                e,
            )
        })?;

        let items = parse_notification_list(&body)?;
        debug!(count = items.len(), "Fetched notification snapshot");
        Ok(items)
    }

    async fn delete_notification(
        &self,
        token: &SessionToken,
        id: NotificationId,
    ) -> AppResult<()> {
        let request = self.request(Method::DELETE, &format!("notifications/{id}/"), Some(token))?;
        self.send(request).await?;
        Ok(())
    }
}
