//! Authentication endpoints.

use async_trait::async_trait;
use reqwest::Method;

use photohub_core::error::{AppError, ErrorKind};
use photohub_core::result::AppResult;
use photohub_core::traits::AuthApi;
use photohub_core::types::{Credentials, Principal, SessionToken, TokenPair};

use crate::client::ApiClient;

#[async_trait]
impl AuthApi for ApiClient {
    async fn obtain_tokens(&self, credentials: &Credentials) -> AppResult<TokenPair> {
        let request = self.request(Method::POST, "token/", None)?.json(credentials);
        let response = self.send(request).await?;
        response.json::<TokenPair>().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Malformed token response", e)
        })
    }

    async fn current_principal(&self, token: &SessionToken) -> AppResult<Principal> {
        let request = self.request(Method::GET, "auth/me/", Some(token))?;
        let response = self.send(request).await?;
        response.json::<Principal>().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Malformed principal response", e)
        })
    }
}
