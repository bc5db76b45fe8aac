//! Base HTTP client: URL joining, bearer auth, status-to-error mapping.

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use photohub_core::config::ApiConfig;
use photohub_core::error::{AppError, ErrorKind};
use photohub_core::result::AppResult;
use photohub_core::types::SessionToken;

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Underlying connection pool.
    http: reqwest::Client,
    /// API root, always ending in `/`.
    base_url: Url,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(format!("photohub-notify/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path (`"notifications/"`) against the API root.
    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::validation(format!("Invalid endpoint path '{path}': {e}")))
    }

    /// Start a request, attaching the bearer token when given.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SessionToken>,
    ) -> AppResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        debug!(method = %method, url = %url, "API request");
        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        })
    }

    /// Send a request and turn non-2xx answers into [`AppError`]s.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let response = builder.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Request failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }
}

/// Parse and normalize the API root so relative joins keep its path prefix.
pub(crate) fn parse_base_url(raw: &str) -> AppResult<Url> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized)
        .map_err(|e| AppError::configuration(format!("Invalid API base URL '{raw}': {e}")))
}

/// Error body shape used by the API (`{"detail": "..."}`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Map a failed status (and its body) to an error kind and message.
pub(crate) fn status_error(status: StatusCode, body: &str) -> AppError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Authentication,
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::BAD_REQUEST => ErrorKind::Validation,
        _ => ErrorKind::ExternalService,
    };

    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .filter(|d| !d.trim().is_empty());

    match detail {
        Some(detail) => AppError::new(kind, detail.clone()).with_detail(detail),
        None => AppError::new(kind, format!("Request failed with status {status}")),
    }
}
