//! Derivation of the notification WebSocket URL from the REST API base.

use std::fmt;

use reqwest::Url;

use photohub_core::error::AppError;
use photohub_core::result::AppResult;
use photohub_core::types::SessionToken;

/// Path of the notification socket relative to the site root.
const SOCKET_PATH: &str = "/ws/notifications/";

/// The notification socket location, without credentials.
///
/// `https` APIs map to `wss`, everything else to `ws`. A trailing `/api`
/// segment of the API base is dropped, any other path prefix is kept:
/// `https://host/app/api` becomes `wss://host/app/ws/notifications/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketEndpoint {
    base: Url,
}

impl SocketEndpoint {
    /// Derive the endpoint from the REST API base URL.
    pub fn from_api_base(api_base: &str) -> AppResult<Self> {
        let api = Url::parse(api_base.trim())
            .map_err(|e| AppError::configuration(format!("Invalid API base URL '{api_base}': {e}")))?;

        let scheme = match api.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => {
                return Err(AppError::configuration(format!(
                    "Unsupported API scheme '{other}'"
                )));
            }
        };

        let host = api
            .host_str()
            .ok_or_else(|| AppError::configuration(format!("API base URL '{api_base}' has no host")))?;
        let authority = match api.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let path = api.path().trim_end_matches('/');
        let prefix = path.strip_suffix("/api").unwrap_or(path);

        let base = Url::parse(&format!("{scheme}://{authority}{prefix}{SOCKET_PATH}"))
            .map_err(|e| AppError::configuration(format!("Invalid socket URL: {e}")))?;

        Ok(Self { base })
    }

    /// Full handshake URL carrying `token` as the `token` query parameter.
    pub fn url_for(&self, token: &SessionToken) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("token", token.as_str());
        url
    }
}

/// Displays the endpoint without any credential, safe for logs.
impl fmt::Display for SocketEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str())
    }
}
