//! Duplex connection seam and its WebSocket implementation.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::trace;

use photohub_core::error::{AppError, ErrorKind};
use photohub_core::result::AppResult;

/// An application-level inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame (never valid for this protocol, but delivered so the
    /// caller decides what to drop).
    Binary(Vec<u8>),
}

/// One established duplex connection.
#[async_trait]
pub trait Socket: Send + 'static {
    /// Next inbound frame.
    ///
    /// `None` once the peer has closed the connection; `Some(Err(_))` on a
    /// network or protocol failure.
    async fn recv(&mut self) -> Option<AppResult<Frame>>;

    /// Close the connection. Closing twice is allowed.
    async fn close(&mut self) -> AppResult<()>;
}

/// Opens connections. The URL carries the credential.
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug + 'static {
    /// Perform the handshake and return the open connection.
    async fn connect(&self, url: &Url) -> AppResult<Box<dyn Socket>>;
}

/// Production connector over `tokio-tungstenite`.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Create a connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> AppResult<Box<dyn Socket>> {
        let (stream, response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Transport, "WebSocket handshake failed", e))?;

        trace!(status = %response.status(), "WebSocket handshake complete");
        Ok(Box::new(WsSocket { stream }))
    }
}

/// A `tokio-tungstenite` client stream.
struct WsSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Socket for WsSocket {
    async fn recv(&mut self) -> Option<AppResult<Frame>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(e) => {
                    return Some(Err(AppError::with_source(
                        ErrorKind::Transport,
                        "WebSocket receive failed",
                        e,
                    )));
                }
            };

            match message {
                Message::Text(text) => return Some(Ok(Frame::Text(text.as_str().to_owned()))),
                Message::Binary(bytes) => return Some(Ok(Frame::Binary(bytes.to_vec()))),
                Message::Close(frame) => {
                    trace!(?frame, "Peer sent close frame");
                    return None;
                }
                // Pings are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) -> AppResult<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Transport, "WebSocket close failed", e))
    }
}
