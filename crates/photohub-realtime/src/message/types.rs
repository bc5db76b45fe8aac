//! Inbound message type definitions.

use serde::{Deserialize, Serialize};

use photohub_core::types::Notification;

/// Events the server pushes over the notification socket.
///
/// The client sends nothing after the handshake, so there is no outbound
/// counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushEvent {
    /// A new notification for the connected principal.
    Notification {
        /// The notification payload.
        notification: Notification,
    },
}
