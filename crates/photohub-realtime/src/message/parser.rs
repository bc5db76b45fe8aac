//! Turning raw frames into notifications.

use tracing::trace;

use photohub_core::types::Notification;

use super::types::PushEvent;
use super::validator::validate_inbound;
use crate::connection::Frame;

/// Extract the notification carried by a push frame.
///
/// Returns `None` for anything that is not a well-formed
/// `{"type": "notification", "notification": {...}}` text frame. Such
/// frames are dropped without retry or error.
pub fn parse_push(frame: &Frame, max_bytes: usize) -> Option<Notification> {
    let raw = match frame {
        Frame::Text(raw) => raw,
        Frame::Binary(bytes) => {
            trace!(len = bytes.len(), "Dropping binary frame");
            return None;
        }
    };

    if let Err(e) = validate_inbound(raw, max_bytes) {
        trace!(error = %e, "Dropping invalid frame");
        return None;
    }

    match serde_json::from_str::<PushEvent>(raw) {
        Ok(PushEvent::Notification { notification }) => Some(notification),
        Err(e) => {
            trace!(error = %e, "Dropping unrecognized frame");
            None
        }
    }
}
