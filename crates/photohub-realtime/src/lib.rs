//! # photohub-realtime
//!
//! Realtime notification synchronization for the PhotoHub client:
//!
//! - WebSocket transport with a single live connection, reconnect backoff,
//!   connect timeout, and race-free teardown
//! - Push message parsing that silently drops anything malformed
//! - A reconciler merging snapshots and pushes into one ordered,
//!   deduplicated collection with a derived unread count
//! - The [`NotificationSync`] engine wiring all of the above to a session

pub mod connection;
pub mod engine;
pub mod message;
pub mod notification;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{ConnectionState, RealtimeTransport};
pub use engine::NotificationSync;
pub use notification::{NotificationView, Reconciler};
