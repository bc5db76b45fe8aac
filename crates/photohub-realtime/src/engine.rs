//! Wires the transport and the reconciler to one session.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use photohub_core::config::RealtimeConfig;
use photohub_core::result::AppResult;
use photohub_core::traits::{NotificationApi, SessionContext};
use photohub_core::types::NotificationId;

use crate::connection::{ConnectionState, Connector, RealtimeTransport, TransportSettings};
use crate::notification::{NotificationView, Reconciler};

/// Realtime notification sync for one client session.
///
/// Owns the working collection and the transport feeding it. The transport
/// follows the session on its own: it connects on login, reconnects after
/// failures or credential changes, and closes and clears the collection on
/// logout.
#[derive(Debug)]
pub struct NotificationSync {
    reconciler: Arc<Reconciler>,
    transport: RealtimeTransport,
}

impl NotificationSync {
    /// Start syncing. Fails only on an unusable `api_base`.
    pub fn start(
        api_base: &str,
        config: &RealtimeConfig,
        session: Arc<dyn SessionContext>,
        api: Arc<dyn NotificationApi>,
        connector: Arc<dyn Connector>,
    ) -> AppResult<Self> {
        let settings = TransportSettings::from_config(api_base, config)?;
        info!(endpoint = %settings.endpoint, "Starting notification sync");

        let reconciler = Arc::new(Reconciler::new(Arc::clone(&api), Arc::clone(&session)));
        let transport = RealtimeTransport::spawn(settings, session, connector, api, Arc::clone(&reconciler));

        Ok(Self { reconciler, transport })
    }

    /// Current collection.
    pub fn view(&self) -> NotificationView {
        self.reconciler.view()
    }

    /// Observe collection changes.
    pub fn subscribe(&self) -> watch::Receiver<NotificationView> {
        self.reconciler.subscribe()
    }

    pub fn unread_count(&self) -> usize {
        self.reconciler.unread_count()
    }

    /// Remove a notification now and delete it remotely in the background.
    /// See [`Reconciler::remove`].
    pub fn delete(&self, id: NotificationId) -> Option<JoinHandle<()>> {
        self.reconciler.remove(id)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Observe connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.transport.subscribe_state()
    }

    /// Replace the live connection with a fresh one.
    pub fn restart(&self) {
        self.transport.restart();
    }

    /// Stop syncing and wait for the connection to close.
    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
    }
}
