//! Snapshot/push reconciliation into one ordered, deduplicated collection.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use photohub_core::traits::{NotificationApi, SessionContext};
use photohub_core::types::{Notification, NotificationId};

/// Immutable snapshot of the working collection handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationView {
    /// Notifications, newest first, ids unique.
    pub items: Vec<Notification>,
    /// Entries not explicitly marked read.
    pub unread_count: usize,
}

impl NotificationView {
    fn recount(&mut self) {
        self.unread_count = self.items.iter().filter(|n| n.is_unread()).count();
    }

    /// Ids in display order.
    pub fn ids(&self) -> Vec<NotificationId> {
        self.items.iter().map(|n| n.id).collect()
    }

    /// Whether there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Build a view from a server snapshot, keeping server order.
///
/// If the server repeats an id, the first occurrence wins.
impl From<Vec<Notification>> for NotificationView {
    fn from(snapshot: Vec<Notification>) -> Self {
        let mut seen = HashSet::with_capacity(snapshot.len());
        let mut view = Self {
            items: snapshot.into_iter().filter(|n| seen.insert(n.id)).collect(),
            unread_count: 0,
        };
        view.recount();
        view
    }
}

/// Single source of truth for the working collection.
///
/// All mutation goes through the `watch` sender, whose internal lock
/// serializes writers; observers get a consistent view plus a change
/// notification.
pub struct Reconciler {
    view: watch::Sender<NotificationView>,
    api: Arc<dyn NotificationApi>,
    session: Arc<dyn SessionContext>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let view = self.view.borrow();
        f.debug_struct("Reconciler")
            .field("items", &view.items.len())
            .field("unread_count", &view.unread_count)
            .finish()
    }
}

impl Reconciler {
    /// Create an empty collection. `api` and `session` are used for remote
    /// deletes only.
    pub fn new(api: Arc<dyn NotificationApi>, session: Arc<dyn SessionContext>) -> Self {
        let (view, _) = watch::channel(NotificationView::default());
        Self { view, api, session }
    }

    /// Replace the whole collection with a snapshot, keeping server order.
    ///
    /// If the server repeats an id, the first occurrence wins.
    pub fn load_snapshot(&self, snapshot: Vec<Notification>) {
        let next = NotificationView::from(snapshot);
        self.view.send_modify(|view| *view = next);
    }

    /// Put a pushed notification at the front.
    ///
    /// An existing entry with the same id is replaced, so the most recently
    /// delivered copy is the one kept.
    pub fn apply_push(&self, notification: Notification) {
        self.view.send_modify(|view| {
            view.items.retain(|n| n.id != notification.id);
            view.items.insert(0, notification);
            view.recount();
        });
    }

    /// Remove an entry locally right away, then ask the server to delete it.
    ///
    /// The remote call runs on its own task; its failure is logged and the
    /// local removal stands. Returns that task, or `None` when there is no
    /// stored token to authorize the request.
    pub fn remove(&self, id: NotificationId) -> Option<JoinHandle<()>> {
        let removed = self.view.send_if_modified(|view| {
            let before = view.items.len();
            view.items.retain(|n| n.id != id);
            let changed = view.items.len() != before;
            if changed {
                view.recount();
            }
            changed
        });
        debug!(id, removed, "Notification removed locally");

        let Some(token) = self.session.access_token() else {
            warn!(id, "No session token; skipping remote notification delete");
            return None;
        };

        let api = Arc::clone(&self.api);
        Some(tokio::spawn(async move {
            if let Err(e) = api.delete_notification(&token, id).await {
                warn!(id, error = %e, "Remote notification delete failed");
            }
        }))
    }

    /// Drop every entry (used when the session ends).
    pub fn clear(&self) {
        self.view.send_if_modified(|view| {
            if view.items.is_empty() {
                return false;
            }
            view.items.clear();
            view.unread_count = 0;
            true
        });
    }

    /// Number of entries not explicitly marked read.
    pub fn unread_count(&self) -> usize {
        self.view.borrow().unread_count
    }

    /// Current view.
    pub fn view(&self) -> NotificationView {
        self.view.borrow().clone()
    }

    /// Subscribe to view changes.
    pub fn subscribe(&self) -> watch::Receiver<NotificationView> {
        self.view.subscribe()
    }
}
