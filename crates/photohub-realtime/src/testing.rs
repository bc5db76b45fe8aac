//! In-memory doubles for the socket, the notification API and the session.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use tokio::sync::{Notify, mpsc, watch};

use photohub_core::error::AppError;
use photohub_core::result::AppResult;
use photohub_core::traits::{NotificationApi, SessionContext};
use photohub_core::types::{AuthState, Notification, NotificationId, SessionToken};

use crate::connection::{Connector, Frame, Socket};

pub(crate) const TOKEN: &str = "access-token-0123456789";

/// An unread notification with a deterministic verb.
pub(crate) fn notification(id: NotificationId) -> Notification {
    let mut n = Notification::new(id, format!("event {id}"));
    n.actor = Some("bob".to_string());
    n
}

/// Let spawned tasks run until they block.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

// -- Notification API ------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct MockApi {
    snapshot: Mutex<Vec<Notification>>,
    list_calls: AtomicUsize,
    deleted: Mutex<Vec<NotificationId>>,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
    list_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub(crate) fn with_snapshot(items: Vec<Notification>) -> Arc<Self> {
        let api = Self::default();
        *api.snapshot.lock().unwrap() = items;
        Arc::new(api)
    }

    pub(crate) fn set_snapshot(&self, items: Vec<Notification>) {
        *self.snapshot.lock().unwrap() = items;
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn deleted(&self) -> Vec<NotificationId> {
        self.deleted.lock().unwrap().clone()
    }

    pub(crate) fn fail_lists(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    /// Make list requests wait until the returned gate is notified.
    pub(crate) fn hold_lists(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.list_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationApi for MockApi {
    async fn list_notifications(&self, _token: &SessionToken) -> AppResult<Vec<Notification>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.list_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::external_service("list unavailable"));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    async fn delete_notification(&self, _token: &SessionToken, id: NotificationId) -> AppResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AppError::external_service("delete unavailable"));
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}

// -- Session ---------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct TestSession {
    state: watch::Sender<AuthState>,
    token: Mutex<Option<SessionToken>>,
    epoch: AtomicU64,
}

impl TestSession {
    pub(crate) fn signed_in(token: &str) -> Arc<Self> {
        Self::build(true, Some(token))
    }

    pub(crate) fn signed_out() -> Arc<Self> {
        Self::build(false, None)
    }

    /// Authenticated flag set but with the given (possibly unusable) token.
    pub(crate) fn build(authenticated: bool, token: Option<&str>) -> Arc<Self> {
        let (state, _) = watch::channel(AuthState {
            authenticated,
            epoch: 1,
            ..AuthState::default()
        });
        Arc::new(Self {
            state,
            token: Mutex::new(token.map(SessionToken::new)),
            epoch: AtomicU64::new(1),
        })
    }

    pub(crate) fn sign_out(&self) {
        *self.token.lock().unwrap() = None;
        self.state.send_modify(|s| s.authenticated = false);
    }

    /// Store a new token and publish it as a credential change.
    pub(crate) fn sign_in(&self, token: &str) {
        *self.token.lock().unwrap() = Some(SessionToken::new(token));
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.authenticated = true;
            s.epoch = epoch;
        });
    }

    /// Publish a state change that is not a credential change.
    pub(crate) fn touch(&self) {
        self.state.send_modify(|s| s.loading = !s.loading);
    }
}

impl SessionContext for TestSession {
    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn access_token(&self) -> Option<SessionToken> {
        self.token.lock().unwrap().clone()
    }
}

// -- Socket ----------------------------------------------------------------

/// What the next handshake does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Accept,
    Refuse,
    Hang,
}

#[derive(Debug)]
pub(crate) struct MockConnector {
    outcomes: Mutex<VecDeque<Outcome>>,
    attempts: AtomicUsize,
    live: Arc<AtomicUsize>,
    urls: Mutex<Vec<String>>,
    peers: mpsc::UnboundedSender<MockPeer>,
}

impl MockConnector {
    pub(crate) fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        let (peers, rx) = mpsc::unbounded_channel();
        let connector = Self {
            outcomes: Mutex::new(VecDeque::new()),
            attempts: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            urls: Mutex::new(Vec::new()),
            peers,
        };
        (Arc::new(connector), rx)
    }

    /// Queue handshake outcomes; once drained every handshake succeeds.
    pub(crate) fn script(&self, outcomes: impl IntoIterator<Item = Outcome>) {
        self.outcomes.lock().unwrap().extend(outcomes);
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Sockets handed out and not yet closed or dropped.
    pub(crate) fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &Url) -> AppResult<Box<dyn Socket>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Accept);

        match outcome {
            Outcome::Refuse => Err(AppError::transport("connection refused")),
            Outcome::Hang => std::future::pending().await,
            Outcome::Accept => {
                let (tx, rx) = mpsc::unbounded_channel();
                self.live.fetch_add(1, Ordering::SeqCst);
                let _ = self.peers.send(MockPeer { tx });
                Ok(Box::new(MockSocket {
                    rx,
                    live: Arc::clone(&self.live),
                    closed: false,
                }))
            }
        }
    }
}

#[derive(Debug)]
enum PeerEvent {
    Frame(Frame),
    Fail,
    Close,
}

/// Server side of one accepted mock connection.
#[derive(Debug, Clone)]
pub(crate) struct MockPeer {
    tx: mpsc::UnboundedSender<PeerEvent>,
}

impl MockPeer {
    /// Send a well-formed notification push. False once the client hung up.
    pub(crate) fn push(&self, notification: &Notification) -> bool {
        let raw = serde_json::json!({ "type": "notification", "notification": notification });
        self.send_text(&raw.to_string())
    }

    pub(crate) fn send_text(&self, raw: &str) -> bool {
        self.tx.send(PeerEvent::Frame(Frame::Text(raw.to_string()))).is_ok()
    }

    pub(crate) fn send_binary(&self, bytes: &[u8]) -> bool {
        self.tx.send(PeerEvent::Frame(Frame::Binary(bytes.to_vec()))).is_ok()
    }

    /// Simulate a network error.
    pub(crate) fn fail(&self) -> bool {
        self.tx.send(PeerEvent::Fail).is_ok()
    }

    /// Simulate a server-initiated close.
    pub(crate) fn close(&self) -> bool {
        self.tx.send(PeerEvent::Close).is_ok()
    }

    /// Whether the client still holds the connection.
    pub(crate) fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

struct MockSocket {
    rx: mpsc::UnboundedReceiver<PeerEvent>,
    live: Arc<AtomicUsize>,
    closed: bool,
}

impl MockSocket {
    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.rx.close();
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl Socket for MockSocket {
    async fn recv(&mut self) -> Option<AppResult<Frame>> {
        if self.closed {
            return None;
        }
        match self.rx.recv().await {
            Some(PeerEvent::Frame(frame)) => Some(Ok(frame)),
            Some(PeerEvent::Fail) => Some(Err(AppError::transport("connection reset"))),
            Some(PeerEvent::Close) | None => None,
        }
    }

    async fn close(&mut self) -> AppResult<()> {
        self.release();
        Ok(())
    }
}

impl Drop for MockSocket {
    fn drop(&mut self) {
        self.release();
    }
}
