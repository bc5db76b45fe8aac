//! The realtime transport: one supervised connection per session.
//!
//! A single supervisor task owns the socket, the reconnect timer, and the
//! snapshot fetch. Everything that can change its course (session
//! transitions, restart requests, teardown) reaches it through channels, so
//! there is never more than one connection object and no callback can act on
//! a connection that has been replaced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use photohub_core::config::RealtimeConfig;
use photohub_core::result::AppResult;
use photohub_core::traits::{NotificationApi, SessionContext};
use photohub_core::types::{AuthState, SessionToken};

use super::backoff::ReconnectPolicy;
use super::endpoint::SocketEndpoint;
use super::socket::{Connector, Frame, Socket};
use super::state::ConnectionState;
use crate::message::parse_push;
use crate::notification::Reconciler;

/// Static transport parameters.
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Socket location (without credentials).
    pub endpoint: SocketEndpoint,
    /// Reconnect delay schedule.
    pub policy: ReconnectPolicy,
    /// Handshake deadline.
    pub connect_timeout: Duration,
    /// Tokens shorter than this never open a connection.
    pub min_token_length: usize,
    /// Larger inbound frames are dropped.
    pub max_message_bytes: usize,
}

impl TransportSettings {
    /// Build settings from the API base URL and realtime configuration.
    pub fn from_config(api_base: &str, config: &RealtimeConfig) -> AppResult<Self> {
        Ok(Self {
            endpoint: SocketEndpoint::from_api_base(api_base)?,
            policy: ReconnectPolicy::from_config(config),
            connect_timeout: config.connect_timeout(),
            min_token_length: config.min_token_length,
            max_message_bytes: config.max_message_bytes,
        })
    }
}

/// Lifetime flag shared between the handle, the supervisor and its helpers.
#[derive(Debug)]
struct Lifetime {
    mounted: AtomicBool,
    cancel: CancellationToken,
}

impl Lifetime {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Returns whether this call performed the unmount.
    fn unmount(&self) -> bool {
        let was_mounted = self.mounted.swap(false, Ordering::SeqCst);
        self.cancel.cancel();
        was_mounted
    }
}

#[derive(Debug)]
enum Command {
    Restart,
}

/// Handle to the supervised realtime connection.
///
/// Dropping the handle tears the connection down; [`shutdown`](Self::shutdown)
/// does the same and waits for it to finish.
#[derive(Debug)]
pub struct RealtimeTransport {
    lifetime: Arc<Lifetime>,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RealtimeTransport {
    /// Start supervising. Must be called inside a Tokio runtime.
    ///
    /// Nothing is opened until `session` reports an authenticated state with
    /// a usable token.
    pub fn spawn(
        settings: TransportSettings,
        session: Arc<dyn SessionContext>,
        connector: Arc<dyn Connector>,
        api: Arc<dyn NotificationApi>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        let lifetime = Arc::new(Lifetime {
            mounted: AtomicBool::new(true),
            cancel: CancellationToken::new(),
        });
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let auth = session.subscribe();
        let epoch = auth.borrow().epoch;

        let supervisor = Supervisor {
            settings,
            session,
            connector,
            api,
            reconciler,
            lifetime: Arc::clone(&lifetime),
            commands: commands_rx,
            state: state_tx,
            auth,
            socket: None,
            snapshot: None,
            attempt: 0,
            epoch,
        };
        let task = tokio::spawn(supervisor.run());

        Self {
            lifetime,
            commands: commands_tx,
            state: state_rx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Whether the transport has not been torn down yet.
    pub fn is_mounted(&self) -> bool {
        self.lifetime.is_mounted()
    }

    /// Close the current connection (if any) and open a fresh one.
    ///
    /// A no-op after teardown or while there are no usable credentials.
    pub fn restart(&self) {
        if self.lifetime.is_mounted() {
            let _ = self.commands.send(Command::Restart);
        }
    }

    /// Tear down: cancel pending reconnects and fetches, close the socket,
    /// and wait for the supervisor to exit. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        if self.lifetime.unmount() {
            info!("Stopping realtime transport");
        }

        let task = self
            .task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Realtime supervisor ended abnormally");
            }
        }
    }
}

impl Drop for RealtimeTransport {
    fn drop(&mut self) {
        self.lifetime.unmount();
    }
}

/// Where the supervisor goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Idle,
    Connect,
    Open,
    Reconnect,
    Stop,
}

struct Supervisor {
    settings: TransportSettings,
    session: Arc<dyn SessionContext>,
    connector: Arc<dyn Connector>,
    api: Arc<dyn NotificationApi>,
    reconciler: Arc<Reconciler>,
    lifetime: Arc<Lifetime>,
    commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<ConnectionState>,
    auth: watch::Receiver<AuthState>,
    socket: Option<Box<dyn Socket>>,
    snapshot: Option<JoinHandle<()>>,
    /// Consecutive failed attempts since the last open connection.
    attempt: u32,
    /// Credential epoch the current connection was opened with.
    epoch: u64,
}

impl Supervisor {
    async fn run(mut self) {
        let mut step = Step::Idle;
        while step != Step::Stop {
            if !self.lifetime.is_mounted() {
                break;
            }
            trace!(?step, "Realtime supervisor step");
            step = match step {
                Step::Idle => self.idle().await,
                Step::Connect => self.connect().await,
                Step::Open => self.pump().await,
                Step::Reconnect => self.wait_reconnect().await,
                Step::Stop => Step::Stop,
            };
        }
        self.teardown().await;
    }

    /// Wait until the session has usable credentials.
    async fn idle(&mut self) -> Step {
        loop {
            if self.usable_token().is_some() {
                return Step::Connect;
            }

            tokio::select! {
                biased;
                _ = self.lifetime.cancel.cancelled() => return Step::Stop,
                changed = self.auth.changed() => {
                    if changed.is_err() {
                        return Step::Stop;
                    }
                    if let Some(step) = self.on_session_change().await {
                        return step;
                    }
                }
                // Nothing to restart without credentials.
                Some(Command::Restart) = self.commands.recv() => {}
            }
        }
    }

    /// Replace any existing connection with a new one.
    async fn connect(&mut self) -> Step {
        self.close_socket().await;

        let Some(token) = self.usable_token() else {
            debug!("No usable credentials; not connecting");
            return Step::Idle;
        };
        self.epoch = self.auth.borrow().epoch;
        self.set_state(ConnectionState::Connecting);

        let url = self.settings.endpoint.url_for(&token);
        let connect_timeout = self.settings.connect_timeout;
        let connector = Arc::clone(&self.connector);
        info!(endpoint = %self.settings.endpoint, attempt = self.attempt, "Connecting to realtime notifications");

        let handshake = tokio::time::timeout(connect_timeout, async move { connector.connect(&url).await });
        tokio::pin!(handshake);

        loop {
            tokio::select! {
                biased;
                _ = self.lifetime.cancel.cancelled() => return Step::Stop,
                changed = self.auth.changed() => {
                    if changed.is_err() {
                        return Step::Stop;
                    }
                    if let Some(step) = self.on_session_change().await {
                        return step;
                    }
                }
                Some(Command::Restart) = self.commands.recv() => return Step::Connect,
                result = &mut handshake => {
                    return match result {
                        Ok(Ok(socket)) => {
                            self.on_open(socket, token);
                            Step::Open
                        }
                        Ok(Err(e)) => {
                            warn!(error = %e, "Realtime handshake failed");
                            self.set_state(ConnectionState::Disconnected);
                            Step::Reconnect
                        }
                        Err(_) => {
                            warn!(timeout_secs = connect_timeout.as_secs(), "Realtime handshake timed out");
                            self.set_state(ConnectionState::Disconnected);
                            Step::Reconnect
                        }
                    };
                }
            }
        }
    }

    fn on_open(&mut self, socket: Box<dyn Socket>, token: SessionToken) {
        self.socket = Some(socket);
        self.attempt = 0;
        self.set_state(ConnectionState::Open);
        info!(endpoint = %self.settings.endpoint, "Realtime notifications connected");
        self.refresh_snapshot(token);
    }

    /// Deliver inbound frames until the connection ends or is replaced.
    async fn pump(&mut self) -> Step {
        loop {
            tokio::select! {
                biased;
                _ = self.lifetime.cancel.cancelled() => return Step::Stop,
                changed = self.auth.changed() => {
                    if changed.is_err() {
                        return Step::Stop;
                    }
                    if let Some(step) = self.on_session_change().await {
                        return step;
                    }
                }
                Some(Command::Restart) = self.commands.recv() => {
                    info!("Restarting realtime connection");
                    return Step::Connect;
                }
                frame = next_frame(&mut self.socket) => match frame {
                    Some(Ok(frame)) => self.handle_frame(&frame),
                    Some(Err(e)) => {
                        warn!(error = %e, "Realtime connection failed");
                        self.discard_socket();
                        return Step::Reconnect;
                    }
                    None => {
                        info!("Realtime connection closed by server");
                        self.discard_socket();
                        return Step::Reconnect;
                    }
                },
            }
        }
    }

    /// Sleep out the backoff delay, then try again.
    async fn wait_reconnect(&mut self) -> Step {
        let delay = self.settings.policy.delay_for(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        info!(delay_ms = delay.as_millis() as u64, attempt = self.attempt, "Realtime reconnect scheduled");

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;
                _ = self.lifetime.cancel.cancelled() => return Step::Stop,
                changed = self.auth.changed() => {
                    if changed.is_err() {
                        return Step::Stop;
                    }
                    if let Some(step) = self.on_session_change().await {
                        return step;
                    }
                }
                Some(Command::Restart) = self.commands.recv() => return Step::Connect,
                _ = &mut sleep => {
                    if !self.lifetime.is_mounted() {
                        return Step::Stop;
                    }
                    return Step::Connect;
                }
            }
        }
    }

    /// React to a published session transition. `None` means carry on.
    async fn on_session_change(&mut self) -> Option<Step> {
        let (authenticated, epoch) = {
            let state = self.auth.borrow_and_update();
            (state.authenticated, state.epoch)
        };

        if !authenticated {
            if self.socket.is_some() || *self.state.borrow() != ConnectionState::Disconnected {
                info!("Session ended; closing realtime connection");
            }
            self.abort_snapshot();
            self.close_socket().await;
            if self.lifetime.is_mounted() {
                self.reconciler.clear();
            }
            self.attempt = 0;
            return Some(Step::Idle);
        }

        if epoch != self.epoch {
            debug!(epoch, "Credentials changed; reconnecting");
            self.attempt = 0;
            return Some(Step::Connect);
        }

        None
    }

    fn handle_frame(&self, frame: &Frame) {
        if !self.lifetime.is_mounted() {
            return;
        }
        if let Some(notification) = parse_push(frame, self.settings.max_message_bytes) {
            debug!(id = notification.id, "Notification pushed");
            self.reconciler.apply_push(notification);
        }
    }

    /// Fetch the snapshot for the connection that just opened, replacing any
    /// fetch still running for an earlier one.
    fn refresh_snapshot(&mut self, token: SessionToken) {
        self.abort_snapshot();

        let api = Arc::clone(&self.api);
        let reconciler = Arc::clone(&self.reconciler);
        let lifetime = Arc::clone(&self.lifetime);

        self.snapshot = Some(tokio::spawn(async move {
            match api.list_notifications(&token).await {
                Ok(items) if lifetime.is_mounted() => {
                    debug!(count = items.len(), "Notification snapshot loaded");
                    reconciler.load_snapshot(items);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Failed to fetch notification snapshot"),
            }
        }));
    }

    /// The session token, if the session is authenticated and the token is
    /// long enough to try.
    fn usable_token(&mut self) -> Option<SessionToken> {
        if !self.auth.borrow_and_update().authenticated {
            return None;
        }
        self.session
            .access_token()
            .filter(|token| token.is_usable(self.settings.min_token_length))
    }

    fn abort_snapshot(&mut self) {
        if let Some(task) = self.snapshot.take() {
            task.abort();
        }
    }

    /// Close the socket, if any, and settle in `Disconnected`.
    async fn close_socket(&mut self) {
        if let Some(mut socket) = self.socket.take() {
            self.set_state(ConnectionState::Closing);
            match tokio::time::timeout(self.settings.connect_timeout, socket.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(error = %e, "Error while closing realtime connection"),
                Err(_) => debug!("Timed out closing realtime connection"),
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Forget a socket that already failed or was closed by the peer.
    fn discard_socket(&mut self) {
        self.socket = None;
        self.set_state(ConnectionState::Disconnected);
    }

    fn set_state(&self, next: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            trace!(from = %current, to = %next, "Realtime state change");
            *current = next;
            true
        });
    }

    async fn teardown(&mut self) {
        self.abort_snapshot();
        self.close_socket().await;
        debug!("Realtime transport stopped");
    }
}

/// Next frame from the current socket; `None` when there is none.
async fn next_frame(socket: &mut Option<Box<dyn Socket>>) -> Option<AppResult<Frame>> {
    match socket {
        Some(socket) => socket.recv().await,
        None => None,
    }
}
