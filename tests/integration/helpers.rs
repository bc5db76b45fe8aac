//! Shared test helpers for integration tests.
//!
//! [`TestServer`] is an in-process stand-in for the PhotoHub API: token and
//! principal endpoints, the paginated notification list, delete, and the
//! notification WebSocket.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::broadcast;

/// Access token issued for the correct password.
pub const ACCESS_TOKEN: &str = "access-token-for-alice-0123456789";
/// The only password the server accepts.
pub const PASSWORD: &str = "correct horse";

const CLOSE_SENTINEL: &str = "\u{0}close";

#[derive(Clone)]
struct ServerState {
    notifications: Arc<Mutex<Vec<Value>>>,
    deleted: Arc<Mutex<Vec<i64>>>,
    pushes: broadcast::Sender<String>,
    list_calls: Arc<AtomicUsize>,
    accepted: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

/// A running API server bound to an ephemeral port.
pub struct TestServer {
    addr: SocketAddr,
    state: ServerState,
}

impl TestServer {
    /// Start a server whose notification list returns `notifications`.
    pub async fn start(notifications: Vec<Value>) -> Self {
        let (pushes, _) = broadcast::channel(64);
        let state = ServerState {
            notifications: Arc::new(Mutex::new(notifications)),
            deleted: Arc::new(Mutex::new(Vec::new())),
            pushes,
            list_calls: Arc::new(AtomicUsize::new(0)),
            accepted: Arc::new(AtomicUsize::new(0)),
            live: Arc::new(AtomicUsize::new(0)),
        };

        let app = Router::new()
            .route("/api/token/", post(obtain_token))
            .route("/api/auth/me/", get(current_user))
            .route("/api/notifications/", get(list_notifications))
            .route("/api/notifications/{id}/", delete(delete_notification))
            .route("/ws/notifications/", get(notification_socket))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });

        Self { addr, state }
    }

    /// REST base URL, including the `/api` prefix.
    pub fn api_base(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Push a notification to every connected socket.
    pub fn push(&self, notification: &Value) {
        let frame = json!({ "type": "notification", "notification": notification });
        self.push_raw(&frame.to_string());
    }

    /// Push an arbitrary text frame.
    pub fn push_raw(&self, raw: &str) {
        let _ = self.state.pushes.send(raw.to_string());
    }

    /// Close every connected socket from the server side.
    pub fn drop_connections(&self) {
        self.push_raw(CLOSE_SENTINEL);
    }

    pub fn set_notifications(&self, notifications: Vec<Value>) {
        *self.state.notifications.lock().unwrap() = notifications;
    }

    pub fn deleted(&self) -> Vec<i64> {
        self.state.deleted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    /// Sockets accepted so far.
    pub fn accepted(&self) -> usize {
        self.state.accepted.load(Ordering::SeqCst)
    }

    /// Sockets currently open.
    pub fn live(&self) -> usize {
        self.state.live.load(Ordering::SeqCst)
    }
}

/// A notification as the API serializes it.
pub fn notification(id: i64, actor: &str) -> Value {
    json!({
        "id": id,
        "actor": actor,
        "verb": format!("commented on photo {id}"),
        "image_id": id * 10,
        "comment_id": null,
        "unread": true,
        "created_at": "2024-05-01T12:00:00Z",
    })
}

/// Poll `condition` until it holds, failing the test after five seconds.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "timed out waiting for {what}");
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ACCESS_TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Given token not valid for any token type" })),
    )
        .into_response()
}

async fn obtain_token(Json(body): Json<Value>) -> Response {
    if body["username"] == "alice" && body["password"] == PASSWORD {
        Json(json!({ "access": ACCESS_TOKEN, "refresh": "refresh-token-0123456789" })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "No active account found with the given credentials" })),
        )
            .into_response()
    }
}

async fn current_user(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "id": 1, "username": "alice", "email": "alice@example.com", "role": "MEMBER" }))
        .into_response()
}

async fn list_notifications(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let results = state.notifications.lock().unwrap().clone();
    Json(json!({ "count": results.len(), "next": null, "previous": null, "results": results }))
        .into_response()
}

async fn delete_notification(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    state.deleted.lock().unwrap().push(id);
    state
        .notifications
        .lock()
        .unwrap()
        .retain(|n| n["id"].as_i64() != Some(id));
    StatusCode::NO_CONTENT.into_response()
}

#[derive(serde::Deserialize)]
struct SocketQuery {
    token: Option<String>,
}

async fn notification_socket(
    State(state): State<ServerState>,
    Query(query): Query<SocketQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    if query.token.as_deref() != Some(ACCESS_TOKEN) {
        return StatusCode::FORBIDDEN.into_response();
    }
    // Subscribe before the upgrade so nothing pushed after the client sees
    // the connection open is missed.
    let pushes = state.pushes.subscribe();
    ws.on_upgrade(move |socket| serve_socket(socket, state, pushes))
}

async fn serve_socket(
    mut socket: WebSocket,
    state: ServerState,
    mut pushes: broadcast::Receiver<String>,
) {
    state.accepted.fetch_add(1, Ordering::SeqCst);
    state.live.fetch_add(1, Ordering::SeqCst);

    loop {
        tokio::select! {
            push = pushes.recv() => match push {
                Ok(raw) if raw == CLOSE_SENTINEL => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
                Ok(raw) => {
                    if socket.send(Message::Text(raw.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    state.live.fetch_sub(1, Ordering::SeqCst);
}
