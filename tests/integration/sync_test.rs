//! End-to-end notification sync against an in-process API server.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use photohub_auth::{MemoryTokenStore, SessionManager};
use photohub_client::ApiClient;
use photohub_core::config::{ApiConfig, RealtimeConfig};
use photohub_core::types::Credentials;
use photohub_realtime::connection::WsConnector;
use photohub_realtime::{ConnectionState, NotificationSync};

use helpers::{PASSWORD, TestServer, notification, wait_until};

struct Client {
    session: Arc<SessionManager>,
    sync: NotificationSync,
}

fn client(server: &TestServer) -> Client {
    let api = Arc::new(
        ApiClient::new(&ApiConfig {
            base_url: server.api_base(),
            request_timeout_seconds: 5,
        })
        .expect("api client"),
    );
    let session = Arc::new(SessionManager::new(api.clone(), Arc::new(MemoryTokenStore::new())));

    let realtime = RealtimeConfig {
        reconnect_delay_ms: 100,
        connect_timeout_seconds: 2,
        ..RealtimeConfig::default()
    };
    let sync = NotificationSync::start(
        &server.api_base(),
        &realtime,
        session.clone(),
        api,
        Arc::new(WsConnector::new()),
    )
    .expect("sync");

    Client { session, sync }
}

async fn login(client: &Client) {
    client
        .session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("login");
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let server = TestServer::start(vec![notification(1, "bob"), notification(2, "carol")]).await;
    let c = client(&server);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(c.sync.connection_state(), ConnectionState::Disconnected);
    assert_eq!(server.accepted(), 0);

    login(&c).await;
    wait_until("open connection", || c.sync.connection_state() == ConnectionState::Open).await;
    wait_until("snapshot", || c.sync.view().ids() == vec![1, 2]).await;
    assert_eq!(c.sync.unread_count(), 2);

    server.push_raw("not json");
    server.push_raw(r#"{"type":"typing","user":"bob"}"#);
    server.push(&notification(3, "dave"));
    wait_until("push", || c.sync.view().ids() == vec![3, 1, 2]).await;
    assert_eq!(c.sync.unread_count(), 3);
    assert_eq!(c.sync.view().items[0].actor.as_deref(), Some("dave"));

    c.sync.delete(1).expect("token stored").await.expect("delete task");
    assert_eq!(server.deleted(), vec![1]);
    assert_eq!(c.sync.view().ids(), vec![3, 2]);

    c.session.logout();
    wait_until("disconnect", || {
        c.sync.connection_state() == ConnectionState::Disconnected && server.live() == 0
    })
    .await;
    assert!(c.sync.view().is_empty());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(server.accepted(), 1);

    c.sync.shutdown().await;
}

#[tokio::test]
async fn test_rejected_login_never_connects() {
    let server = TestServer::start(vec![notification(1, "bob")]).await;
    let c = client(&server);

    let err = c
        .session
        .login(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();
    assert!(err.is_authentication());
    assert_eq!(
        c.session.state().error.as_deref(),
        Some("No active account found with the given credentials")
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(server.accepted(), 0);
    assert_eq!(server.list_calls(), 0);

    c.sync.shutdown().await;
}

#[tokio::test]
async fn test_server_close_reconnects_and_resyncs() {
    let server = TestServer::start(vec![notification(1, "bob")]).await;
    let c = client(&server);
    login(&c).await;
    wait_until("snapshot", || c.sync.view().ids() == vec![1]).await;

    server.set_notifications(vec![notification(5, "erin"), notification(1, "bob")]);
    server.drop_connections();

    wait_until("second connection", || server.accepted() == 2).await;
    wait_until("resync", || c.sync.view().ids() == vec![5, 1]).await;
    assert_eq!(server.list_calls(), 2);
    assert_eq!(server.live(), 1);

    c.sync.shutdown().await;
    wait_until("socket closed", || server.live() == 0).await;
}

#[tokio::test]
async fn test_restart_replaces_connection() {
    let server = TestServer::start(Vec::new()).await;
    let c = client(&server);
    login(&c).await;
    wait_until("open connection", || c.sync.connection_state() == ConnectionState::Open).await;

    c.sync.restart();
    wait_until("replacement", || server.accepted() == 2 && server.live() == 1).await;
    wait_until("open again", || c.sync.connection_state() == ConnectionState::Open).await;

    server.push(&notification(8, "frank"));
    wait_until("push on new connection", || c.sync.view().ids() == vec![8]).await;

    c.sync.shutdown().await;
    c.sync.shutdown().await;
    assert_eq!(c.sync.connection_state(), ConnectionState::Disconnected);
}
