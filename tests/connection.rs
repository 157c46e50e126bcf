//! Connection manager against a scripted WebSocket server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};

use gateway_client::{ConnectionConfig, ConnectionManager, ConnectionState, InboundMessage};

use common::{Step, WsServer, init_logging, unused_addr, wait_until};

// ============================================================================
// Helpers
// ============================================================================

const WAIT: Duration = Duration::from_secs(5);

fn config(url: &str) -> ConnectionConfig {
    ConnectionConfig::new(url)
        .with_reconnect_interval(Duration::from_millis(50))
        .with_heartbeat_interval(Duration::ZERO)
        .with_auto_connect(false)
}

type States = Arc<Mutex<Vec<ConnectionState>>>;

fn record_states(manager: &ConnectionManager) -> States {
    let states: States = Arc::new(Mutex::new(Vec::new()));
    let states_clone = Arc::clone(&states);
    let subscription = manager.on_state_change(move |state| states_clone.lock().push(state));
    drop(subscription);
    states
}

fn count(states: &States, wanted: ConnectionState) -> usize {
    states.lock().iter().filter(|state| **state == wanted).count()
}

async fn connected(url: &str) -> ConnectionManager {
    let manager = ConnectionManager::new(config(url));
    manager.connect();
    assert!(wait_until(WAIT, || manager.is_connected()).await, "connect");
    manager
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_auto_connect() {
    init_logging();
    let server = WsServer::start(vec![]).await;

    let manager = ConnectionManager::new(config(&server.url).with_auto_connect(true));

    assert!(wait_until(WAIT, || manager.state() == ConnectionState::Connected).await);
    assert_eq!(server.accepted(), 1);
}

#[tokio::test]
async fn test_connect_walks_through_connecting() {
    init_logging();
    let server = WsServer::start(vec![]).await;
    let manager = ConnectionManager::new(config(&server.url));
    let states = record_states(&manager);

    manager.connect();
    assert!(wait_until(WAIT, || manager.is_connected()).await);

    assert_eq!(
        *states.lock(),
        vec![
            ConnectionState::Disconnected,
            ConnectionState::Connecting,
            ConnectionState::Connected,
        ]
    );
}

#[tokio::test]
async fn test_double_connect_opens_one_socket() {
    init_logging();
    let server = WsServer::start(vec![]).await;
    let manager = ConnectionManager::new(config(&server.url));

    manager.connect();
    manager.connect();
    assert!(wait_until(WAIT, || manager.is_connected()).await);
    manager.connect();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.accepted(), 1);
}

#[tokio::test]
async fn test_disconnect_sends_close_and_stays_down() {
    init_logging();
    let server = WsServer::start(vec![]).await;
    let manager = connected(&server.url).await;

    manager.disconnect();

    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert!(!manager.send("ping", json!({})));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(server.accepted(), 1);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

// ============================================================================
// Messaging
// ============================================================================

#[derive(Debug, Deserialize, PartialEq)]
struct Alert {
    level: String,
    message: String,
}

#[tokio::test]
async fn test_inbound_frames_are_dispatched_by_type() {
    init_logging();
    let server = WsServer::start(vec![vec![
        Step::Pause(Duration::from_millis(100)),
        Step::Send(json!({ "type": "alert", "payload": { "level": "warn", "message": "disk" }, "timestamp": 1 }).to_string()),
        Step::Send(json!({ "type": "metrics", "payload": { "cpu": 0.5 } }).to_string()),
        Step::Send("not json".to_owned()),
    ]])
    .await;

    let manager = ConnectionManager::new(config(&server.url));
    let alerts = Arc::new(Mutex::new(Vec::new()));
    let metrics = Arc::new(Mutex::new(Vec::<Value>::new()));
    let raw = Arc::new(Mutex::new(Vec::new()));

    let alerts_clone = Arc::clone(&alerts);
    let _alerts = manager.on_payload("alert", move |alert: Alert| alerts_clone.lock().push(alert));
    let metrics_clone = Arc::clone(&metrics);
    let _metrics = manager.on("metrics", move |payload| metrics_clone.lock().push(payload.clone()));
    let raw_clone = Arc::clone(&raw);
    let _raw = manager.on_message(move |message| {
        let label = match message {
            InboundMessage::Json(_) => "json",
            InboundMessage::Text(_) => "text",
            InboundMessage::Binary(_) => "binary",
        };
        raw_clone.lock().push(label);
    });

    manager.connect();
    assert!(wait_until(WAIT, || raw.lock().len() == 3).await);

    assert_eq!(
        *alerts.lock(),
        vec![Alert {
            level: "warn".into(),
            message: "disk".into(),
        }]
    );
    assert_eq!(*metrics.lock(), vec![json!({ "cpu": 0.5 })]);
    assert_eq!(*raw.lock(), vec!["json", "json", "text"]);
}

#[tokio::test]
async fn test_send_wraps_payload_in_envelope() {
    init_logging();
    let server = WsServer::start(vec![]).await;
    let manager = connected(&server.url).await;

    assert!(manager.send("subscribe", json!({ "channel": "agents" })));

    let text = server.next_text(WAIT).await.expect("frame");
    let frame: Value = serde_json::from_str(&text).expect("json frame");
    assert_eq!(frame["type"], "subscribe");
    assert_eq!(frame["payload"]["channel"], "agents");
    assert!(frame["timestamp"].as_i64().is_some_and(|ms| ms > 0));
}

#[tokio::test]
async fn test_send_raw_passes_text_through() {
    init_logging();
    let server = WsServer::start(vec![]).await;
    let manager = connected(&server.url).await;

    assert!(manager.send_raw("hello"));

    assert_eq!(server.next_text(WAIT).await.as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_heartbeat_is_sent_while_connected() {
    init_logging();
    let server = WsServer::start(vec![]).await;
    let manager = ConnectionManager::new(
        config(&server.url).with_heartbeat_interval(Duration::from_millis(50)),
    );
    manager.connect();

    let text = server.next_text(WAIT).await.expect("heartbeat");
    let frame: Value = serde_json::from_str(&text).expect("json heartbeat");
    assert_eq!(frame, json!({ "type": "ping" }));
}

// ============================================================================
// Reconnection
// ============================================================================

#[tokio::test]
async fn test_refused_connection_gives_up_after_budget() {
    init_logging();
    let addr = unused_addr().await;
    let manager = ConnectionManager::new(
        config(&format!("ws://{addr}/ws")).with_max_reconnect_attempts(2),
    );
    let states = record_states(&manager);

    manager.connect();
    assert!(wait_until(WAIT, || count(&states, ConnectionState::Connecting) == 3).await);
    assert!(wait_until(WAIT, || count(&states, ConnectionState::Disconnected) == 4).await);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(count(&states, ConnectionState::Connecting), 3);
    assert_eq!(count(&states, ConnectionState::Reconnecting), 2);
    assert_eq!(count(&states, ConnectionState::Error), 3);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(manager.reconnect_attempts(), 2);
}

#[tokio::test]
async fn test_disconnect_cancels_pending_reconnect() {
    init_logging();
    let addr = unused_addr().await;
    let manager = ConnectionManager::new(
        config(&format!("ws://{addr}/ws")).with_reconnect_interval(Duration::from_millis(200)),
    );
    let states = record_states(&manager);

    manager.connect();
    assert!(wait_until(WAIT, || manager.state() == ConnectionState::Reconnecting).await);

    manager.disconnect();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(count(&states, ConnectionState::Connecting), 1);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
    assert_eq!(manager.reconnect_attempts(), 0);
}

#[tokio::test]
async fn test_server_close_does_not_reconnect() {
    init_logging();
    let server = WsServer::start(vec![vec![
        Step::Pause(Duration::from_millis(50)),
        Step::Close,
    ]])
    .await;
    let manager = connected(&server.url).await;

    assert!(wait_until(WAIT, || manager.state() == ConnectionState::Disconnected).await);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(server.accepted(), 1);
    assert_eq!(manager.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_dropped_connection_reconnects() {
    init_logging();
    let server = WsServer::start(vec![vec![
        Step::Pause(Duration::from_millis(50)),
        Step::Abort,
    ]])
    .await;
    let manager = connected(&server.url).await;
    let states = record_states(&manager);

    assert!(wait_until(WAIT, || server.accepted() == 2).await);
    assert!(wait_until(WAIT, || manager.is_connected()).await);

    assert_eq!(count(&states, ConnectionState::Reconnecting), 1);
    assert_eq!(manager.reconnect_attempts(), 0);
}
