//! Status poller end to end over HTTP.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;

use gateway_client::{
    AgentState, ClientConfig, GatewayClient, PollingConfig, PollingConfigUpdate, StatusPoller,
};

use common::{init_logging, serve_http, wait_until};

const WAIT: Duration = Duration::from_secs(5);

/// Serves `online`, then `busy`, then one 503, then `busy` again.
async fn scripted_status(State(calls): State<Arc<AtomicUsize>>) -> Response {
    let call = calls.fetch_add(1, Ordering::SeqCst);
    let state = match call {
        0 => "online",
        2 => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "Gateway warming up", "code": "WARMING_UP" })),
            )
                .into_response();
        }
        _ => "busy",
    };

    Json(json!({
        "agents": [{
            "id": "a1",
            "name": "Indexer",
            "type": "worker",
            "state": state,
            "lastSeen": "2024-05-01T12:00:00.250Z"
        }],
        "total": 1,
        "timestamp": 1714564800250_i64
    }))
    .into_response()
}

async fn poller() -> (StatusPoller, Arc<AtomicUsize>) {
    init_logging();

    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/api/agents/status", get(scripted_status))
        .with_state(Arc::clone(&calls));
    let base_url = serve_http(router).await;

    let client = Arc::new(
        GatewayClient::new(ClientConfig::default().with_base_url(base_url)).expect("client"),
    );
    let config = PollingConfig::default()
        .with_interval(Duration::from_millis(50))
        .with_error_retry_interval(Duration::from_millis(50));

    (StatusPoller::with_client(config, client), calls)
}

#[tokio::test]
async fn test_poller_reports_changes_and_recovers_from_errors() {
    let (poller, calls) = poller().await;
    let updates = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));

    let updates_clone = Arc::clone(&updates);
    let _updates = poller.on_agent("a1", move |agent| updates_clone.lock().push(agent.state));
    let errors_clone = Arc::clone(&errors);
    let _status = poller.on_status_update(move |agents, error| {
        if let Some(error) = error {
            errors_clone
                .lock()
                .push((agents.len(), error.code().to_owned(), error.status()));
        }
    });

    poller.start();
    assert!(
        wait_until(WAIT, || {
            calls.load(Ordering::SeqCst) >= 4 && poller.retry_count() == 0 && !errors.lock().is_empty()
        })
        .await
    );
    poller.stop();

    assert_eq!(*updates.lock(), vec![AgentState::Online, AgentState::Busy]);
    assert_eq!(*errors.lock(), vec![(1, "WARMING_UP".to_owned(), 503)]);
    assert_eq!(poller.retry_count(), 0);

    let agent = poller.agent("a1").expect("cached agent");
    assert_eq!(agent.last_seen.map(|at| at.timestamp_millis()), Some(1714564800250));
}

#[tokio::test]
async fn test_poller_stop_halts_requests() {
    let (poller, calls) = poller().await;

    poller.start();
    assert!(wait_until(WAIT, || calls.load(Ordering::SeqCst) >= 2).await);
    poller.stop();

    // Let an in-flight request land before sampling.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(calls.load(Ordering::SeqCst), settled);
    assert!(!poller.is_running());
}

#[tokio::test]
async fn test_refresh_and_reconfigure() {
    let (poller, calls) = poller().await;
    poller.set_config(PollingConfigUpdate::new().interval(Duration::from_secs(60)));

    poller.start();
    assert!(wait_until(WAIT, || poller.last_snapshot().is_some()).await);

    let agents = poller.refresh().await.expect("refresh");
    assert_eq!(agents[0].state, AgentState::Busy);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let error = poller.refresh().await.expect_err("third call fails");
    assert_eq!(error.code(), "WARMING_UP");
    assert_eq!(poller.last_status().map(|agents| agents.len()), Some(1));
}

async fn sparse_status() -> Json<serde_json::Value> {
    Json(json!({
        "agents": [
            {
                "id": "a1",
                "name": "Indexer",
                "type": "worker",
                "state": "online",
                "lastSeen": null,
                "metadata": null
            },
            {
                "id": "a2",
                "name": "Router",
                "type": "gateway",
                "state": "busy",
                "lastSeen": "soon"
            }
        ],
        "total": 2,
        "timestamp": 1718000000000.0
    }))
}

#[tokio::test]
async fn test_poller_accepts_null_metadata_and_last_seen() {
    init_logging();
    let router = Router::new().route("/api/agents/status", get(sparse_status));
    let base_url = serve_http(router).await;
    let client = Arc::new(
        GatewayClient::new(ClientConfig::default().with_base_url(base_url)).expect("client"),
    );
    let poller = StatusPoller::with_client(
        PollingConfig::default().with_interval(Duration::from_millis(50)),
        client,
    );

    let errors = Arc::new(AtomicUsize::new(0));
    let errors_clone = Arc::clone(&errors);
    let _status = poller.on_status_update(move |_, error| {
        if error.is_some() {
            errors_clone.fetch_add(1, Ordering::SeqCst);
        }
    });

    poller.start();
    assert!(wait_until(WAIT, || poller.last_snapshot().is_some()).await);
    let agents = poller.refresh().await.expect("refresh");
    poller.stop();

    assert_eq!(agents.len(), 2);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert_eq!(poller.retry_count(), 0);

    let indexer = poller.agent("a1").expect("cached agent");
    assert!(indexer.metadata.is_empty());
    assert_eq!(indexer.last_seen, None);
    assert_eq!(poller.agent("a2").and_then(|agent| agent.last_seen), None);

    let snapshot = poller.last_snapshot().expect("snapshot");
    assert_eq!(snapshot.timestamp, 1_718_000_000_000);
}
