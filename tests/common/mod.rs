//! Shared fixtures for integration tests.
//!
//! - [`serve_http`] runs an axum router on an ephemeral port
//! - [`WsServer`] is a scripted WebSocket peer that counts accepted
//!   connections and records text frames it receives
//! - [`wait_until`] polls a condition against real time

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, timeout};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

// ============================================================================
// Logging
// ============================================================================

/// Routes crate logs to the test writer. Safe to call repeatedly.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("gateway_client=debug"))
        .with_test_writer()
        .try_init();
}

// ============================================================================
// HTTP
// ============================================================================

/// Serves `router` on `127.0.0.1` and returns its base URL.
pub async fn serve_http(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind http listener");
    let addr = listener.local_addr().expect("http listener address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    format!("http://{addr}")
}

/// Returns an address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind probe listener");
    listener.local_addr().expect("probe address")
}

// ============================================================================
// WebSocket
// ============================================================================

/// One action the scripted server performs after the handshake.
#[derive(Debug, Clone)]
pub enum Step {
    /// Send a text frame.
    Send(String),
    /// Wait before the next step.
    Pause(Duration),
    /// Send a close frame and finish the closing handshake.
    Close,
    /// Drop the TCP stream without a close frame.
    Abort,
}

/// Scripted WebSocket server.
///
/// Connection `n` runs `scripts[n]`, or nothing if the script list is
/// shorter. Once its script is done, a connection stays open and records
/// every text frame until the client goes away.
pub struct WsServer {
    pub url: String,
    accepted: Arc<AtomicUsize>,
    received: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl WsServer {
    pub async fn start(scripts: Vec<Vec<Step>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ws listener");
        let addr = listener.local_addr().expect("ws listener address");
        let accepted = Arc::new(AtomicUsize::new(0));
        let (received_tx, received_rx) = mpsc::unbounded_channel();

        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let steps = scripts.get(index).cloned().unwrap_or_default();
                tokio::spawn(handle_connection(stream, steps, received_tx.clone()));
            }
        });

        Self {
            url: format!("ws://{addr}/ws"),
            accepted,
            received: Mutex::new(received_rx),
        }
    }

    /// Number of TCP connections accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Waits for the next text frame from any client.
    pub async fn next_text(&self, within: Duration) -> Option<String> {
        let deadline = Instant::now() + within;
        loop {
            if let Ok(text) = self.received.lock().try_recv() {
                return Some(text);
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    steps: Vec<Step>,
    received: mpsc::UnboundedSender<String>,
) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };

    for step in steps {
        match step {
            Step::Send(text) => {
                if ws.send(Message::text(text)).await.is_err() {
                    return;
                }
            }
            Step::Pause(duration) => sleep(duration).await,
            Step::Close => {
                let _ = ws.close(None).await;
                while let Some(Ok(_)) = ws.next().await {}
                return;
            }
            Step::Abort => return,
        }
    }

    while let Some(Ok(message)) = ws.next().await {
        if let Message::Text(text) = message {
            let _ = received.send(text.as_str().to_owned());
        }
    }
}

// ============================================================================
// Waiting
// ============================================================================

/// Polls `condition` every 10ms until it holds or `within` elapses.
pub async fn wait_until(within: Duration, mut condition: impl FnMut() -> bool) -> bool {
    timeout(within, async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}
