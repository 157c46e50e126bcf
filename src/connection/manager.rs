//! Reconnecting WebSocket connection manager.
//!
//! Owns one persistent connection to the gateway and hides its failures
//! behind a state machine.
//!
//! # Event Loop
//!
//! Each connection attempt spawns one tokio task that handles:
//!
//! - The opening handshake
//! - Incoming frames, dispatched to subscribers
//! - Outgoing frames queued by [`ConnectionManager::send`]
//! - The heartbeat interval
//! - Cancellation from [`ConnectionManager::disconnect`]
//!
//! Reconnects are separate timer tasks racing a cancellation token. Every
//! attempt carries a generation number; callbacks from a superseded socket
//! are ignored.
//!
//! # Failure Policy
//!
//! Nothing here returns an error to the caller. Socket failures become
//! state transitions and log lines; subscribers learn about them through
//! [`ConnectionManager::on_state_change`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at, sleep};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::observer::{Registry, Subscription, isolate};
use crate::protocol::{Envelope, InboundMessage, OutboundMessage};

use super::config::ConnectionConfig;
use super::state::ConnectionState;

// ============================================================================
// Types
// ============================================================================

/// Callback for state changes.
pub type StateHandler = dyn Fn(ConnectionState) + Send + Sync;

/// Callback for every inbound frame.
pub type MessageHandler = dyn Fn(&InboundMessage) + Send + Sync;

/// Callback for the payload of one message type.
pub type PayloadHandler = dyn Fn(&Value) + Send + Sync;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type SocketWriter = SplitSink<Socket, Message>;

/// Reason given in the close frame sent by [`ConnectionManager::disconnect`].
const CLIENT_DISCONNECT_REASON: &str = "Client disconnect";

// ============================================================================
// CloseKind
// ============================================================================

/// How a socket ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseKind {
    /// Closed from this side.
    Local,
    /// Remote completed the closing handshake.
    Clean,
    /// Stream ended without a close frame.
    Dropped,
    /// Read or write error on an open socket.
    Errored,
    /// Opening handshake failed.
    Failed,
}

// ============================================================================
// LinkSlot
// ============================================================================

/// Socket and timer bookkeeping, guarded by one lock.
#[derive(Default)]
struct LinkSlot {
    /// Incremented for every attempt and every teardown.
    generation: u64,
    /// Reconnects scheduled since the last successful open.
    attempts: u32,
    /// Cancels the in-flight or open socket.
    socket: Option<CancellationToken>,
    /// Queue into the open socket's event loop.
    outbound: Option<mpsc::UnboundedSender<Message>>,
    /// Cancels the pending reconnect timer.
    reconnect: Option<CancellationToken>,
}

impl LinkSlot {
    /// Cancels every timer and the socket, and invalidates callbacks from
    /// the current attempt.
    fn teardown(&mut self) {
        if let Some(reconnect) = self.reconnect.take() {
            reconnect.cancel();
        }
        if let Some(socket) = self.socket.take() {
            socket.cancel();
        }
        self.outbound = None;
        self.generation += 1;
    }
}

// ============================================================================
// Inner
// ============================================================================

struct Inner {
    config: ConnectionConfig,
    state: Mutex<ConnectionState>,
    /// Serializes state notifications; reentrant so handlers may trigger
    /// further transitions.
    notify: ReentrantMutex<()>,
    link: Mutex<LinkSlot>,
    state_handlers: Registry<(), StateHandler>,
    message_handlers: Registry<(), MessageHandler>,
    typed_handlers: Registry<String, PayloadHandler>,
}

// ============================================================================
// ConnectionManager
// ============================================================================

/// Manages one reconnecting WebSocket connection.
///
/// # Example
///
/// ```ignore
/// use gateway_client::{ConnectionConfig, ConnectionManager, ConnectionState};
///
/// let manager = ConnectionManager::new(ConnectionConfig::for_gateway("http://localhost:8080")?);
///
/// let _state = manager.on_state_change(|state| println!("socket is {state}"));
/// let _status = manager.on("agent.status", |payload| println!("{payload}"));
///
/// manager.send("subscribe", serde_json::json!({ "topic": "agents" }));
/// ```
///
/// Dropping the manager closes the socket and cancels all timers without
/// notifying subscribers.
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

// ============================================================================
// ConnectionManager - Constructor
// ============================================================================

impl ConnectionManager {
    /// Creates a manager and, if `auto_connect` is set, starts connecting.
    ///
    /// Connecting requires a Tokio runtime; outside one the manager moves
    /// to [`ConnectionState::Error`] instead.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        let auto_connect = config.auto_connect;

        let manager = Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(ConnectionState::Disconnected),
                notify: ReentrantMutex::new(()),
                link: Mutex::new(LinkSlot::default()),
                state_handlers: Registry::new(),
                message_handlers: Registry::new(),
                typed_handlers: Registry::new(),
            }),
        };

        if auto_connect {
            manager.connect();
        }

        manager
    }
}

// ============================================================================
// ConnectionManager - Public API
// ============================================================================

impl ConnectionManager {
    /// Returns the current state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    /// Returns `true` while the socket is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.inner.config
    }

    /// Returns the number of reconnects scheduled since the last
    /// successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.inner.link.lock().attempts
    }

    /// Opens the connection.
    ///
    /// No-op while a socket is open or being opened. Cancels a pending
    /// reconnect timer and connects immediately.
    pub fn connect(&self) {
        Inner::connect(&self.inner, None);
    }

    /// Closes the connection with a normal-closure frame.
    ///
    /// Cancels the heartbeat and any pending reconnect, resets the attempt
    /// counter and moves to [`ConnectionState::Disconnected`].
    pub fn disconnect(&self) {
        {
            let mut link = self.inner.link.lock();
            link.teardown();
            link.attempts = 0;
        }

        info!(url = %self.inner.config.url, "Disconnected by client");
        self.inner.set_state(ConnectionState::Disconnected);
    }

    /// Sends `payload` wrapped in an [`Envelope`] of type `kind`.
    ///
    /// Returns `false`, and drops the message, if not connected. Messages
    /// are never queued for later delivery.
    pub fn send<T: Serialize>(&self, kind: &str, payload: T) -> bool {
        match serde_json::to_string(&Envelope::new(kind, payload)) {
            Ok(text) => self.inner.send_text(text),
            Err(e) => {
                error!(kind, error = %e, "Failed to serialize outbound message");
                false
            }
        }
    }

    /// Sends a raw frame.
    ///
    /// Returns `false`, and drops the message, if not connected.
    pub fn send_raw(&self, message: impl Into<OutboundMessage>) -> bool {
        self.inner.send_text(message.into().to_text())
    }

    /// Subscribes to the payload of messages whose `type` equals `kind`.
    pub fn on<F>(&self, kind: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner
            .typed_handlers
            .subscribe(kind.into(), Arc::new(handler))
    }

    /// Subscribes to the payload of `kind` messages, decoded as `T`.
    ///
    /// Payloads that do not decode are logged and skipped.
    pub fn on_payload<T, F>(&self, kind: impl Into<String>, handler: F) -> Subscription
    where
        T: DeserializeOwned,
        F: Fn(T) + Send + Sync + 'static,
    {
        let kind = kind.into();
        let label = kind.clone();

        self.on(kind, move |payload: &Value| {
            match serde_json::from_value::<T>(payload.clone()) {
                Ok(decoded) => handler(decoded),
                Err(e) => warn!(kind = %label, error = %e, "Dropping undecodable payload"),
            }
        })
    }

    /// Subscribes to every inbound frame, parsed or not.
    pub fn on_message<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.inner.message_handlers.subscribe((), Arc::new(handler))
    }

    /// Subscribes to state changes.
    ///
    /// `handler` is invoked immediately with the current state, then on
    /// every actual change.
    pub fn on_state_change<F>(&self, handler: F) -> Subscription
    where
        F: Fn(ConnectionState) + Send + Sync + 'static,
    {
        let _ordering = self.inner.notify.lock();

        let handler: Arc<StateHandler> = Arc::new(handler);
        let subscription = self
            .inner
            .state_handlers
            .subscribe((), Arc::clone(&handler));

        let current = self.inner.state();
        isolate("state change handler", || handler(current));

        subscription
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.inner.link.lock().teardown();
        debug!(url = %self.inner.config.url, "Connection manager dropped");
    }
}

// ============================================================================
// Inner - State
// ============================================================================

impl Inner {
    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected && self.link.lock().outbound.is_some()
    }

    /// Moves to `next` and notifies subscribers, unless already there.
    fn set_state(&self, next: ConnectionState) {
        let _ordering = self.notify.lock();

        {
            let mut state = self.state.lock();
            if *state == next {
                return;
            }
            debug!(from = %*state, to = %next, "Connection state changed");
            *state = next;
        }

        for handler in self.state_handlers.handlers(&()) {
            isolate("state change handler", || handler(next));
        }
    }
}

// ============================================================================
// Inner - Connection Lifecycle
// ============================================================================

impl Inner {
    /// Starts a connection attempt.
    ///
    /// `reconnect` is the token of the timer that triggered this attempt;
    /// if it was cancelled in the meantime the attempt is abandoned.
    fn connect(self: &Arc<Self>, reconnect: Option<&CancellationToken>) {
        let Ok(runtime) = Handle::try_current() else {
            error!(url = %self.config.url, "Cannot connect outside a Tokio runtime");
            self.set_state(ConnectionState::Error);
            return;
        };

        let (generation, token) = {
            let mut link = self.link.lock();

            if reconnect.is_some_and(CancellationToken::is_cancelled) {
                return;
            }
            if link.socket.is_some() {
                debug!(url = %self.config.url, "Already connected or connecting");
                return;
            }
            if let Some(pending) = link.reconnect.take() {
                pending.cancel();
            }

            link.generation += 1;
            let token = CancellationToken::new();
            link.socket = Some(token.clone());
            (link.generation, token)
        };

        self.set_state(ConnectionState::Connecting);

        let inner = Arc::clone(self);
        runtime.spawn(async move {
            inner.run_socket(generation, token).await;
        });
    }

    /// Drives one socket from handshake to close.
    async fn run_socket(self: Arc<Self>, generation: u64, token: CancellationToken) {
        let request = match self.config.client_request() {
            Ok(request) => request,
            Err(e) => {
                error!(url = %self.config.url, error = %e, "Invalid WebSocket request");
                self.on_socket_closed(generation, CloseKind::Failed);
                return;
            }
        };

        debug!(url = %self.config.url, generation, "Opening WebSocket");

        let opened = tokio::select! {
            _ = token.cancelled() => {
                debug!(generation, "Connection attempt cancelled");
                return;
            }
            result = connect_async(request) => result,
        };

        let socket = match opened {
            Ok((socket, _response)) => socket,
            Err(e) => {
                warn!(url = %self.config.url, error = %e, "WebSocket connection failed");
                self.on_socket_closed(generation, CloseKind::Failed);
                return;
            }
        };

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        if !self.on_socket_open(generation, outbound_tx) {
            return;
        }

        let kind = self.run_event_loop(socket, outbound_rx, &token).await;
        self.on_socket_closed(generation, kind);
    }

    /// Records a successful open. Returns `false` if the attempt was
    /// superseded while the handshake was in flight.
    fn on_socket_open(&self, generation: u64, outbound: mpsc::UnboundedSender<Message>) -> bool {
        {
            let mut link = self.link.lock();
            if link.generation != generation || link.socket.is_none() {
                debug!(generation, "Discarding superseded socket");
                return false;
            }
            link.outbound = Some(outbound);
            link.attempts = 0;
        }

        info!(url = %self.config.url, "WebSocket connected");
        self.set_state(ConnectionState::Connected);
        true
    }

    /// Applies the close policy for a socket that ended.
    fn on_socket_closed(self: &Arc<Self>, generation: u64, kind: CloseKind) {
        {
            let mut link = self.link.lock();
            if link.generation != generation {
                return;
            }
            link.socket = None;
            link.outbound = None;
        }

        debug!(?kind, generation, "Socket closed");

        match kind {
            CloseKind::Local => {}
            CloseKind::Clean => {
                self.set_state(ConnectionState::Disconnected);
            }
            CloseKind::Dropped => {
                self.set_state(ConnectionState::Disconnected);
                self.schedule_reconnect();
            }
            CloseKind::Errored | CloseKind::Failed => {
                self.set_state(ConnectionState::Error);
                self.set_state(ConnectionState::Disconnected);
                self.schedule_reconnect();
            }
        }
    }

    /// Schedules the next attempt after the reconnect interval, unless the
    /// budget is exhausted.
    fn schedule_reconnect(self: &Arc<Self>) {
        let max_attempts = self.config.max_reconnect_attempts;

        let (attempt, token) = {
            let mut link = self.link.lock();
            if link.attempts >= max_attempts {
                error!(
                    url = %self.config.url,
                    max_attempts,
                    "Max reconnection attempts reached"
                );
                return;
            }

            link.attempts += 1;
            let token = CancellationToken::new();
            if let Some(previous) = link.reconnect.replace(token.clone()) {
                previous.cancel();
            }
            (link.attempts, token)
        };

        self.set_state(ConnectionState::Reconnecting);

        let Ok(runtime) = Handle::try_current() else {
            error!("Cannot schedule reconnect outside a Tokio runtime");
            return;
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        let delay = self.config.reconnect_interval;

        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(delay) => {
                    if let Some(inner) = weak.upgrade() {
                        info!(url = %inner.config.url, attempt, max_attempts, "Reconnecting");
                        inner.connect(Some(&token));
                    }
                }
            }
        });
    }
}

// ============================================================================
// Inner - Event Loop
// ============================================================================

impl Inner {
    /// Event loop that handles WebSocket I/O for one open socket.
    async fn run_event_loop(
        &self,
        socket: Socket,
        mut outbound_rx: mpsc::UnboundedReceiver<Message>,
        token: &CancellationToken,
    ) -> CloseKind {
        let (mut ws_write, mut ws_read) = socket.split();
        let mut heartbeat = self.heartbeat_timer();

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    Self::close_gracefully(&mut ws_write).await;
                    return CloseKind::Local;
                }

                // Incoming frames from the gateway
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            self.dispatch(&InboundMessage::from_text(text.as_str()));
                        }

                        Some(Ok(Message::Binary(bytes))) => {
                            self.dispatch(&InboundMessage::Binary(bytes.to_vec()));
                        }

                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "WebSocket closed by remote");
                            let _ = ws_write.close().await;
                            return CloseKind::Clean;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            return CloseKind::Errored;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            return CloseKind::Dropped;
                        }

                        // Ping/Pong are answered by tungstenite
                        Some(Ok(_)) => {}
                    }
                }

                // Frames queued by send()
                outbound = outbound_rx.recv() => {
                    match outbound {
                        Some(message) => {
                            if let Err(e) = ws_write.send(message).await {
                                error!(error = %e, "Failed to send frame");
                                return CloseKind::Errored;
                            }
                        }

                        None => {
                            Self::close_gracefully(&mut ws_write).await;
                            return CloseKind::Local;
                        }
                    }
                }

                _ = next_tick(&mut heartbeat) => {
                    if self.state() != ConnectionState::Connected {
                        continue;
                    }
                    let frame = Message::Text(self.config.heartbeat_message.to_text().into());
                    if let Err(e) = ws_write.send(frame).await {
                        error!(error = %e, "Failed to send heartbeat");
                        return CloseKind::Errored;
                    }
                    trace!("Heartbeat sent");
                }
            }
        }
    }

    /// Builds the heartbeat interval, or `None` when disabled.
    fn heartbeat_timer(&self) -> Option<Interval> {
        if !self.config.heartbeat_enabled() {
            return None;
        }

        let period = self.config.heartbeat_interval;
        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(timer)
    }

    /// Sends a normal-closure frame, ignoring failures.
    async fn close_gracefully(ws_write: &mut SocketWriter) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: CLIENT_DISCONNECT_REASON.into(),
        };

        if let Err(e) = ws_write.send(Message::Close(Some(frame))).await {
            debug!(error = %e, "Failed to send close frame");
        }
    }

    /// Delivers one inbound frame to generic, then type-specific,
    /// subscribers.
    fn dispatch(&self, message: &InboundMessage) {
        for handler in self.message_handlers.handlers(&()) {
            isolate("message handler", || handler(message));
        }

        let Some(kind) = message.message_type() else {
            return;
        };

        let payload = message.payload();
        for handler in self.typed_handlers.handlers(&kind.to_owned()) {
            isolate(kind, || handler(payload));
        }
    }

    /// Queues a text frame on the open socket.
    fn send_text(&self, text: String) -> bool {
        if self.state() != ConnectionState::Connected {
            warn!("Cannot send message: not connected");
            return false;
        }

        let link = self.link.lock();
        match &link.outbound {
            Some(outbound) => outbound.send(Message::Text(text.into())).is_ok(),
            None => {
                warn!("Cannot send message: not connected");
                false
            }
        }
    }
}

/// Resolves on the next heartbeat tick, or never when heartbeats are off.
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    fn idle_manager() -> ConnectionManager {
        ConnectionManager::new(ConnectionConfig::new("ws://127.0.0.1:9/ws").with_auto_connect(false))
    }

    #[test]
    fn test_new_without_auto_connect_is_disconnected() {
        let manager = idle_manager();
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(!manager.is_connected());
        assert_eq!(manager.reconnect_attempts(), 0);
    }

    #[test]
    fn test_connect_outside_runtime_moves_to_error() {
        let manager = idle_manager();
        manager.connect();
        assert_eq!(manager.state(), ConnectionState::Error);
    }

    #[test]
    fn test_state_subscription_replays_current_state() {
        let manager = idle_manager();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let _subscription = manager.on_state_change(move |state| seen_clone.lock().push(state));

        assert_eq!(*seen.lock(), vec![ConnectionState::Disconnected]);
    }

    #[test]
    fn test_set_state_notifies_only_on_change() {
        let manager = idle_manager();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let _subscription = manager.on_state_change(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        manager.inner.set_state(ConnectionState::Disconnected);
        manager.inner.set_state(ConnectionState::Connecting);
        manager.inner.set_state(ConnectionState::Connecting);

        // replay + one actual change
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_send_while_disconnected_is_dropped() {
        let manager = idle_manager();
        assert!(!manager.send("chat", json!({ "text": "hi" })));
        assert!(!manager.send_raw("raw"));
    }

    #[test]
    fn test_dispatch_routes_by_type() {
        let manager = idle_manager();
        let generic = Arc::new(AtomicUsize::new(0));
        let typed = Arc::new(Mutex::new(Vec::new()));

        let generic_clone = Arc::clone(&generic);
        let _all = manager.on_message(move |_| {
            generic_clone.fetch_add(1, Ordering::SeqCst);
        });

        let typed_clone = Arc::clone(&typed);
        let _status = manager.on("agent.status", move |payload| {
            typed_clone.lock().push(payload.clone());
        });

        manager.inner.dispatch(&InboundMessage::from_text(
            r#"{"type":"agent.status","payload":{"id":"a1"},"timestamp":1}"#,
        ));
        manager.inner.dispatch(&InboundMessage::from_text(
            r#"{"type":"other","payload":1,"timestamp":1}"#,
        ));
        manager.inner.dispatch(&InboundMessage::from_text("not json"));

        assert_eq!(generic.load(Ordering::SeqCst), 3);
        assert_eq!(*typed.lock(), vec![json!({ "id": "a1" })]);
    }

    #[test]
    fn test_panicking_handler_does_not_block_others() {
        let manager = idle_manager();
        let delivered = Arc::new(AtomicUsize::new(0));

        let _bad = manager.on("tick", |_| panic!("subscriber bug"));
        let delivered_clone = Arc::clone(&delivered);
        let _good = manager.on("tick", move |_| {
            delivered_clone.fetch_add(1, Ordering::SeqCst);
        });

        manager
            .inner
            .dispatch(&InboundMessage::from_text(r#"{"type":"tick","payload":null}"#));
        manager
            .inner
            .dispatch(&InboundMessage::from_text(r#"{"type":"tick","payload":null}"#));

        assert_eq!(delivered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_on_payload_decodes_and_skips_invalid() {
        #[derive(serde::Deserialize)]
        struct Count {
            n: u32,
        }

        let manager = idle_manager();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let _subscription = manager.on_payload("count", move |count: Count| {
            seen_clone.lock().push(count.n);
        });

        manager
            .inner
            .dispatch(&InboundMessage::from_text(r#"{"type":"count","payload":{"n":4}}"#));
        manager
            .inner
            .dispatch(&InboundMessage::from_text(r#"{"type":"count","payload":"oops"}"#));

        assert_eq!(*seen.lock(), vec![4]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let manager = idle_manager();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let subscription = manager.on("tick", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let frame = InboundMessage::from_text(r#"{"type":"tick","payload":null}"#);
        manager.inner.dispatch(&frame);
        subscription.unsubscribe();
        manager.inner.dispatch(&frame);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disconnect_resets_attempts() {
        let manager = idle_manager();
        manager.inner.link.lock().attempts = 3;

        manager.disconnect();

        assert_eq!(manager.reconnect_attempts(), 0);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }
}
