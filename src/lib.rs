//! Gateway Client - Resilient connectivity for gateway dashboards.
//!
//! This library keeps a dashboard talking to its gateway: request/response
//! calls over HTTP, a long-lived WebSocket that survives outages, and a
//! status poller that turns periodic snapshots into change events.
//!
//! # Architecture
//!
//! Three independent components share the error, protocol and observer
//! layers:
//!
//! - **Transport** ([`GatewayClient`]): one request in, one typed result
//!   or one structured [`Error`] out, bounded by a timeout
//! - **Connection** ([`ConnectionManager`]): a state machine around one
//!   WebSocket with heartbeat, bounded reconnects and typed pub/sub
//! - **Poller** ([`StatusPoller`]): fetches agent status on an interval,
//!   detects changes and fans them out
//!
//! Key design principles:
//!
//! - Failures become values or state transitions, never panics
//! - A panicking subscriber is logged and skipped; the rest still run
//! - Every timer is cancellable and at most one of each kind is pending
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gateway_client::{
//!     ClientConfig, ConnectionConfig, ConnectionManager, GatewayClient, PollingConfig,
//!     Result, StatusPoller,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Arc::new(GatewayClient::new(
//!         ClientConfig::default().with_base_url("http://localhost:8080"),
//!     )?);
//!
//!     // Poll agent status every 5 seconds
//!     let poller = StatusPoller::with_client(PollingConfig::default(), Arc::clone(&client));
//!     let _changes = poller.on_agent_update(|agent| {
//!         println!("{} -> {}", agent.name, agent.state);
//!     });
//!     poller.start();
//!
//!     // Live events over WebSocket
//!     let socket = ConnectionManager::new(ConnectionConfig::for_gateway(&client.base_url())?);
//!     let _alerts = socket.on("alert", |payload| println!("alert: {payload}"));
//!
//!     tokio::signal::ctrl_c().await.ok();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`connection`] | [`ConnectionManager`] and [`ConnectionState`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`observer`] | Subscriber registry and [`Subscription`] |
//! | [`poller`] | [`StatusPoller`] and change detection |
//! | [`protocol`] | Wire types: [`Envelope`], [`Agent`], [`StatusSnapshot`] |
//! | [`transport`] | [`GatewayClient`] and [`ClientConfig`] |

// ============================================================================
// Modules
// ============================================================================

/// Reconnecting WebSocket connection.
///
/// Use [`ConnectionManager::new`] with a [`ConnectionConfig`].
pub mod connection;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Subscriber bookkeeping shared by the connection and the poller.
pub mod observer;

/// Agent status polling.
pub mod poller;

/// Wire message types.
pub mod protocol;

/// HTTP transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Connection types
pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::SubscriptionId;

// Observer types
pub use observer::Subscription;

// Poller types
pub use poller::{AgentCache, PollingConfig, PollingConfigUpdate, StatusPoller, StatusSource};

// Protocol types
pub use protocol::{Agent, AgentState, Envelope, InboundMessage, OutboundMessage, StatusSnapshot};

// Transport types
pub use transport::{ApiResponse, ClientConfig, GatewayClient, Method, ResponseBody};
