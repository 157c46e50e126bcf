//! Persistent WebSocket connection layer.
//!
//! This module keeps one duplex connection to the gateway alive and fans
//! inbound frames out to subscribers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐                       ┌─────────────────┐
//! │  ConnectionManager   │        WebSocket      │                 │
//! │                      │◄─────────────────────►│    Gateway      │
//! │  state machine       │   Envelope frames     │    /ws          │
//! │  heartbeat           │                       │                 │
//! │  reconnect timer     │                       │                 │
//! └──────────┬───────────┘                       └─────────────────┘
//!            │ on / on_message / on_state_change
//!            ▼
//!       subscribers
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `config` | [`ConnectionConfig`] and defaults |
//! | `manager` | [`ConnectionManager`] and its event loop |
//! | `state` | [`ConnectionState`] |

// ============================================================================
// Submodules
// ============================================================================

/// Connection configuration.
pub mod config;

/// Connection manager and event loop.
pub mod manager;

/// Connection states.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{
    ConnectionConfig, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_MAX_RECONNECT_ATTEMPTS,
    DEFAULT_RECONNECT_INTERVAL,
};
pub use manager::{ConnectionManager, MessageHandler, PayloadHandler, StateHandler};
pub use state::ConnectionState;
