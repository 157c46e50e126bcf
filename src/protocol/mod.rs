//! Wire types shared by the transport, connection and poller layers.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Carried by |
//! |--------------|-----------|------------|
//! | `Envelope` | both | WebSocket text frame |
//! | `InboundMessage` | gateway → client | WebSocket frame (parsed or raw) |
//! | `OutboundMessage` | client → gateway | WebSocket text frame |
//! | `StatusSnapshot` | gateway → client | `GET /api/agents/status` |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `agent` | Agent, AgentState and StatusSnapshot |
//! | `envelope` | Envelope and frame wrappers |
//! | `timestamp` | Lenient `lastSeen` decoding |

// ============================================================================
// Submodules
// ============================================================================

/// Agent status types.
pub mod agent;

/// Envelope and frame wrappers.
pub mod envelope;

/// Lenient timestamp decoding.
pub mod timestamp;

// ============================================================================
// Re-exports
// ============================================================================

pub use agent::{Agent, AgentState, StatusSnapshot};
pub use envelope::{Envelope, InboundMessage, OutboundMessage};
