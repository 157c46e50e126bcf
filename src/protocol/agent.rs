//! Agent status types served by the gateway.
//!
//! # Format
//!
//! `GET /api/agents/status` returns:
//!
//! ```json
//! {
//!   "agents": [
//!     {
//!       "id": "agent-1",
//!       "name": "Indexer",
//!       "type": "worker",
//!       "state": "online",
//!       "lastSeen": "2024-05-01T12:00:00Z",
//!       "metadata": { "region": "eu" }
//!     }
//!   ],
//!   "total": 1,
//!   "timestamp": 1714564800000
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// AgentState
// ============================================================================

/// Reported state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    /// Connected and accepting work.
    Online,
    /// Not reachable.
    Offline,
    /// Processing work.
    Busy,
    /// Connected with nothing to do.
    Idle,
    /// Reporting a failure.
    Error,
}

impl AgentState {
    /// Returns the wire name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Busy => "busy",
            Self::Idle => "idle",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Agent
// ============================================================================

/// One agent as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Stable unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Agent kind.
    #[serde(rename = "type")]
    pub kind: String,

    /// Current state.
    pub state: AgentState,

    /// Last time the gateway heard from the agent; `None` when the gateway
    /// sends `null` or a value that is not a recognizable timestamp.
    #[serde(default, with = "super::timestamp")]
    pub last_seen: Option<DateTime<Utc>>,

    /// Opaque metadata. `null` decodes as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

impl Agent {
    /// Returns a copy of this agent with `state` replaced.
    #[inline]
    #[must_use]
    pub fn with_state(&self, state: AgentState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}

// ============================================================================
// StatusSnapshot
// ============================================================================

/// Result of one successful status poll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// All agents known to the gateway.
    pub agents: Vec<Agent>,

    /// Total agent count as reported by the gateway.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,

    /// Server time of the snapshot in epoch milliseconds.
    #[serde(default, deserialize_with = "super::timestamp::deserialize_millis")]
    pub timestamp: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Tests
// ============================================================================
