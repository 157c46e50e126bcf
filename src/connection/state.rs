//! Connection state machine states.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ConnectionState
// ============================================================================

/// State of a [`super::ConnectionManager`].
///
/// # Transitions
///
/// ```text
/// Disconnected | Error ──connect()──► Connecting ──open──► Connected
/// Connected ──clean close──► Disconnected
/// Connected | Connecting ──failure──► [Error ►] Disconnected ► Reconnecting
/// Reconnecting ──timer──► Connecting
/// any ──disconnect()──► Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Opening handshake in progress.
    Connecting,
    /// Socket open; frames flow in both directions.
    Connected,
    /// No socket and no pending reconnect (unless one is about to be
    /// scheduled).
    #[default]
    Disconnected,
    /// Waiting for the reconnect timer.
    Reconnecting,
    /// Socket-level failure observed.
    Error,
}

impl ConnectionState {
    /// Returns the state name.
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Reconnecting => "reconnecting",
            Self::Error => "error",
        }
    }

    /// Returns `true` while a connection is being established or retried.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
