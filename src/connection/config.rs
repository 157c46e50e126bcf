//! Connection manager configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use gateway_client::ConnectionConfig;
//!
//! let config = ConnectionConfig::for_gateway("https://gateway.internal")?
//!     .with_reconnect_interval(Duration::from_secs(2))
//!     .with_auto_connect(false);
//! assert_eq!(config.url, "wss://gateway.internal/ws");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::OutboundMessage;

// ============================================================================
// Constants
// ============================================================================

/// Delay before each reconnect attempt.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(3);

/// Reconnect attempts allowed before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;

/// Interval between heartbeats while connected.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Reconnect delay used by [`ConnectionConfig::for_gateway`].
const GATEWAY_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Reconnect budget used by [`ConnectionConfig::for_gateway`].
const GATEWAY_MAX_RECONNECT_ATTEMPTS: u32 = 20;

/// Path of the gateway socket endpoint.
const GATEWAY_SOCKET_PATH: &str = "/ws";

// ============================================================================
// ConnectionConfig
// ============================================================================

/// Configuration for [`super::ConnectionManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// WebSocket URL (`ws://` or `wss://`).
    pub url: String,

    /// Subprotocols offered in `Sec-WebSocket-Protocol`.
    pub protocols: Vec<String>,

    /// Delay before each reconnect attempt.
    pub reconnect_interval: Duration,

    /// Reconnect attempts allowed before giving up.
    pub max_reconnect_attempts: u32,

    /// Heartbeat period. [`Duration::ZERO`] disables heartbeats.
    pub heartbeat_interval: Duration,

    /// Frame sent on every heartbeat.
    pub heartbeat_message: OutboundMessage,

    /// Connect as soon as the manager is created.
    pub auto_connect: bool,
}

// ============================================================================
// Constructors
// ============================================================================

impl ConnectionConfig {
    /// Creates a configuration for `url` with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            protocols: Vec::new(),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            heartbeat_message: OutboundMessage::ping(),
            auto_connect: true,
        }
    }

    /// Creates a configuration for the socket endpoint of a gateway.
    ///
    /// The socket URL is derived from the HTTP(S) base URL by swapping the
    /// scheme (`http` → `ws`, `https` → `wss`) and appending `/ws`.
    /// Reconnects every 5s, up to 20 attempts.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `base_url` does not parse
    /// - [`Error::Config`] if the scheme is not `http` or `https`
    pub fn for_gateway(base_url: &str) -> Result<Self> {
        let url = gateway_socket_url(base_url)?;

        Ok(Self::new(url)
            .with_reconnect_interval(GATEWAY_RECONNECT_INTERVAL)
            .with_max_reconnect_attempts(GATEWAY_MAX_RECONNECT_ATTEMPTS))
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ConnectionConfig {
    /// Adds a subprotocol.
    #[inline]
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Sets the reconnect delay.
    #[inline]
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Sets the reconnect budget.
    #[inline]
    #[must_use]
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Sets the heartbeat period. [`Duration::ZERO`] disables heartbeats.
    #[inline]
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the heartbeat frame.
    #[inline]
    #[must_use]
    pub fn with_heartbeat_message(mut self, message: impl Into<OutboundMessage>) -> Self {
        self.heartbeat_message = message.into();
        self
    }

    /// Enables or disables connecting on construction.
    #[inline]
    #[must_use]
    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }
}

// ============================================================================
// Handshake
// ============================================================================

impl ConnectionConfig {
    /// Returns `true` if heartbeats are enabled.
    #[inline]
    #[must_use]
    pub fn heartbeat_enabled(&self) -> bool {
        !self.heartbeat_interval.is_zero()
    }

    /// Builds the opening handshake request.
    pub(crate) fn client_request(&self) -> Result<Request> {
        let mut request = self.url.as_str().into_client_request()?;

        if !self.protocols.is_empty() {
            let value = HeaderValue::from_str(&self.protocols.join(", "))
                .map_err(|e| Error::config(format!("invalid subprotocol list: {e}")))?;
            request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
        }

        Ok(request)
    }
}

/// Derives the gateway socket URL from an HTTP(S) base URL.
fn gateway_socket_url(base_url: &str) -> Result<String> {
    let mut url = Url::parse(base_url)?;

    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => {
            return Err(Error::config(format!(
                "gateway URL must be http or https, got '{other}'"
            )));
        }
    };

    url.set_scheme(scheme)
        .map_err(|()| Error::config(format!("cannot use scheme '{scheme}' for {base_url}")))?;

    Ok(format!(
        "{}{GATEWAY_SOCKET_PATH}",
        url.as_str().trim_end_matches('/')
    ))
}

// ============================================================================
// Tests
// ============================================================================
