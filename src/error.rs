//! Error types for the gateway client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use gateway_client::{GatewayClient, Result};
//!
//! async fn example(client: &GatewayClient) -> Result<()> {
//!     let response = client.get("/api/health").await?;
//!     println!("status {}", response.status);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants | Code | Status |
//! |----------|----------|------|--------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] | `CONFIG_ERROR` | 0 |
//! | Transport | [`Error::Timeout`] | `TIMEOUT` | 408 |
//! | Transport | [`Error::Network`] | `NETWORK_ERROR` | 0 |
//! | Server | [`Error::Http`] | server code or `HTTP_<status>` | response status |
//! | External | [`Error::Json`], [`Error::WebSocket`] | `PARSE_ERROR` / `WEBSOCKET_ERROR` | 0 |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Constants
// ============================================================================

/// Code reported for requests that exceeded their deadline.
pub const TIMEOUT_CODE: &str = "TIMEOUT";

/// Code reported for connection-level failures.
pub const NETWORK_ERROR_CODE: &str = "NETWORK_ERROR";

/// HTTP-equivalent status reported for timeouts.
pub const TIMEOUT_STATUS: u16 = 408;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Every variant maps onto a numeric status and a machine code, see
/// [`Error::status`] and [`Error::code`].
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client, connection or poller configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// Request exceeded the configured deadline.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    /// Connection-level failure (DNS, refused, reset, aborted).
    #[error("Network error: {message}")]
    Network {
        /// Description of the network failure.
        message: String,
    },

    // ========================================================================
    // Server Errors
    // ========================================================================
    /// Non-2xx response from the gateway.
    ///
    /// `code` comes from the response body when present, otherwise it is
    /// synthesized as `HTTP_<status>`.
    #[error("{message} (status {status}, code {code})")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
        /// Extra details supplied by the server.
        details: Option<Value>,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    /// Creates a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates an HTTP error with an explicit code.
    #[inline]
    pub fn http(
        status: u16,
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<Value>,
    ) -> Self {
        Self::Http {
            status,
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Creates an HTTP error from a status alone.
    ///
    /// Message and code are synthesized from the status.
    #[inline]
    pub fn http_status(status: u16) -> Self {
        Self::http(
            status,
            format!("HTTP_{status}"),
            format!("HTTP Error {status}"),
            None,
        )
    }
}

// ============================================================================
// Error Accessors
// ============================================================================

impl Error {
    /// Returns the HTTP-equivalent status of this error.
    ///
    /// `408` for timeouts, the response status for HTTP errors, `0` for
    /// everything that never produced a response.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Timeout { .. } => TIMEOUT_STATUS,
            Self::Http { status, .. } => *status,
            _ => 0,
        }
    }

    /// Returns the machine-readable code of this error.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Config { .. } | Self::InvalidUrl(_) => "CONFIG_ERROR",
            Self::Timeout { .. } => TIMEOUT_CODE,
            Self::Network { .. } => NETWORK_ERROR_CODE,
            Self::Http { code, .. } => code,
            Self::Json(_) => "PARSE_ERROR",
            Self::WebSocket(_) => "WEBSOCKET_ERROR",
        }
    }

    /// Returns server-supplied details, if any.
    #[inline]
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Http { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::WebSocket(_))
    }

    /// Returns `true` if the server answered with a non-2xx status.
    #[inline]
    #[must_use]
    pub fn is_http_error(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
