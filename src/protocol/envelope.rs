//! Envelope and frame types for the persistent connection.
//!
//! # Format
//!
//! ```json
//! {
//!   "type": "agent.status",
//!   "payload": { ... },
//!   "timestamp": 1718000000000
//! }
//! ```

// ============================================================================
// Imports
// ============================================================================

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;

// ============================================================================
// Envelope
// ============================================================================

/// Tagged application message exchanged over the connection.
///
/// `payload` is opaque to the connection manager; `kind` selects which
/// typed subscribers receive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Message type used for routing.
    #[serde(rename = "type")]
    pub kind: String,

    /// Application payload.
    pub payload: T,

    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl<T> Envelope<T> {
    /// Wraps `payload` with the current time.
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: T) -> Self {
        Self {
            kind: kind.into(),
            payload,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

// ============================================================================
// InboundMessage
// ============================================================================

/// An inbound frame as delivered to generic subscribers.
///
/// Text frames are parsed as JSON when possible; anything else is passed
/// through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Text frame holding valid JSON.
    Json(Value),
    /// Text frame that is not JSON.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl InboundMessage {
    /// Parses a text frame.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text.to_owned()),
        }
    }

    /// Returns the routing type if this is a JSON object with a string
    /// `type` field.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.get("type").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Returns the `payload` field, or `Null` when absent.
    #[must_use]
    pub fn payload(&self) -> &Value {
        match self {
            Self::Json(value) => value.get("payload").unwrap_or(&Value::Null),
            _ => &Value::Null,
        }
    }

    /// Returns the parsed JSON value, if any.
    #[inline]
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Decodes the frame as a typed [`Envelope`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if the frame is not a valid envelope.
    pub fn to_envelope<T: for<'de> Deserialize<'de>>(&self) -> Result<Envelope<T>> {
        let value = match self {
            Self::Json(value) => value.clone(),
            Self::Text(text) => Value::String(text.clone()),
            Self::Binary(_) => Value::Null,
        };
        Ok(serde_json::from_value(value)?)
    }
}

// ============================================================================
// OutboundMessage
// ============================================================================

/// A raw outbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// Sent verbatim as a text frame.
    Text(String),
    /// Serialized to JSON before sending.
    Json(Value),
}

impl OutboundMessage {
    /// Default heartbeat payload: `{"type":"ping"}`.
    #[must_use]
    pub fn ping() -> Self {
        Self::Json(json!({ "type": "ping" }))
    }

    /// Renders the frame text.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<String> for OutboundMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for OutboundMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Value> for OutboundMessage {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
