//! Lenient timestamp decoding.
//!
//! Gateways report times either as epoch milliseconds (integer, float or
//! numeric string) or as an RFC 3339 string. A value that is missing,
//! `null` or unparseable decodes to `None` rather than failing the
//! enclosing message; serialization always produces RFC 3339.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

// ============================================================================
// Serde Hooks
// ============================================================================

/// Serializes as RFC 3339 with millisecond precision, or `null`.
pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(at) => serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

/// Decodes any accepted form; anything else becomes `None`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let decoded = from_value(&value);

    if decoded.is_none() && !value.is_null() {
        warn!(%value, "Ignoring unparseable timestamp");
    }

    Ok(decoded)
}

/// Decodes epoch milliseconds with the same leniency, defaulting to `0`.
pub fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize(deserializer)?.map_or(0, |at| at.timestamp_millis()))
}

// ============================================================================
// Conversions
// ============================================================================

/// Converts epoch milliseconds to a UTC timestamp.
#[must_use]
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Parses the textual forms accepted on the wire.
#[must_use]
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(millis) = text.parse::<i64>() {
        return from_millis(millis);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Decodes a JSON number or string.
#[must_use]
pub fn from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|millis| millis.is_finite())
                    .map(|millis| millis.trunc() as i64)
            })
            .and_then(from_millis),
        Value::String(text) => parse(text),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
