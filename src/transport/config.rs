//! HTTP client configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use gateway_client::ClientConfig;
//!
//! let config = ClientConfig::new()
//!     .with_base_url("https://gateway.internal:8443")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_bearer_token("s3cr3t");
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Gateway base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Per-request deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ClientConfig
// ============================================================================

/// Configuration for [`super::GatewayClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,

    /// Deadline covering send and body read.
    pub timeout: Duration,

    /// Extra headers, keyed by lowercase name. Merged over the default
    /// `Content-Type: application/json`.
    pub headers: FxHashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: DEFAULT_TIMEOUT,
            headers: FxHashMap::default(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl ClientConfig {
    /// Creates a configuration with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-request timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header, replacing any previous value for the same name.
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Adds `Authorization: Bearer <token>`.
    #[inline]
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.set_bearer_token(token);
        self
    }
}

// ============================================================================
// Mutation
// ============================================================================

impl ClientConfig {
    /// Inserts or replaces a header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Inserts or replaces the bearer token.
    pub fn set_bearer_token(&mut self, token: impl AsRef<str>) {
        self.set_header(
            AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        );
    }
}

// ============================================================================
// Request Helpers
// ============================================================================

impl ClientConfig {
    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.is_empty() || path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Builds the header map for one request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a configured header name or value is
    /// not valid HTTP.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::config(format!("invalid header name '{name}': {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::config(format!("invalid value for header '{name}': {e}")))?;
            headers.insert(header_name, header_value);
        }

        Ok(headers)
    }

    /// Returns the timeout in whole milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

// ============================================================================
// Tests
// ============================================================================
