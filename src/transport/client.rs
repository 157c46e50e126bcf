//! HTTP client for the gateway API.
//!
//! Wraps `reqwest` with:
//!
//! - a configurable base URL and default headers
//! - a deadline applied to the whole exchange (send and body read)
//! - translation of every non-success outcome into a structured
//!   [`Error`]
//!
//! No retry logic lives here; callers decide how to recover.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};

use super::config::ClientConfig;

// ============================================================================
// Globals
// ============================================================================

/// Lazily constructed process-wide default client.
static SHARED: OnceLock<Arc<GatewayClient>> = OnceLock::new();

// ============================================================================
// ResponseBody
// ============================================================================

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Body of an `application/json` response. Empty bodies decode to `Null`.
    Json(Value),
    /// Any other content type.
    Text(String),
}

// ============================================================================
// ApiResponse
// ============================================================================

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse<T = ResponseBody> {
    /// Decoded body.
    pub data: T,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ApiResponse<ResponseBody> {
    /// Deserializes the body into `T`.
    ///
    /// Text bodies are offered to `T` as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<ApiResponse<T>> {
        let value = match self.data {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
        };

        Ok(ApiResponse {
            data: serde_json::from_value(value)?,
            status: self.status,
            headers: self.headers,
        })
    }
}

// ============================================================================
// GatewayClient
// ============================================================================

/// HTTP client for the gateway API.
///
/// Cheap to share behind an [`Arc`]; configuration changes made through
/// [`GatewayClient::set_base_url`] and [`GatewayClient::set_auth_token`]
/// apply to every request issued afterwards.
#[derive(Debug)]
pub struct GatewayClient {
    /// Underlying HTTP connection pool.
    http: reqwest::Client,
    /// Live configuration.
    config: RwLock<ClientConfig>,
}

// ============================================================================
// GatewayClient - Constructor
// ============================================================================

impl GatewayClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP backend cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %config.base_url, "Gateway client created");

        Ok(Self {
            http,
            config: RwLock::new(config),
        })
    }

    /// Returns the process-wide default client, creating it on first use.
    ///
    /// Prefer constructing a client explicitly and passing it where it is
    /// needed; this accessor exists for callers that want one default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the client cannot be constructed.
    pub fn shared() -> Result<Arc<Self>> {
        if let Some(client) = SHARED.get() {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(Self::new(ClientConfig::default())?);
        Ok(Arc::clone(SHARED.get_or_init(|| client)))
    }
}

// ============================================================================
// GatewayClient - Configuration
// ============================================================================

impl GatewayClient {
    /// Returns a copy of the current configuration.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        self.config.read().clone()
    }

    /// Returns the current base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.config.read().base_url.clone()
    }

    /// Replaces the base URL.
    pub fn set_base_url(&self, base_url: impl Into<String>) {
        let base_url = base_url.into();
        debug!(%base_url, "Base URL updated");
        self.config.write().base_url = base_url;
    }

    /// Sets `Authorization: Bearer <token>` on every subsequent request.
    pub fn set_auth_token(&self, token: impl AsRef<str>) {
        self.config.write().set_bearer_token(token);
        debug!("Auth token updated");
    }
}

// ============================================================================
// GatewayClient - Requests
// ============================================================================

impl GatewayClient {
    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(Method::GET, path, &[], None).await
    }

    /// Sends a GET request with URL-encoded query parameters.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn get_with_query(&self, path: &str, params: &[(&str, &str)]) -> Result<ApiResponse> {
        self.execute(Method::GET, path, params, None).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::POST, path, &[], Some(&body)).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::PUT, path, &[], Some(&body)).await
    }

    /// Sends a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.execute(Method::PATCH, path, &[], Some(&body)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`GatewayClient::request`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(Method::DELETE, path, &[], None).await
    }

    /// Sends a request and decodes the response.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the exchange exceeds the configured timeout
    /// - [`Error::Network`] on connection-level failure or a malformed JSON
    ///   response body
    /// - [`Error::Http`] on a non-2xx response
    /// - [`Error::Config`] if a configured header is invalid
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        self.execute(method, path, &[], body).await
    }

    /// Builds the request from the live configuration and runs it under
    /// the deadline.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let (url, headers, deadline, timeout_ms) = {
            let config = self.config.read();
            (
                config.url_for(path),
                config.header_map()?,
                config.timeout,
                config.timeout_ms(),
            )
        };

        let mut builder = self.http.request(method.clone(), &url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        trace!(%method, %url, "Sending request");

        match timeout(deadline, Self::exchange(builder)).await {
            Ok(result) => {
                if let Err(ref e) = result {
                    debug!(%method, %url, status = e.status(), code = e.code(), "Request failed");
                }
                result
            }
            Err(_) => {
                warn!(%method, %url, timeout_ms, "Request timed out");
                Err(Error::timeout(timeout_ms))
            }
        }
    }

    /// Sends the request and reads the response.
    async fn exchange(builder: RequestBuilder) -> Result<ApiResponse> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let is_json = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::network(e.to_string()))?;

        let data = if is_json {
            if bytes.is_empty() {
                ResponseBody::Json(Value::Null)
            } else {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| Error::network(format!("Invalid JSON response body: {e}")))?;
                ResponseBody::Json(value)
            }
        } else {
            ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(ApiResponse {
            data,
            status: status.as_u16(),
            headers,
        })
    }
}

// ============================================================================
// Error Translation
// ============================================================================

/// Builds an [`Error::Http`] from a non-2xx response.
///
/// `message`, `code` and `details` are taken from a JSON body when present;
/// otherwise message and code are synthesized from the status.
fn error_from_response(status: StatusCode, body: &[u8]) -> Error {
    let status = status.as_u16();
    let parsed = serde_json::from_slice::<Value>(body).ok();
    let field = |name: &str| parsed.as_ref().and_then(|value| value.get(name));

    let message = field("message")
        .and_then(Value::as_str)
        .map_or_else(|| format!("HTTP Error {status}"), str::to_owned);
    let code = field("code")
        .and_then(Value::as_str)
        .map_or_else(|| format!("HTTP_{status}"), str::to_owned);
    let details = field("details").cloned();

    Error::http(status, code, message, details)
}

// ============================================================================
// Tests
// ============================================================================
