//! HTTP transport layer.
//!
//! This module issues request/response exchanges against the gateway API
//! and translates every failure into a structured [`crate::Error`].
//!
//! # Error Translation
//!
//! | Outcome | Error | Code | Status |
//! |---------|-------|------|--------|
//! | Deadline exceeded | `Timeout` | `TIMEOUT` | 408 |
//! | DNS / refused / reset | `Network` | `NETWORK_ERROR` | 0 |
//! | Non-2xx response | `Http` | body `code` or `HTTP_<status>` | response status |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | [`GatewayClient`] and response types |
//! | `config` | [`ClientConfig`] |

// ============================================================================
// Submodules
// ============================================================================

/// HTTP client.
pub mod client;

/// HTTP client configuration.
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{ApiResponse, GatewayClient, ResponseBody};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use reqwest::Method;
