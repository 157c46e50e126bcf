//! Periodic agent status polling.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `cache` | [`AgentCache`] and change detection |
//! | `config` | [`PollingConfig`] and [`PollingConfigUpdate`] |
//! | `poller` | [`StatusPoller`] |
//! | `source` | [`StatusSource`] seam and the HTTP implementation |

// ============================================================================
// Submodules
// ============================================================================

/// Last-known agents and change detection.
pub mod cache;

/// Poller configuration.
pub mod config;

/// The poller.
#[allow(clippy::module_inception)]
pub mod poller;

/// Snapshot sources.
pub mod source;

// ============================================================================
// Re-exports
// ============================================================================

pub use cache::AgentCache;
pub use config::{
    DEFAULT_ERROR_RETRY_INTERVAL, DEFAULT_MAX_RETRIES, DEFAULT_POLL_INTERVAL, PollingConfig,
    PollingConfigUpdate,
};
pub use poller::{AgentHandler, StatusHandler, StatusPoller};
pub use source::{STATUS_PATH, StatusSource};
