//! Where status snapshots come from.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tracing::trace;

use crate::error::Result;
use crate::protocol::StatusSnapshot;
use crate::transport::GatewayClient;

// ============================================================================
// Constants
// ============================================================================

/// Gateway endpoint serving the agent status snapshot.
pub const STATUS_PATH: &str = "/api/agents/status";

// ============================================================================
// StatusSource
// ============================================================================

/// Fetches one status snapshot.
///
/// [`GatewayClient`] is the production implementation; tests substitute
/// scripted sources.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the current snapshot.
    ///
    /// # Errors
    ///
    /// Any transport or decoding failure.
    async fn fetch_status(&self) -> Result<StatusSnapshot>;
}

#[async_trait]
impl StatusSource for GatewayClient {
    async fn fetch_status(&self) -> Result<StatusSnapshot> {
        let response = self.get(STATUS_PATH).await?;
        let snapshot = response.json::<StatusSnapshot>()?.data;
        trace!(agents = snapshot.agents.len(), "Fetched status snapshot");
        Ok(snapshot)
    }
}
