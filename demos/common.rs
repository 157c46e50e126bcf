//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - Graceful exit handling

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing_subscriber::EnvFilter;

// ============================================================================
// Constants
// ============================================================================

/// Gateway used when `--url` is not given.
pub const DEFAULT_GATEWAY: &str = "http://localhost:8080";

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub url: String,
    /// Exit after this long instead of waiting for Ctrl+C.
    pub run_for: Option<Duration>,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Accepts `--debug`, `--url <base>` and `--seconds <n>`.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            url: value_of("--url").unwrap_or_else(|| DEFAULT_GATEWAY.to_owned()),
            run_for: value_of("--seconds")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "gateway_client=debug"
    } else {
        "gateway_client=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Wait for Ctrl+C, or for `run_for` if set.
pub async fn wait_for_exit(run_for: Option<Duration>) {
    match run_for {
        Some(duration) => {
            println!("[--seconds] Running for {}s", duration.as_secs());
            tokio::time::sleep(duration).await;
        }
        None => {
            println!("Press Ctrl+C to exit...");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}
