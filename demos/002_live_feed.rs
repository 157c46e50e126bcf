//! Live WebSocket feed demonstration.
//!
//! Demonstrates:
//! - Deriving the socket URL from the gateway base URL
//! - Watching connection state
//! - Typed subscriptions
//! - Sending enveloped messages
//!
//! Usage:
//!   cargo run --example 002_live_feed
//!   cargo run --example 002_live_feed -- --url https://gateway.internal
//!   cargo run --example 002_live_feed -- --seconds 60 --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::json;

use common::Args;
use gateway_client::{ConnectionConfig, ConnectionManager, ConnectionState, Result};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct Alert {
    level: String,
    message: String,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 002: Live Feed ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    let config = ConnectionConfig::for_gateway(&args.url)?.with_auto_connect(false);
    println!("[Setup] Socket URL: {}", config.url);

    let manager = ConnectionManager::new(config);

    // ========================================================================
    // Subscriptions
    // ========================================================================

    let _state = manager.on_state_change(|state| {
        let marker = match state {
            ConnectionState::Connected => "✓",
            ConnectionState::Error => "✗",
            _ => "·",
        };
        println!("    {marker} state: {state}");
    });

    let _alerts = manager.on_payload("alert", |alert: Alert| {
        println!("    ! [{}] {}", alert.level, alert.message);
    });

    let _pong = manager.on("pong", |_| println!("    ♥ pong"));

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[1] Connecting...");
    manager.connect();
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    if manager.send("subscribe", json!({ "channels": ["alerts", "agents"] })) {
        println!("    ✓ Subscription request sent");
    } else {
        println!("    ✗ Not connected yet, subscription skipped");
    }
    println!();

    common::wait_for_exit(args.run_for).await;

    manager.disconnect();
    println!("\n=== Done ===");
    Ok(())
}
