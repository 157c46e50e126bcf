//! Agent status watch demonstration.
//!
//! Demonstrates:
//! - Building a gateway client
//! - One-off status fetch
//! - Interval polling with change notifications
//! - Per-agent subscription
//!
//! Usage:
//!   cargo run --example 001_status_watch
//!   cargo run --example 001_status_watch -- --url http://gateway:8080
//!   cargo run --example 001_status_watch -- --seconds 30 --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use common::Args;
use gateway_client::poller::StatusSource;
use gateway_client::{ClientConfig, GatewayClient, PollingConfig, Result, StatusPoller};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e} (code={}, status={})", e.code(), e.status());
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 001: Status Watch ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Creating client for {}...", args.url);
    let client = Arc::new(GatewayClient::new(
        ClientConfig::default()
            .with_base_url(&args.url)
            .with_timeout(Duration::from_secs(5)),
    )?);
    println!("        ✓ Client ready\n");

    // ========================================================================
    // One-off fetch
    // ========================================================================

    println!("[1] Fetching status once...");
    let snapshot = client.fetch_status().await?;
    println!("    ✓ {} agents reported", snapshot.total);
    for agent in &snapshot.agents {
        println!("      {:<16} {:<10} {}", agent.id, agent.state, agent.name);
    }
    println!();

    // ========================================================================
    // Polling
    // ========================================================================

    println!("[2] Polling every 2s...");
    let poller = StatusPoller::with_client(
        PollingConfig::default().with_interval(Duration::from_secs(2)),
        Arc::clone(&client),
    );

    let _status = poller.on_status_update(|agents, error| match error {
        Some(e) => println!("    ✗ poll failed: {e} ({} cached)", agents.len()),
        None => println!("    · {} agents", agents.len()),
    });

    let _changes = poller.on_agent_update(|agent| {
        println!("    ► {} is now {}", agent.name, agent.state);
    });

    if let Some(first) = snapshot.agents.first() {
        let id = first.id.clone();
        let _watch = poller.on_agent(first.id.clone(), move |agent| {
            println!("    ★ watched agent {id}: {}", agent.state);
        });
    }

    poller.start();
    common::wait_for_exit(args.run_for).await;
    poller.stop();

    println!("\n=== Done ===");
    Ok(())
}
