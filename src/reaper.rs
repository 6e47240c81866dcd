//! Idle room reaper
//!
//! Background task that periodically asks the ChatServer to drop rooms that
//! are empty and have been idle longer than the retention window.

use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::server::ServerHandle;

/// Spawn the reaper; it stops when the ChatServer shuts down
pub fn spawn_reaper(server: ServerHandle, every: Duration) -> JoinHandle<()> {
    tokio::spawn(run_reaper(server, every))
}

async fn run_reaper(server: ServerHandle, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match server.reap_idle(Instant::now()).await {
            Ok(reaped) if !reaped.is_empty() => {
                debug!("Reaper removed {} rooms", reaped.len());
            }
            Ok(_) => {}
            Err(_) => {
                debug!("ChatServer closed, stopping reaper");
                break;
            }
        }
    }
}
