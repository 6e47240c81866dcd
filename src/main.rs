//! Multi-room Chat Server - Entry Point
//!
//! Starts the TCP listener, the ChatServer actor and the room reaper, then
//! accepts connections.

use std::env;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chat_rooms::{spawn_reaper, ChatServer, Config, SessionManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_rooms=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_rooms=info")),
        )
        .init();

    let mut config = Config::from_env()?;

    // Bind address from command line overrides the configuration
    if let Some(addr) = env::args().nth(1) {
        config.listen_addr = addr;
    }

    // Start TCP listener
    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(
        "Chat server listening on {} (max {} clients)",
        config.listen_addr, config.max_clients
    );

    // Start ChatServer actor
    let (server, _actor) = ChatServer::start(&config);
    info!("ChatServer actor started");

    spawn_reaper(server.clone(), config.reap_interval());
    info!(
        "Room reaper started (every {:?}, retention {:?})",
        config.reap_interval(),
        config.room_retention()
    );

    SessionManager::new(server, &config).run(listener).await;
    Ok(())
}
