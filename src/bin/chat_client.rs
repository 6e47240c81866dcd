//! Line client for the chat server
//!
//! Reads lines from stdin and sends them to the server; prints every line
//! the server sends.

use std::env;

use tracing_subscriber::EnvFilter;

use chat_rooms::config::LISTEN_ADDR_ENV;
use chat_rooms::{line_client, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never mix with chat output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_rooms=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Server address: command line, then environment, then default
    let addr = env::args()
        .nth(1)
        .or_else(|| env::var(LISTEN_ADDR_ENV).ok())
        .unwrap_or_else(|| Config::default().listen_addr);

    line_client::run(&addr).await?;
    Ok(())
}
