//! Session manager
//!
//! Accept loop that turns incoming streams into client sessions. The
//! capacity ceiling is enforced by the ChatServer at registration time, so
//! the check and the insert cannot interleave with another connection.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::Config;
use crate::handler::handle_connection;
use crate::server::ServerHandle;

/// Accepts connections and spawns a session for each
#[derive(Debug, Clone)]
pub struct SessionManager {
    server: ServerHandle,
    max_line_length: usize,
}

impl SessionManager {
    pub fn new(server: ServerHandle, config: &Config) -> Self {
        Self {
            server,
            max_line_length: config.max_line_length,
        }
    }

    /// Connection accept loop
    ///
    /// Accept errors are logged and the loop keeps going. Returns once the
    /// ChatServer has shut down.
    pub async fn run(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    if self.server.is_closed() {
                        info!("ChatServer gone, stopping accept loop");
                        return;
                    }
                    info!("New connection from {}", addr);
                    self.accept_stream(stream, addr.to_string());
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Spawn a session for any bidirectional byte stream
    pub fn accept_stream<S>(&self, stream: S, peer: String) -> JoinHandle<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let server = self.server.clone();
        let max_line_length = self.max_line_length;

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, server, max_line_length).await {
                error!("Connection handler error ({}): {}", peer, e);
            }
        })
    }
}
