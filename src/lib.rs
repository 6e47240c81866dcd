//! Multi-room Chat Server Library
//!
//! A line-based TCP chat server built with tokio, using the Actor pattern
//! for state management.
//!
//! # Features
//! - Capacity-limited connection handling
//! - Unique display name per connection
//! - Named rooms: create, list, join, leave
//! - Chat fan-out within a room, with log replay for new joiners
//! - Reaping of rooms left empty beyond a retention window
//! - A terminal line client (`line_client`, `chat_client` binary)
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning clients and rooms
//! - Each connection runs a read task and a write task
//! - `SessionManager` accepts connections, the reaper sweeps idle rooms
//! - No locks on shared state - all access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use chat_rooms::{spawn_reaper, ChatServer, Config, SessionManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let listener = TcpListener::bind(&config.listen_addr).await.unwrap();
//!
//!     let (server, _actor) = ChatServer::start(&config);
//!     spawn_reaper(server.clone(), config.reap_interval());
//!
//!     SessionManager::new(server, &config).run(listener).await;
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod line_client;
pub mod manager;
pub mod message;
pub mod names;
pub mod reaper;
pub mod registry;
pub mod room;
pub mod router;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use client::Client;
pub use config::{Config, ConfigError, ValidationError};
pub use error::{AppError, SendError};
pub use handler::handle_connection;
pub use manager::SessionManager;
pub use message::{ClientMessage, ServerMessage};
pub use reaper::spawn_reaper;
pub use registry::RoomRegistry;
pub use room::{ChatMessage, Room};
pub use router::Router;
pub use server::{ChatServer, ServerCommand, ServerHandle, ServerSnapshot};
pub use session::{SessionControl, SessionState};
pub use types::{ClientId, RoomName};
