//! Error types for the chat server
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
///
/// Covers both fatal errors (session termination) and
/// protocol-usage errors (reported to the offending client only).
#[derive(Debug, Error)]
pub enum AppError {
    /// Line framing error, including over-long lines (fatal)
    #[error("Line codec error: {0}")]
    Lines(#[from] tokio_util::codec::LinesCodecError),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Capacity ceiling reached, connection refused before registration
    #[error("Server full")]
    ServerFull,

    /// A room command was given without its name argument
    #[error("Missing room name")]
    MissingRoomName,

    /// `createRoom` with a name that is already registered
    #[error("Room name in use: {0}")]
    RoomNameInUse(String),

    /// Room not found with the given name
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Client is not in any room
    #[error("Not in room")]
    NotInRoom,

    /// Command verb that the server does not know
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,
}
