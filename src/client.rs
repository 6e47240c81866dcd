//! Client struct definition
//!
//! Represents a connected client with their state and outbound mailbox.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::session::SessionControl;
use crate::types::{ClientId, RoomName};

/// Connected client information
///
/// Holds all state related to a connected client including their
/// unique ID, display name, mailbox, and current room.
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this client
    pub id: ClientId,
    /// Display name, fixed for the session
    pub name: String,
    /// Server → Client mailbox, drained by the session's write path
    pub sender: mpsc::UnboundedSender<ServerMessage>,
    /// Room this client is a member of, if any
    pub current_room: Option<RoomName>,
    /// Close signal shared with the session's I/O paths
    pub session: Arc<SessionControl>,
}

impl Client {
    /// Create a new client with the given ID, name and mailbox
    pub fn new(
        id: ClientId,
        name: String,
        sender: mpsc::UnboundedSender<ServerMessage>,
        session: Arc<SessionControl>,
    ) -> Self {
        Self {
            id,
            name,
            sender,
            current_room: None,
            session,
        }
    }

    /// Queue a line for this client
    ///
    /// Returns an error if the mailbox is closed (client disconnected).
    pub fn send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.send(msg).map_err(|_| SendError::ChannelClosed)
    }

    /// Check whether this client is in the given room
    pub fn is_in(&self, room: &RoomName) -> bool {
        self.current_room.as_ref() == Some(room)
    }
}
