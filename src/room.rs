//! Room struct definition
//!
//! Represents a named chat room: its members, its activity timestamps and the
//! append-only log replayed to new joiners.

use std::time::{Duration, Instant};

use crate::types::{ClientId, RoomName};

/// One chat line as stored in a room log
///
/// Immutable once appended.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    /// Sending client
    pub sender: ClientId,
    /// Sender's display name at send time
    pub sender_name: String,
    /// Text payload, never contains a line terminator
    pub text: String,
    /// Creation time
    pub created_at: Instant,
}

impl ChatMessage {
    pub fn new(sender: ClientId, sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender,
            sender_name: sender_name.into(),
            text: text.into(),
            created_at: Instant::now(),
        }
    }
}

/// Multi-member chat room
///
/// The creator is recorded but is not automatically a member.
#[derive(Debug)]
pub struct Room {
    /// Registry key
    pub name: RoomName,
    /// Client that ran `createRoom`
    pub creator: ClientId,
    /// Room creation time
    pub created_at: Instant,
    /// Updated on every departure
    last_activity: Instant,
    /// Members in join order
    members: Vec<ClientId>,
    log: Vec<ChatMessage>,
}

impl Room {
    /// Create a new, empty room
    pub fn new(name: RoomName, creator: ClientId) -> Self {
        let now = Instant::now();
        Self {
            name,
            creator,
            created_at: now,
            last_activity: now,
            members: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Check if a client is in this room
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.contains(&client_id)
    }

    /// Add a member
    ///
    /// Returns false if the client was already a member.
    pub fn add_member(&mut self, client_id: ClientId) -> bool {
        if self.contains(client_id) {
            return false;
        }
        self.members.push(client_id);
        true
    }

    /// Remove a member and touch the last-activity time
    ///
    /// Returns false if the client was not a member.
    pub fn remove_member(&mut self, client_id: ClientId) -> bool {
        let before = self.members.len();
        self.members.retain(|id| *id != client_id);
        if self.members.len() == before {
            return false;
        }
        self.last_activity = Instant::now();
        true
    }

    pub fn members(&self) -> &[ClientId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Append to the log
    pub fn append(&mut self, message: ChatMessage) {
        self.log.push(message);
    }

    pub fn log(&self) -> &[ChatMessage] {
        &self.log
    }

    /// Empty and untouched for longer than `retention` as of `now`
    pub fn is_idle(&self, now: Instant, retention: Duration) -> bool {
        self.is_empty() && now.saturating_duration_since(self.last_activity) > retention
    }
}
