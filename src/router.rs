//! Message routing
//!
//! Fans chat lines out to room members' mailboxes and appends them to the
//! room log. Server-originated lines go to a single client and are never
//! logged.

use std::collections::HashMap;

use tracing::{debug, error};

use crate::client::Client;
use crate::message::{ServerMessage, LOG_END, LOG_START};
use crate::room::{ChatMessage, Room};
use crate::types::ClientId;

/// Delivers room traffic
#[derive(Debug, Clone, Copy)]
pub struct Router {
    /// Whether a sender receives its own chat line
    echo_to_sender: bool,
}

impl Router {
    pub fn new(echo_to_sender: bool) -> Self {
        Self { echo_to_sender }
    }

    /// Append `message` to the room log and deliver it to the members
    ///
    /// Members whose `current_room` no longer names this room are skipped.
    /// Returns the number of mailboxes the line was queued in.
    pub fn broadcast(
        &self,
        room: &mut Room,
        clients: &HashMap<ClientId, Client>,
        message: ChatMessage,
    ) -> usize {
        let sender_in_room = room.contains(message.sender)
            && clients
                .get(&message.sender)
                .is_some_and(|c| c.is_in(&room.name));
        if !sender_in_room {
            error!(
                "Dropped chat from {} to room {}: sender is not a member",
                message.sender, room.name
            );
            return 0;
        }

        let line = ServerMessage::Chat {
            from: message.sender_name.clone(),
            text: message.text.clone(),
        };
        let sender = message.sender;
        room.append(message);

        let mut delivered = 0;
        for member_id in room.members() {
            if *member_id == sender && !self.echo_to_sender {
                continue;
            }
            if self.deliver(room, clients, *member_id, line.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver a notice to every member without logging it
    pub fn announce(
        &self,
        room: &Room,
        clients: &HashMap<ClientId, Client>,
        notice: ServerMessage,
    ) -> usize {
        room.members()
            .iter()
            .filter(|id| self.deliver(room, clients, **id, notice.clone()))
            .count()
    }

    /// Send the room log to one client, bracketed by markers
    ///
    /// Sends nothing when the log is empty.
    pub fn replay(&self, room: &Room, client: &Client) {
        if room.log().is_empty() {
            return;
        }

        Self::notify(client, ServerMessage::info(LOG_START));
        for entry in room.log() {
            Self::notify(
                client,
                ServerMessage::Chat {
                    from: entry.sender_name.clone(),
                    text: entry.text.clone(),
                },
            );
        }
        Self::notify(client, ServerMessage::info(LOG_END));
    }

    /// Queue a line for one client
    pub fn notify(client: &Client, msg: ServerMessage) {
        if client.send(msg).is_err() {
            debug!("Mailbox closed for {}, line dropped", client.name);
        }
    }

    fn deliver(
        &self,
        room: &Room,
        clients: &HashMap<ClientId, Client>,
        member_id: ClientId,
        line: ServerMessage,
    ) -> bool {
        let Some(member) = clients.get(&member_id) else {
            error!("Room {} lists unknown client {}", room.name, member_id);
            return false;
        };
        if !member.is_in(&room.name) {
            debug!("Skipping {}: no longer in room {}", member.name, room.name);
            return false;
        }
        member.send(line).is_ok()
    }
}
