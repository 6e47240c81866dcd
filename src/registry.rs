//! Room registry
//!
//! Authoritative map from room name to `Room`. Owned by the `ChatServer`
//! actor, so every operation here runs without interleaving.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::AppError;
use crate::room::Room;
use crate::types::{ClientId, RoomName};

/// All rooms, keyed by exact name
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomName, Room>,
    /// Insertion order, for `list`
    order: Vec<RoomName>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room, failing if the name is taken
    pub fn create(&mut self, name: RoomName, creator: ClientId) -> Result<&Room, AppError> {
        if self.rooms.contains_key(&name) {
            return Err(AppError::RoomNameInUse(name.0));
        }

        self.order.push(name.clone());
        let room: &Room = self
            .rooms
            .entry(name.clone())
            .or_insert_with(|| Room::new(name, creator));
        Ok(room)
    }

    pub fn lookup(&self, name: &RoomName) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn lookup_mut(&mut self, name: &RoomName) -> Option<&mut Room> {
        self.rooms.get_mut(name)
    }

    /// Snapshot of room names in creation order
    pub fn list(&self) -> Vec<RoomName> {
        self.order.clone()
    }

    /// Remove a room if present
    pub fn remove(&mut self, name: &RoomName) -> Option<Room> {
        let room = self.rooms.remove(name)?;
        self.order.retain(|n| n != name);
        Some(room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterate over all rooms, in no particular order
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Remove every room that is empty and idle beyond `retention`
    ///
    /// Returns the names removed, in creation order.
    pub fn reap_idle(&mut self, now: Instant, retention: Duration) -> Vec<RoomName> {
        let idle: Vec<RoomName> = self
            .order
            .iter()
            .filter(|name| {
                self.rooms
                    .get(*name)
                    .is_some_and(|room| room.is_idle(now, retention))
            })
            .cloned()
            .collect();

        for name in &idle {
            self.remove(name);
            debug!("Room {} removed from registry", name);
        }
        idle
    }
}
