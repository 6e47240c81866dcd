//! ChatServer Actor implementation
//!
//! The central actor that owns all shared state: connected clients, the room
//! registry, and every room's members and log. Sessions, the accept loop and
//! the reaper reach it only through `ServerHandle`, so commands are applied
//! one at a time and membership stays consistent between them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::Client;
use crate::config::Config;
use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage, HELP_TEXT};
use crate::names::NameGenerator;
use crate::registry::RoomRegistry;
use crate::room::ChatMessage;
use crate::router::Router;
use crate::session::SessionControl;
use crate::types::{ClientId, RoomName};

/// Channel buffer size for server commands
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Commands sent to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection asking to be registered
    Connect {
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
        session: Arc<SessionControl>,
        reply: oneshot::Sender<Result<String, AppError>>,
    },
    /// One line read from a client
    Line { client_id: ClientId, line: String },
    /// Session ended; leave room and deregister
    Disconnect { client_id: ClientId },
    /// Remove empty rooms idle as of `now`
    ReapIdle {
        now: Instant,
        reply: oneshot::Sender<Vec<RoomName>>,
    },
    /// Read-only view of the current state
    Snapshot { reply: oneshot::Sender<ServerSnapshot> },
}

/// Point-in-time view of the server state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSnapshot {
    /// Number of registered clients
    pub clients: usize,
    /// Rooms in creation order, each with member names in join order
    pub rooms: Vec<(RoomName, Vec<String>)>,
}

impl ServerSnapshot {
    pub fn room_names(&self) -> Vec<String> {
        self.rooms.iter().map(|(name, _)| name.0.clone()).collect()
    }

    pub fn members_of(&self, room: &str) -> Option<&[String]> {
        self.rooms
            .iter()
            .find(|(name, _)| name.as_str() == room)
            .map(|(_, members)| members.as_slice())
    }
}

/// Cloneable sender side of the ChatServer actor
#[derive(Debug, Clone)]
pub struct ServerHandle {
    sender: mpsc::Sender<ServerCommand>,
}

impl ServerHandle {
    pub fn new(sender: mpsc::Sender<ServerCommand>) -> Self {
        Self { sender }
    }

    async fn send(&self, cmd: ServerCommand) -> Result<(), AppError> {
        self.sender.send(cmd).await.map_err(|_| AppError::ChannelSend)
    }

    /// Register a connection; returns its display name
    pub async fn connect(
        &self,
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
        session: Arc<SessionControl>,
    ) -> Result<String, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerCommand::Connect {
            client_id,
            sender,
            session,
            reply,
        })
        .await?;
        rx.await.map_err(|_| AppError::ChannelSend)?
    }

    /// Forward one client line
    pub async fn line(&self, client_id: ClientId, line: String) -> Result<(), AppError> {
        self.send(ServerCommand::Line { client_id, line }).await
    }

    /// Deregister a client; a no-op for unknown clients
    pub async fn disconnect(&self, client_id: ClientId) -> Result<(), AppError> {
        self.send(ServerCommand::Disconnect { client_id }).await
    }

    /// Run one reaper sweep as of `now`, returning the removed rooms
    pub async fn reap_idle(&self, now: Instant) -> Result<Vec<RoomName>, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerCommand::ReapIdle { now, reply }).await?;
        rx.await.map_err(|_| AppError::ChannelSend)
    }

    pub async fn snapshot(&self) -> Result<ServerSnapshot, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(ServerCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| AppError::ChannelSend)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The main ChatServer actor
///
/// Manages all state and processes commands from sessions, the accept loop
/// and the reaper.
pub struct ChatServer {
    /// All connected clients: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    /// All rooms
    registry: RoomRegistry,
    router: Router,
    names: NameGenerator,
    server_name: String,
    max_clients: usize,
    room_retention: Duration,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(config: &Config, receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            clients: HashMap::new(),
            registry: RoomRegistry::new(),
            router: Router::new(config.echo_to_sender),
            names: NameGenerator::new(),
            server_name: config.server_name.clone(),
            max_clients: config.max_clients,
            room_retention: config.room_retention(),
            receiver,
        }
    }

    /// Spawn the actor and return a handle to it
    pub fn start(config: &Config) -> (ServerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let server = ChatServer::new(config, rx);
        (ServerHandle::new(tx), tokio::spawn(server.run()))
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                client_id,
                sender,
                session,
                reply,
            } => {
                let result = self.handle_connect(client_id, sender, session);
                if reply.send(result).is_err() {
                    // Connection gave up before hearing back
                    self.handle_disconnect(client_id);
                }
            }
            ServerCommand::Line { client_id, line } => {
                self.handle_line(client_id, &line);
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id);
            }
            ServerCommand::ReapIdle { now, reply } => {
                let _ = reply.send(self.handle_reap(now));
            }
            ServerCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Handle new client connection
    fn handle_connect(
        &mut self,
        client_id: ClientId,
        sender: mpsc::UnboundedSender<ServerMessage>,
        session: Arc<SessionControl>,
    ) -> Result<String, AppError> {
        if self.clients.len() >= self.max_clients {
            info!(
                "Rejecting connection: {} of {} clients connected",
                self.clients.len(),
                self.max_clients
            );
            return Err(AppError::ServerFull);
        }

        let name = self.names.next_name();
        let client = Client::new(client_id, name.clone(), sender, session);
        Router::notify(&client, ServerMessage::welcome(&self.server_name, &name));
        self.clients.insert(client_id, client);

        info!("Client {} connected as {}", client_id, name);
        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.registry.len()
        );
        Ok(name)
    }

    /// Handle client disconnection
    ///
    /// Idempotent: unknown clients are ignored.
    fn handle_disconnect(&mut self, client_id: ClientId) {
        if !self.clients.contains_key(&client_id) {
            return;
        }

        self.leave_room(client_id);

        if let Some(client) = self.clients.remove(&client_id) {
            client.session.close();
            info!("Client {} ({}) disconnected", client_id, client.name);
        }

        debug!(
            "Total clients: {}, Total rooms: {}",
            self.clients.len(),
            self.registry.len()
        );
    }

    /// Parse one line and apply it
    fn handle_line(&mut self, client_id: ClientId, line: &str) {
        if !self.clients.contains_key(&client_id) {
            debug!("Line from unregistered client {} ignored", client_id);
            return;
        }

        let Some(msg) = ClientMessage::parse(line) else {
            return;
        };

        let result = match msg {
            ClientMessage::Help => {
                self.handle_help(client_id);
                Ok(())
            }
            ClientMessage::Quit => {
                self.handle_quit(client_id);
                Ok(())
            }
            ClientMessage::CreateRoom { name } => self.handle_create_room(client_id, name),
            ClientMessage::ListRooms => {
                self.handle_list_rooms(client_id);
                Ok(())
            }
            ClientMessage::Join { name } => self.handle_join(client_id, name),
            ClientMessage::CurrentRoom => self.handle_current_room(client_id),
            ClientMessage::CurrentUsers => self.handle_current_users(client_id),
            ClientMessage::LeaveRoom => {
                self.leave_room(client_id);
                self.notify(client_id, ServerMessage::info("You have left the room"));
                Ok(())
            }
            ClientMessage::Unknown { verb } => Err(AppError::UnknownCommand(verb)),
            ClientMessage::Chat { text } => self.handle_chat(client_id, text),
        };

        if let Err(err) = result {
            debug!("Command from {} rejected: {}", client_id, err);
            self.notify(client_id, err.into());
        }
    }

    fn handle_help(&self, client_id: ClientId) {
        for line in HELP_TEXT {
            self.notify(client_id, ServerMessage::info(*line));
        }
    }

    fn handle_quit(&mut self, client_id: ClientId) {
        self.leave_room(client_id);
        self.notify(client_id, ServerMessage::info("Goodbye"));
        self.handle_disconnect(client_id);
    }

    /// Handle room creation; the creator is not auto-joined
    fn handle_create_room(
        &mut self,
        client_id: ClientId,
        name: Option<String>,
    ) -> Result<(), AppError> {
        let name = RoomName::new(name.ok_or(AppError::MissingRoomName)?);
        self.registry.create(name.clone(), client_id)?;

        info!("Client {} created room {}", client_id, name);
        self.notify(client_id, ServerMessage::info(format!("Created room {}", name)));
        Ok(())
    }

    fn handle_list_rooms(&self, client_id: ClientId) {
        self.notify(client_id, ServerMessage::info("List of rooms:"));
        for name in self.registry.list() {
            self.notify(client_id, ServerMessage::Plain(name.0));
        }
        self.notify(client_id, ServerMessage::Plain(String::new()));
    }

    fn handle_join(&mut self, client_id: ClientId, name: Option<String>) -> Result<(), AppError> {
        let name = RoomName::new(name.ok_or(AppError::MissingRoomName)?);
        self.join_room(client_id, name)
    }

    fn handle_current_room(&self, client_id: ClientId) -> Result<(), AppError> {
        let room = self.current_room_of(client_id)?;
        self.notify(client_id, ServerMessage::info(format!("current room: {}", room)));
        Ok(())
    }

    fn handle_current_users(&self, client_id: ClientId) -> Result<(), AppError> {
        let name = self.current_room_of(client_id)?;
        let Some(room) = self.registry.lookup(&name) else {
            warn!("Client {} points at missing room {}", client_id, name);
            return Err(AppError::NotInRoom);
        };

        self.notify(client_id, ServerMessage::info(format!("Users in {}:", name)));
        for member_id in room.members() {
            if let Some(member) = self.clients.get(member_id) {
                self.notify(client_id, ServerMessage::Plain(member.name.clone()));
            }
        }
        self.notify(client_id, ServerMessage::Plain(String::new()));
        Ok(())
    }

    /// Handle chat message
    fn handle_chat(&mut self, client_id: ClientId, text: String) -> Result<(), AppError> {
        let name = self.current_room_of(client_id)?;
        let Some(client) = self.clients.get(&client_id) else {
            return Ok(());
        };
        let Some(room) = self.registry.lookup_mut(&name) else {
            warn!("Client {} points at missing room {}", client_id, name);
            return Err(AppError::NotInRoom);
        };

        let message = ChatMessage::new(client_id, client.name.clone(), text);
        let delivered = self.router.broadcast(room, &self.clients, message);
        debug!("Chat in {} delivered to {} members", name, delivered);
        Ok(())
    }

    /// Move a client into a room, leaving any prior room first
    ///
    /// Joining a room the client is already in is a no-op.
    fn join_room(&mut self, client_id: ClientId, name: RoomName) -> Result<(), AppError> {
        let Some(room) = self.registry.lookup(&name) else {
            return Err(AppError::RoomNotFound(name.0));
        };
        if room.contains(client_id) {
            return Ok(());
        }

        self.leave_room(client_id);

        let Some(client) = self.clients.get_mut(&client_id) else {
            return Ok(());
        };
        let Some(room) = self.registry.lookup_mut(&name) else {
            return Err(AppError::RoomNotFound(name.0));
        };
        room.add_member(client_id);
        client.current_room = Some(name.clone());
        let username = client.name.clone();

        info!("Client {} joined room {}", username, name);

        self.router
            .announce(room, &self.clients, ServerMessage::joined(&username));
        if let Some(client) = self.clients.get(&client_id) {
            self.router.replay(room, client);
        }
        Ok(())
    }

    /// Remove a client from its current room
    ///
    /// The leave notice goes out before removal, so the leaver sees it too.
    /// Returns false if the client was in no room.
    fn leave_room(&mut self, client_id: ClientId) -> bool {
        let Some(client) = self.clients.get(&client_id) else {
            return false;
        };
        let Some(name) = client.current_room.clone() else {
            return false;
        };
        let username = client.name.clone();

        match self.registry.lookup_mut(&name) {
            Some(room) => {
                self.router
                    .announce(room, &self.clients, ServerMessage::left(&username));
                if !room.remove_member(client_id) {
                    warn!("Client {} was not listed in room {}", username, name);
                }
            }
            None => warn!("Client {} points at missing room {}", username, name),
        }

        if let Some(client) = self.clients.get_mut(&client_id) {
            client.current_room = None;
        }
        info!("Client {} left room {}", username, name);
        true
    }

    /// Remove rooms that are empty and idle as of `now`
    fn handle_reap(&mut self, now: Instant) -> Vec<RoomName> {
        let reaped = self.registry.reap_idle(now, self.room_retention);
        for name in &reaped {
            info!("Reaped idle room {}", name);
        }
        reaped
    }

    fn snapshot(&self) -> ServerSnapshot {
        let rooms: Vec<(RoomName, Vec<String>)> = self
            .registry
            .list()
            .into_iter()
            .map(|name| {
                let members = self
                    .registry
                    .lookup(&name)
                    .map(|room| {
                        room.members()
                            .iter()
                            .filter_map(|id| self.clients.get(id).map(|c| c.name.clone()))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default();
                (name, members)
            })
            .collect();

        ServerSnapshot {
            clients: self.clients.len(),
            rooms,
        }
    }

    /// Helper: Get the current room of a client or `NotInRoom`
    fn current_room_of(&self, client_id: ClientId) -> Result<RoomName, AppError> {
        self.clients
            .get(&client_id)
            .and_then(|c| c.current_room.clone())
            .ok_or(AppError::NotInRoom)
    }

    /// Helper: Queue a line for one client
    fn notify(&self, client_id: ClientId, msg: ServerMessage) {
        if let Some(client) = self.clients.get(&client_id) {
            Router::notify(client, msg);
        }
    }

    /// Check that `current_room` and room membership agree everywhere
    #[cfg(test)]
    fn membership_consistent(&self) -> bool {
        let clients_ok = self.clients.values().all(|client| match &client.current_room {
            Some(name) => self
                .registry
                .lookup(name)
                .is_some_and(|room| room.contains(client.id)),
            None => self.registry.rooms().all(|room| !room.contains(client.id)),
        });
        let rooms_ok = self.registry.rooms().all(|room| {
            room.members().iter().all(|id| {
                self.clients
                    .get(id)
                    .is_some_and(|client| client.is_in(&room.name))
            })
        });
        clients_ok && rooms_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestClient {
        id: ClientId,
        name: String,
        rx: mpsc::UnboundedReceiver<ServerMessage>,
        session: Arc<SessionControl>,
    }

    impl TestClient {
        fn drain(&mut self) -> Vec<String> {
            let mut lines = Vec::new();
            while let Ok(msg) = self.rx.try_recv() {
                lines.push(msg.to_string());
            }
            lines
        }
    }

    fn test_server(config: Config) -> ChatServer {
        let (_tx, rx) = mpsc::channel(1);
        ChatServer::new(&config, rx)
    }

    fn connect(server: &mut ChatServer) -> TestClient {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ClientId::new();
        let session = Arc::new(SessionControl::new());
        let name = server.handle_connect(id, tx, session.clone()).unwrap();
        let mut client = TestClient {
            id,
            name,
            rx,
            session,
        };
        client.drain();
        client
    }

    fn send(server: &mut ChatServer, client: &TestClient, line: &str) {
        server.handle_line(client.id, line);
        assert!(server.membership_consistent());
    }

    #[test]
    fn test_welcome_line() {
        let mut server = test_server(Config::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let name = server
            .handle_connect(ClientId::new(), tx, Arc::new(SessionControl::new()))
            .unwrap();

        assert_eq!(
            rx.try_recv().unwrap().to_string(),
            format!(
                "Server says: Welcome to the Server, Your username for this session is: {}",
                name
            )
        );
    }

    #[test]
    fn test_capacity_ceiling() {
        let mut server = test_server(Config {
            max_clients: 2,
            ..Config::default()
        });
        let a = connect(&mut server);
        let _b = connect(&mut server);

        let (tx, _rx) = mpsc::unbounded_channel();
        let rejected = server.handle_connect(ClientId::new(), tx, Arc::new(SessionControl::new()));
        assert!(matches!(rejected, Err(AppError::ServerFull)));
        assert_eq!(server.clients.len(), 2);

        server.handle_disconnect(a.id);
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(server
            .handle_connect(ClientId::new(), tx, Arc::new(SessionControl::new()))
            .is_ok());
    }

    #[test]
    fn test_create_room_does_not_join() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);

        send(&mut server, &a, "/createRoom lobby");
        assert_eq!(a.drain(), vec!["Server says: Created room lobby"]);
        assert!(server.clients[&a.id].current_room.is_none());
        assert!(server.registry.lookup(&RoomName::new("lobby")).unwrap().is_empty());
    }

    #[test]
    fn test_create_room_errors() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);

        send(&mut server, &a, "/createRoom");
        assert_eq!(a.drain(), vec!["Server says: You must specify a room name"]);

        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/createRoom lobby");
        assert_eq!(
            a.drain(),
            vec![
                "Server says: Created room lobby",
                "Server says: The room name you have specified is already in use",
            ]
        );
        assert_eq!(server.registry.len(), 1);
    }

    #[test]
    fn test_list_rooms() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);
        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/createRoom games");
        a.drain();

        send(&mut server, &a, "/listRooms");
        assert_eq!(
            a.drain(),
            vec!["Server says: List of rooms:", "lobby", "games", ""]
        );
    }

    #[test]
    fn test_join_errors() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);

        send(&mut server, &a, "/join");
        send(&mut server, &a, "/join nowhere");
        assert_eq!(
            a.drain(),
            vec![
                "Server says: You must specify a room name",
                "Server says: The room nowhere does not exist",
            ]
        );
        assert!(server.clients[&a.id].current_room.is_none());
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);
        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/join lobby");
        assert_eq!(
            a.drain(),
            vec![
                "Server says: Created room lobby",
                format!("{} says: CLIENT HAS JOINED THE ROOM", a.name).as_str(),
            ]
        );

        send(&mut server, &a, "/join lobby");
        assert!(a.drain().is_empty());
        assert_eq!(
            server.registry.lookup(&RoomName::new("lobby")).unwrap().member_count(),
            1
        );
    }

    #[test]
    fn test_switching_rooms() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);
        let mut b = connect(&mut server);
        send(&mut server, &a, "/createRoom one");
        send(&mut server, &a, "/createRoom two");
        send(&mut server, &a, "/join one");
        send(&mut server, &b, "/join one");
        a.drain();
        b.drain();

        let before = server.registry.lookup(&RoomName::new("one")).unwrap().last_activity();
        send(&mut server, &a, "/join two");

        let one = server.registry.lookup(&RoomName::new("one")).unwrap();
        let two = server.registry.lookup(&RoomName::new("two")).unwrap();
        assert!(!one.contains(a.id));
        assert!(two.contains(a.id));
        assert!(one.last_activity() >= before);
        assert_eq!(server.clients[&a.id].current_room, Some(RoomName::new("two")));

        let left = format!("{} says: CLIENT HAS LEFT THE ROOM", a.name);
        let joined = format!("{} says: CLIENT HAS JOINED THE ROOM", a.name);
        assert_eq!(b.drain(), vec![left.clone()]);
        assert_eq!(a.drain(), vec![left, joined]);
    }

    #[test]
    fn test_chat_requires_room() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);

        send(&mut server, &a, "hello");
        assert_eq!(a.drain(), vec!["Server says: You are not in a room yet"]);
    }

    #[test]
    fn test_chat_echo_policy() {
        for echo in [true, false] {
            let mut server = test_server(Config {
                echo_to_sender: echo,
                ..Config::default()
            });
            let mut a = connect(&mut server);
            let mut b = connect(&mut server);
            send(&mut server, &a, "/createRoom lobby");
            send(&mut server, &a, "/join lobby");
            send(&mut server, &b, "/join lobby");
            a.drain();
            b.drain();

            send(&mut server, &b, "hello");
            let expected = format!("{} says: hello", b.name);
            assert_eq!(a.drain(), vec![expected.clone()]);
            if echo {
                assert_eq!(b.drain(), vec![expected]);
            } else {
                assert!(b.drain().is_empty());
            }
        }
    }

    #[test]
    fn test_join_replays_log() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);
        let mut b = connect(&mut server);
        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/join lobby");
        send(&mut server, &a, "first");
        send(&mut server, &a, "second");
        a.drain();

        send(&mut server, &b, "/join lobby");
        assert_eq!(
            b.drain(),
            vec![
                format!("{} says: CLIENT HAS JOINED THE ROOM", b.name),
                "Server says: ----- BEGINNING OF CHAT LOG -----".to_string(),
                format!("{} says: first", a.name),
                format!("{} says: second", a.name),
                "Server says: ----- END OF CHAT LOG -----".to_string(),
            ]
        );
        // Replay goes to the joiner only
        assert_eq!(
            a.drain(),
            vec![format!("{} says: CLIENT HAS JOINED THE ROOM", b.name)]
        );
    }

    #[test]
    fn test_current_room_and_users() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);
        let b = connect(&mut server);

        send(&mut server, &a, "/currentRoom");
        send(&mut server, &a, "/currentUsers");
        assert_eq!(
            a.drain(),
            vec![
                "Server says: You are not in a room yet",
                "Server says: You are not in a room yet",
            ]
        );

        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/join lobby");
        send(&mut server, &b, "/join lobby");
        a.drain();

        send(&mut server, &a, "/currentRoom");
        send(&mut server, &a, "/currentUsers");
        assert_eq!(
            a.drain(),
            vec![
                "Server says: current room: lobby".to_string(),
                "Server says: Users in lobby:".to_string(),
                a.name.clone(),
                b.name.clone(),
                String::new(),
            ]
        );
    }

    #[test]
    fn test_leave_room_always_confirms() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);

        send(&mut server, &a, "/leaveRoom");
        assert_eq!(a.drain(), vec!["Server says: You have left the room"]);

        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/join lobby");
        a.drain();
        send(&mut server, &a, "/leaveRoom");
        assert_eq!(
            a.drain(),
            vec![
                format!("{} says: CLIENT HAS LEFT THE ROOM", a.name),
                "Server says: You have left the room".to_string(),
            ]
        );
        assert!(server.clients[&a.id].current_room.is_none());
    }

    #[test]
    fn test_unknown_command_and_blank_line() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);

        send(&mut server, &a, "/dance");
        send(&mut server, &a, "   ");
        assert_eq!(
            a.drain(),
            vec!["Server says: Unknown command /dance, type /help for a list of commands"]
        );
    }

    #[test]
    fn test_help() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);

        send(&mut server, &a, "/help");
        let lines = a.drain();
        assert_eq!(lines.len(), HELP_TEXT.len());
        assert!(lines.iter().all(|l| l.starts_with("Server says: ")));
    }

    #[test]
    fn test_quit_cleans_up() {
        let mut server = test_server(Config::default());
        let mut a = connect(&mut server);
        let mut b = connect(&mut server);
        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/join lobby");
        send(&mut server, &b, "/join lobby");
        b.drain();

        send(&mut server, &a, "/quit");

        assert!(!server.clients.contains_key(&a.id));
        assert!(!server.registry.lookup(&RoomName::new("lobby")).unwrap().contains(a.id));
        assert!(!a.session.is_active());
        assert_eq!(
            b.drain(),
            vec![format!("{} says: CLIENT HAS LEFT THE ROOM", a.name)]
        );
        let a_lines = a.drain();
        assert_eq!(a_lines.last().map(String::as_str), Some("Server says: Goodbye"));

        // Disconnect after quit is a no-op
        server.handle_disconnect(a.id);
        assert_eq!(server.clients.len(), 1);
    }

    #[test]
    fn test_reap_idle_rooms() {
        let mut server = test_server(Config::default());
        let a = connect(&mut server);
        send(&mut server, &a, "/createRoom empty");
        send(&mut server, &a, "/createRoom busy");
        send(&mut server, &a, "/join busy");

        let later = Instant::now() + server.room_retention + Duration::from_secs(60);
        let reaped = server.handle_reap(later);

        assert_eq!(reaped, vec![RoomName::new("empty")]);
        assert_eq!(server.snapshot().room_names(), vec!["busy"]);

        // The reaped name can be created again
        send(&mut server, &a, "/createRoom empty");
        assert_eq!(server.registry.len(), 2);
    }

    #[test]
    fn test_snapshot() {
        let mut server = test_server(Config::default());
        let a = connect(&mut server);
        send(&mut server, &a, "/createRoom lobby");
        send(&mut server, &a, "/join lobby");

        let snapshot = server.snapshot();
        assert_eq!(snapshot.clients, 1);
        assert_eq!(snapshot.members_of("lobby"), Some(&[a.name.clone()][..]));
        assert!(snapshot.members_of("nope").is_none());
    }
}
