//! Line protocol definitions
//!
//! Client → server lines are parsed into a closed `ClientMessage` enum in a
//! single step. Server → client lines are `ServerMessage` values rendered by
//! `Display`; the line codec appends the terminating `\n`.

use std::fmt;

use crate::error::AppError;

/// Prefix that marks a line as a command
pub const COMMAND_PREFIX: char = '/';

/// Sent on a connection refused at the capacity ceiling
pub const SERVER_FULL: &str = "SERVER FULL";

/// Broadcast body announcing a new room member
pub const JOINED_NOTICE: &str = "CLIENT HAS JOINED THE ROOM";

/// Broadcast body announcing a departing room member
pub const LEFT_NOTICE: &str = "CLIENT HAS LEFT THE ROOM";

/// Markers bracketing a log replay
pub const LOG_START: &str = "----- BEGINNING OF CHAT LOG -----";
pub const LOG_END: &str = "----- END OF CHAT LOG -----";

/// Lines sent in answer to `/help`
pub const HELP_TEXT: &[&str] = &[
    "help and command info:",
    "/help: use this command to get some help",
    "/quit: safely exit the system",
    "/createRoom roomName: creates a room with the name roomName",
    "/listRooms: lists all rooms available for joining",
    "/join roomName: leaves your current room and joins roomName",
    "/currentRoom: shows the room you are in",
    "/currentUsers: lists the users in your current room",
    "/leaveRoom: leaves your current room",
];

/// Client → Server line
///
/// Produced by [`ClientMessage::parse`]. Commands carry their first argument,
/// if any; extra arguments are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// Show the help text
    Help,
    /// Graceful disconnect
    Quit,
    /// Create a room (does not join it)
    CreateRoom { name: Option<String> },
    /// List all room names
    ListRooms,
    /// Move into a room
    Join { name: Option<String> },
    /// Report the current room
    CurrentRoom,
    /// List members of the current room
    CurrentUsers,
    /// Leave the current room
    LeaveRoom,
    /// A `/verb` the server does not know
    Unknown { verb: String },
    /// Plain chat for the current room
    Chat { text: String },
}

impl ClientMessage {
    /// Classify one raw line.
    ///
    /// Returns `None` for a line that is blank after trimming.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if !line.starts_with(COMMAND_PREFIX) {
            return Some(ClientMessage::Chat {
                text: line.to_string(),
            });
        }

        let mut tokens = line.split(' ');
        let verb = tokens.next().unwrap_or_default();
        let name = tokens
            .next()
            .filter(|arg| !arg.is_empty())
            .map(str::to_string);

        let msg = match verb {
            "/help" => ClientMessage::Help,
            "/quit" => ClientMessage::Quit,
            "/createRoom" => ClientMessage::CreateRoom { name },
            "/listRooms" => ClientMessage::ListRooms,
            "/join" => ClientMessage::Join { name },
            "/currentRoom" => ClientMessage::CurrentRoom,
            "/currentUsers" => ClientMessage::CurrentUsers,
            "/leaveRoom" => ClientMessage::LeaveRoom,
            other => ClientMessage::Unknown {
                verb: other.to_string(),
            },
        };
        Some(msg)
    }
}

/// Server → Client line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// Server-originated informational line, addressed to one client
    Info(String),
    /// Chat (or join/leave notice) attributed to a client
    Chat { from: String, text: String },
    /// Bare line, used for list entries
    Plain(String),
    /// Capacity rejection
    Rejected,
}

impl ServerMessage {
    pub fn info(text: impl Into<String>) -> Self {
        ServerMessage::Info(text.into())
    }

    pub fn welcome(server_name: &str, username: &str) -> Self {
        ServerMessage::Info(format!(
            "Welcome to {}, Your username for this session is: {}",
            server_name, username
        ))
    }

    pub fn joined(username: &str) -> Self {
        ServerMessage::Chat {
            from: username.to_string(),
            text: JOINED_NOTICE.to_string(),
        }
    }

    pub fn left(username: &str) -> Self {
        ServerMessage::Chat {
            from: username.to_string(),
            text: LEFT_NOTICE.to_string(),
        }
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Info(text) => write!(f, "Server says: {}", text),
            ServerMessage::Chat { from, text } => write!(f, "{} says: {}", from, text),
            ServerMessage::Plain(text) => f.write_str(text),
            ServerMessage::Rejected => f.write_str(SERVER_FULL),
        }
    }
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let text = match &err {
            AppError::NotInRoom => "You are not in a room yet".to_string(),
            AppError::MissingRoomName => "You must specify a room name".to_string(),
            AppError::RoomNameInUse(_) => {
                "The room name you have specified is already in use".to_string()
            }
            AppError::RoomNotFound(name) => format!("The room {} does not exist", name),
            AppError::UnknownCommand(verb) => {
                format!("Unknown command {}, type /help for a list of commands", verb)
            }
            AppError::ServerFull => return ServerMessage::Rejected,
            // Fatal errors are not typically converted (connection closes)
            _ => "Internal error".to_string(),
        };
        ServerMessage::Info(text)
    }
}
