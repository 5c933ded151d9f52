//! Events carried over a player's persistent connection.
//!
//! Frames are JSON, adjacently tagged as `{"event": ..., "data": ...}` so
//! a browser client can switch on `event` and hand `data` to the matching
//! handler without inspecting its shape first.

use serde::{Deserialize, Serialize};

use crate::join::ErrorBody;
use crate::types::SessionCode;

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Present stored credentials to bind this connection to a player.
    /// Accepted at any time; everything else requires prior success here.
    #[serde(rename_all = "camelCase")]
    AuthRequest {
        game_code: SessionCode,
        name: String,
        key: String,
    },

    /// Rename the player bound to this connection.
    #[serde(rename_all = "camelCase")]
    ChangeName { new_name: String },

    /// Remove the named player (self-removal is how a player leaves).
    RemovalRequest { name: String },
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Something went wrong with the sender's last request. Domain errors
    /// arrive verbatim; unexpected errors arrive masked in production.
    MyError(ErrorBody),

    /// Snapshot of the session, pushed to the whole room after any change.
    GameStatus(StatusView),

    /// Confirms a rename to the requester only.
    #[serde(rename_all = "camelCase")]
    NameChanged { new_name: String },

    /// Tells the room a player was removed from the roster.
    RemovedPlayer { name: String },

    /// Sent to a removed player's own connection just before the server
    /// closes it.
    Kicked,
}

/// What a `gameStatus` push contains.
///
/// Untagged: the lobby form and the error form are distinguishable by
/// their fields alone, so no discriminant travels on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusView {
    /// The pre-game lobby view: who is seated, in join order.
    Lobby(LobbyStatus),

    /// Emitted in place of a snapshot when the store read failed; carries
    /// no detail so a transient backend fault leaks nothing to clients.
    Unavailable { error: String },
}

/// Roster snapshot while the session is still gathering players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbyStatus {
    pub playing: bool,
    pub players: Vec<RosterEntry>,
}

/// One seat in the lobby roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub order: u32,
}
