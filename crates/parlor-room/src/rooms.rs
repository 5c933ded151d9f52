//! Room membership: which connections hear a session's broadcasts.

use std::collections::HashMap;

use parlor_protocol::{ConnectionId, ServerEvent, SessionCode};
use tokio::sync::mpsc;

/// What a room can push down a member's outbound channel.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomOutbound {
    /// A frame for the client.
    Event(ServerEvent),
    /// The connection should be closed. Sent after `kicked` and when a
    /// whole room is torn down.
    Close,
}

/// Sender half of a member's outbound channel. The connection task owns
/// the receiver and forwards onto the socket.
pub type MemberSender = mpsc::UnboundedSender<RoomOutbound>;

/// Membership table for every live room.
///
/// Owned by the server behind a `tokio::sync::Mutex`; the methods here
/// never block and never touch the store. A member whose receiver is gone
/// (task already exited) is silently skipped — delivery to a closing
/// connection is best-effort by nature.
#[derive(Default)]
pub struct Rooms {
    rooms: HashMap<SessionCode, HashMap<ConnectionId, MemberSender>>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a session's room.
    pub fn join(
        &mut self,
        code: SessionCode,
        conn: ConnectionId,
        sender: MemberSender,
    ) {
        let room = self.rooms.entry(code).or_default();
        room.insert(conn, sender);
        tracing::debug!(%code, %conn, members = room.len(), "joined room");
    }

    /// Removes a connection from a session's room. Unknown members and
    /// unknown rooms are no-ops.
    pub fn leave(&mut self, code: SessionCode, conn: ConnectionId) {
        if let Some(room) = self.rooms.get_mut(&code) {
            room.remove(&conn);
            tracing::debug!(%code, %conn, members = room.len(), "left room");
            if room.is_empty() {
                self.rooms.remove(&code);
            }
        }
    }

    /// Pushes an event to every member of a room.
    pub fn broadcast(&self, code: SessionCode, event: ServerEvent) {
        let Some(room) = self.rooms.get(&code) else {
            return;
        };
        for sender in room.values() {
            let _ = sender.send(RoomOutbound::Event(event.clone()));
        }
    }

    /// Pushes an event to one member. Returns whether the member was in
    /// the room.
    pub fn send_to(
        &self,
        code: SessionCode,
        conn: ConnectionId,
        event: ServerEvent,
    ) -> bool {
        match self.rooms.get(&code).and_then(|room| room.get(&conn)) {
            Some(sender) => {
                let _ = sender.send(RoomOutbound::Event(event));
                true
            }
            None => false,
        }
    }

    /// Forcibly disconnects one member: delivers `kicked`, then the close
    /// signal, then drops them from the room so no later broadcast can
    /// reach them. Returns whether the member was present.
    pub fn kick(&mut self, code: SessionCode, conn: ConnectionId) -> bool {
        let Some(room) = self.rooms.get_mut(&code) else {
            return false;
        };
        let Some(sender) = room.remove(&conn) else {
            return false;
        };
        let _ = sender.send(RoomOutbound::Event(ServerEvent::Kicked));
        let _ = sender.send(RoomOutbound::Close);
        tracing::info!(%code, %conn, "kicked from room");
        if room.is_empty() {
            self.rooms.remove(&code);
        }
        true
    }

    /// Tears down a whole room, closing every member's connection. Used
    /// when the session behind it is destroyed.
    pub fn close(&mut self, code: SessionCode) {
        let Some(room) = self.rooms.remove(&code) else {
            return;
        };
        for sender in room.values() {
            let _ = sender.send(RoomOutbound::Close);
        }
        tracing::debug!(%code, members = room.len(), "room closed");
    }

    /// Number of live members in a room.
    pub fn members(&self, code: SessionCode) -> usize {
        self.rooms.get(&code).map(HashMap::len).unwrap_or(0)
    }
}
