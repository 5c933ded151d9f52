//! The documents a session scope holds.

use std::time::{Duration, SystemTime};

use parlor_protocol::ConnectionId;
use serde::{Deserialize, Serialize};

/// The single `status` document of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDoc {
    /// Whether a round is currently running. Joins are only accepted
    /// while this is `false`.
    pub playing: bool,

    /// When the session last did something significant: creation, round
    /// start, round end. The expiry clock — not touched by joins, renames
    /// or removals.
    pub last_change: SystemTime,
}

impl StatusDoc {
    /// A fresh lobby status, as written at session creation.
    pub fn new_lobby() -> Self {
        Self {
            playing: false,
            last_change: SystemTime::now(),
        }
    }

    /// How long ago the last significant change happened.
    ///
    /// A `last_change` in the future (clock adjustment) reads as zero,
    /// which errs on the side of keeping the session alive.
    pub fn idle_for(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.last_change)
            .unwrap_or_default()
    }
}

/// One entry in a session's `players` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDoc {
    /// Unique within the session, 1–20 characters.
    pub name: String,

    /// Seat number, assigned at join time and never reassigned.
    pub order: u32,

    /// SHA-256 hex digest of the secret issued at join. The secret itself
    /// is never persisted.
    pub hashed_key: String,

    /// The live connection currently bound to this player, if any.
    /// Rewritten on every successful authentication (last writer wins);
    /// left stale on disconnect so reconnects keep working.
    pub connection_id: Option<ConnectionId>,
}
