//! Identity types shared across the stack.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The public, human-enterable identifier for a session.
///
/// Codes are drawn uniformly from `0..SessionCode::SPACE` so they stay
/// short enough to read out loud across a table. `#[serde(transparent)]`
/// keeps the wire form a plain number (`42137`, not `{"0": 42137}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(pub u32);

impl SessionCode {
    /// Size of the code space: codes lie in `[0, 1_000_000)`.
    pub const SPACE: u32 = 1_000_000;

    /// Whether this code lies inside the valid code space.
    ///
    /// Codes arrive from clients as arbitrary integers; everything past
    /// deserialization must only ever see in-range codes.
    pub fn in_range(self) -> bool {
        self.0 < Self::SPACE
    }
}

/// Codes are displayed zero-padded to six digits, matching what players
/// type into the join form.
impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// Opaque identifier for one live connection.
///
/// Allocated by the server when a socket is accepted, bound onto a player
/// record on successful authentication, and meaningless after the socket
/// closes. Serializable because the store persists the current binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_code_serializes_as_plain_number() {
        let json = serde_json::to_string(&SessionCode(42137)).unwrap();
        assert_eq!(json, "42137");
    }

    #[test]
    fn test_session_code_deserializes_from_plain_number() {
        let code: SessionCode = serde_json::from_str("999999").unwrap();
        assert_eq!(code, SessionCode(999_999));
    }

    #[test]
    fn test_session_code_display_zero_pads() {
        assert_eq!(SessionCode(7).to_string(), "000007");
        assert_eq!(SessionCode(123_456).to_string(), "123456");
    }

    #[test]
    fn test_session_code_in_range_boundaries() {
        assert!(SessionCode(0).in_range());
        assert!(SessionCode(999_999).in_range());
        assert!(!SessionCode(1_000_000).in_range());
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(3).to_string(), "conn-3");
    }

    #[test]
    fn test_connection_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "alice");
        assert_eq!(map[&ConnectionId::new(1)], "alice");
    }
}
