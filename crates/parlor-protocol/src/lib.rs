//! Wire protocol for Parlor.
//!
//! This crate defines everything that crosses a process boundary:
//!
//! - **Identity types** ([`SessionCode`], [`ConnectionId`]) — newtype
//!   wrappers so a session code can never be confused with a connection id.
//! - **Join bodies** ([`JoinRequest`], [`JoinGrant`], [`ErrorReply`]) — the
//!   request/response shapes of the join endpoint.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — the frames exchanged
//!   over a player's persistent connection.
//!
//! The protocol layer knows nothing about connections, rooms, or storage —
//! it only pins down the JSON shapes both sides agree on.

mod event;
mod join;
mod types;

pub use event::{ClientEvent, LobbyStatus, RosterEntry, ServerEvent, StatusView};
pub use join::{ErrorBody, ErrorReply, JoinGrant, JoinRequest, JoinResponse};
pub use types::{ConnectionId, SessionCode};
