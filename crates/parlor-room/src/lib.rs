//! Rooms: the live-connection side of a session.
//!
//! A room is the set of authenticated connections currently attached to
//! one session — the broadcast target for status pushes. Rooms hold only
//! channel senders; nothing durable lives here, and nothing here outlives
//! a disconnect.
//!
//! [`Rooms`] is the membership table; [`StatusPublisher`] is the broadcast
//! coordinator that reads a session snapshot from the store and pushes it
//! to every member.

mod publisher;
mod rooms;

pub use publisher::StatusPublisher;
pub use rooms::{MemberSender, RoomOutbound, Rooms};
