//! # Parlor
//!
//! Session coordination for realtime multiplayer parlor games: players
//! join a session identified by a six-digit code over a plain HTTP
//! endpoint, then hold one WebSocket per player for authentication and
//! status updates, while a background reaper reclaims sessions nobody is
//! playing anymore.
//!
//! The stack, bottom up: `parlor-store` (documents + per-session critical
//! sections) → `parlor-session` (registry, join lifecycle, auth) →
//! `parlor-room` (live-connection rooms and status broadcast) → this
//! crate (axum surface, per-connection state machine, expiry reaper,
//! configuration, error presentation). The `parlord` binary wires it all
//! to environment-driven config.

mod config;
mod error;
mod handler;
mod reaper;
mod server;

pub use config::{Config, EnvMode};
pub use error::ServerError;
pub use reaper::{ExpiryReaper, ReaperHandle};
pub use server::{Server, ServerBuilder};
