//! Error vocabulary for the session services.
//!
//! Two classes, kept apart on purpose. [`DomainError`] is the routine
//! kind: a validation or state-conflict answer that travels verbatim to
//! the client who caused it, and is never logged as a failure.
//! [`StoreError`](parlor_store::StoreError) is the unexpected kind: logged
//! with full detail server-side and masked before presentation in
//! production. [`SessionError`] is what every service call returns; the
//! server's presenter is the single place that decides what a client sees.

use parlor_store::StoreError;

/// Routine, user-caused failures with stable messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// No session exists under the given code.
    #[error("game does not exist")]
    NotFound,

    /// The session has a round running; the roster is frozen for joins
    /// and renames until it ends.
    #[error("game is already in progress")]
    InProgress,

    /// Another player in the session already holds this name.
    #[error("that name is already taken")]
    NameTaken,

    /// The roster is at its ten-player limit.
    #[error("game is full")]
    GameFull,

    /// The server-wide session cap was hit; no new sessions right now.
    #[error("too many games in progress")]
    AtCapacity,

    /// An empty (or all-whitespace) player name.
    #[error("name cannot be blank")]
    BlankName,

    /// Player names are capped at twenty characters.
    #[error("name is too long (20 characters max)")]
    NameTooLong,

    /// A rename to the name the player already has.
    #[error("that is already your name")]
    SameName,

    /// The targeted player (or their whole session) is gone.
    #[error("player is not in this game")]
    PlayerMissing,

    /// Authentication failed. Distinguished from the rest by its
    /// machine-readable kind so clients can purge stored credentials.
    #[error("{0}")]
    Auth(#[from] AuthError),
}

impl DomainError {
    /// The machine-readable `type` tag for the wire, if this error
    /// carries one.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Auth(_) => Some("authError"),
            _ => None,
        }
    }
}

/// Why an `authRequest` was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The claimed session is gone (expired, or its last player left).
    #[error("game does not exist")]
    UnknownGame,

    /// The claimed name has no player record in the session.
    #[error("not joined")]
    NotJoined,

    /// The presented key does not digest to the stored hash.
    #[error("unauthorized")]
    Unauthorized,
}

/// What every session service call can come back with.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for SessionError {
    fn from(err: AuthError) -> Self {
        Self::Domain(DomainError::Auth(err))
    }
}
