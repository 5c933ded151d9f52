//! Player lifecycle: joining, renaming, removal.

use std::sync::Arc;

use parlor_protocol::{ConnectionId, JoinGrant, SessionCode};
use parlor_store::{PlayerDoc, SessionStore};

use crate::secret::{digest_key, generate_key};
use crate::{DomainError, SessionError};

/// Roster cap per session.
pub const MAX_PLAYERS: usize = 10;

/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 20;

/// Checks a player name against the 1–20 character rule.
///
/// Exposed separately so the join endpoint can reject a bad name before
/// it creates a session for it.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::BlankName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::NameTooLong);
    }
    Ok(())
}

/// What [`JoinService::remove`] hands back so the connection layer can
/// finish the job: kick the removed player's live connection, and close
/// the room if the session went with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// The connection bound to the removed player at removal time, if any.
    pub connection: Option<ConnectionId>,
    /// `true` when the roster emptied and the session was destroyed.
    pub session_destroyed: bool,
}

/// Seats, renames, and removes players.
///
/// Every operation here is a read-then-write sequence against one session,
/// so each one runs under the store's per-session guard from the first
/// check to the final write. Two near-simultaneous joins cannot both pass
/// the capacity check; a rename cannot interleave with a removal.
pub struct JoinService<S> {
    store: Arc<S>,
}

impl<S: SessionStore> JoinService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Seats a new player and issues their key.
    ///
    /// The returned grant is the only time the key ever leaves the server;
    /// the store sees nothing but its digest.
    pub async fn join(
        &self,
        code: SessionCode,
        name: &str,
    ) -> Result<JoinGrant, SessionError> {
        validate_name(name)?;

        let _guard = self.store.guard(code).await;

        let status = self
            .store
            .status(code)
            .await?
            .ok_or(DomainError::NotFound)?;
        if status.playing {
            return Err(DomainError::InProgress.into());
        }

        let roster = self.store.players(code).await?;
        if roster.iter().any(|p| p.name == name) {
            return Err(DomainError::NameTaken.into());
        }
        if roster.len() >= MAX_PLAYERS {
            return Err(DomainError::GameFull.into());
        }

        let key = generate_key();
        let order = roster.len() as u32 + 1;
        self.store
            .insert_player(
                code,
                PlayerDoc {
                    name: name.to_string(),
                    order,
                    hashed_key: digest_key(&key),
                    connection_id: None,
                },
            )
            .await?;

        tracing::info!(%code, name, order, "player joined");

        Ok(JoinGrant {
            game_code: code,
            name: name.to_string(),
            key,
        })
    }

    /// Renames the player `current` to `new_name`.
    pub async fn rename(
        &self,
        code: SessionCode,
        current: &str,
        new_name: &str,
    ) -> Result<(), SessionError> {
        validate_name(new_name)?;
        if current == new_name {
            return Err(DomainError::SameName.into());
        }

        let _guard = self.store.guard(code).await;

        let status = self
            .store
            .status(code)
            .await?
            .ok_or(DomainError::PlayerMissing)?;
        if status.playing {
            return Err(DomainError::InProgress.into());
        }

        let roster = self.store.players(code).await?;
        if !roster.iter().any(|p| p.name == current) {
            return Err(DomainError::PlayerMissing.into());
        }
        // Uniqueness within the session holds for renames too, not just
        // joins.
        if roster.iter().any(|p| p.name == new_name) {
            return Err(DomainError::NameTaken.into());
        }

        self.store.rename_player(code, current, new_name).await?;
        tracing::info!(%code, from = current, to = new_name, "player renamed");
        Ok(())
    }

    /// Removes the named player; destroys the session if they were the
    /// last one seated.
    pub async fn remove(
        &self,
        code: SessionCode,
        name: &str,
    ) -> Result<RemovalOutcome, SessionError> {
        let _guard = self.store.guard(code).await;

        if self.store.status(code).await?.is_none() {
            return Err(DomainError::PlayerMissing.into());
        }
        let player = self
            .store
            .player(code, name)
            .await?
            .ok_or(DomainError::PlayerMissing)?;

        self.store.remove_player(code, name).await?;
        tracing::info!(%code, name, "player removed");

        let session_destroyed = self.store.players(code).await?.is_empty();
        if session_destroyed {
            self.store.remove_session(code).await?;
            tracing::info!(%code, "last player removed, session destroyed");
        }

        Ok(RemovalOutcome {
            connection: player.connection_id,
            session_destroyed,
        })
    }
}
