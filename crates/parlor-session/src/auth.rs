//! The auth gateway: turns stored credentials into a connection binding.

use std::sync::Arc;

use parlor_protocol::{ConnectionId, SessionCode};
use parlor_store::SessionStore;

use crate::secret::verify_key;
use crate::{AuthError, SessionError};

/// What a successful authentication establishes: this connection speaks
/// for `name` in session `code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSuccess {
    pub code: SessionCode,
    pub name: String,
}

/// Verifies `authRequest` credentials against the store.
pub struct AuthGateway<S> {
    store: Arc<S>,
}

impl<S: SessionStore> AuthGateway<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Checks the credential and, on success, binds `conn` onto the
    /// player record.
    ///
    /// The binding happens strictly after the key check: a failed
    /// authentication leaves the player record untouched. A valid
    /// re-authentication overwrites any previous binding — last writer
    /// wins, which is what lets a reconnecting client supersede its own
    /// stale connection.
    pub async fn authenticate(
        &self,
        conn: ConnectionId,
        code: SessionCode,
        name: &str,
        key: &str,
    ) -> Result<AuthSuccess, SessionError> {
        let _guard = self.store.guard(code).await;

        if self.store.status(code).await?.is_none() {
            return Err(AuthError::UnknownGame.into());
        }

        let player = self
            .store
            .player(code, name)
            .await?
            .ok_or(AuthError::NotJoined)?;

        if !verify_key(key, &player.hashed_key) {
            tracing::debug!(%code, name, %conn, "key mismatch");
            return Err(AuthError::Unauthorized.into());
        }

        self.store.bind_connection(code, name, conn).await?;
        tracing::info!(%code, name, %conn, "connection authenticated");

        Ok(AuthSuccess {
            code,
            name: name.to_string(),
        })
    }
}
