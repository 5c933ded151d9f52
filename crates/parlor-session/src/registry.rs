//! The session registry: allocates codes, enforces the global cap, tears
//! sessions down.

use std::sync::Arc;

use parlor_protocol::SessionCode;
use parlor_store::{SessionStore, StatusDoc};
use rand::Rng;

use crate::{DomainError, SessionError};

/// Registry limits.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Hard cap on concurrently live sessions. With a code space of one
    /// million, the default keeps the space at most 10% full, so the
    /// draw-and-retry loop below stays short even under load.
    pub max_sessions: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: 100_000,
        }
    }
}

/// Creates and destroys sessions.
pub struct SessionRegistry<S> {
    store: Arc<S>,
    config: RegistryConfig,
}

impl<S: SessionStore> SessionRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, RegistryConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    /// Creates a fresh session and returns its code.
    ///
    /// Codes are drawn uniformly from the code space. A draw that hits an
    /// existing session loses the atomic insert and simply draws again —
    /// the insert-if-absent semantics of the store are what make two
    /// racing creators safe, not any lock around this loop.
    pub async fn create_session(&self) -> Result<SessionCode, SessionError> {
        let active = self.store.session_count().await?;
        if active >= self.config.max_sessions {
            return Err(DomainError::AtCapacity.into());
        }

        loop {
            let code = draw_code();
            if self
                .store
                .insert_session(code, StatusDoc::new_lobby())
                .await?
            {
                tracing::info!(%code, active = active + 1, "session created");
                return Ok(code);
            }
            tracing::debug!(%code, "session code taken, drawing again");
        }
    }

    /// Destroys a session and every record scoped to it.
    ///
    /// Destroying a session that is already gone is a no-op.
    pub async fn destroy_session(
        &self,
        code: SessionCode,
    ) -> Result<(), SessionError> {
        self.store.remove_session(code).await?;
        tracing::info!(%code, "session destroyed");
        Ok(())
    }
}

/// One uniform draw from the code space. Kept synchronous so the thread-
/// local RNG never lives across an await point.
fn draw_code() -> SessionCode {
    let mut rng = rand::rng();
    SessionCode(rng.random_range(0..SessionCode::SPACE))
}
