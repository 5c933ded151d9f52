//! In-process `SessionStore` backend.
//!
//! Session state is ephemeral by design, so the default deployment keeps
//! it in a pair of maps: session scopes and their critical-section locks.
//! The scope map sits behind a `std` mutex — no store call awaits while
//! holding it, so there is no lock-across-suspend hazard and no need for
//! an async lock at this level.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use parlor_protocol::{ConnectionId, SessionCode};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{PlayerDoc, SessionStore, StatusDoc, StoreError};

/// Everything one session owns.
struct SessionScope {
    created_at: SystemTime,
    status: StatusDoc,
    players: Vec<PlayerDoc>,
}

/// The bundled in-memory backend.
#[derive(Default)]
pub struct MemoryStore {
    sessions: Mutex<HashMap<SessionCode, SessionScope>>,
    /// Per-session critical-section locks. Entries are created lazily on
    /// first `guard()` and dropped with the session; a guard taken for a
    /// code that never materializes leaves a stray entry behind, bounded
    /// by the code space.
    locks: Mutex<HashMap<SessionCode, Arc<AsyncMutex<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    async fn guard(&self, code: SessionCode) -> OwnedMutexGuard<()> {
        // Clone the Arc out before awaiting so the std guard is released
        // first.
        let lock = {
            let mut locks = self.locks.lock().expect("lock map poisoned");
            Arc::clone(locks.entry(code).or_default())
        };
        lock.lock_owned().await
    }

    async fn insert_session(
        &self,
        code: SessionCode,
        status: StatusDoc,
    ) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        if sessions.contains_key(&code) {
            return Ok(false);
        }
        sessions.insert(
            code,
            SessionScope {
                created_at: SystemTime::now(),
                status,
                players: Vec::new(),
            },
        );
        Ok(true)
    }

    async fn remove_session(&self, code: SessionCode) -> Result<(), StoreError> {
        let removed = {
            let mut sessions =
                self.sessions.lock().expect("session map poisoned");
            sessions.remove(&code)
        };
        if let Some(scope) = removed {
            let lifetime = SystemTime::now()
                .duration_since(scope.created_at)
                .unwrap_or_default();
            tracing::debug!(
                %code,
                players = scope.players.len(),
                lifetime_secs = lifetime.as_secs(),
                "session scope dropped"
            );
            self.locks
                .lock()
                .expect("lock map poisoned")
                .remove(&code);
        }
        Ok(())
    }

    async fn session_codes(&self) -> Result<Vec<SessionCode>, StoreError> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        Ok(sessions.keys().copied().collect())
    }

    async fn session_count(&self) -> Result<usize, StoreError> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        Ok(sessions.len())
    }

    async fn status(
        &self,
        code: SessionCode,
    ) -> Result<Option<StatusDoc>, StoreError> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        Ok(sessions.get(&code).map(|scope| scope.status.clone()))
    }

    async fn set_playing(
        &self,
        code: SessionCode,
        playing: bool,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        let scope = sessions
            .get_mut(&code)
            .ok_or(StoreError::MissingSession(code))?;
        scope.status.playing = playing;
        scope.status.last_change = SystemTime::now();
        Ok(())
    }

    async fn players(
        &self,
        code: SessionCode,
    ) -> Result<Vec<PlayerDoc>, StoreError> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        Ok(sessions
            .get(&code)
            .map(|scope| scope.players.clone())
            .unwrap_or_default())
    }

    async fn player(
        &self,
        code: SessionCode,
        name: &str,
    ) -> Result<Option<PlayerDoc>, StoreError> {
        let sessions = self.sessions.lock().expect("session map poisoned");
        Ok(sessions.get(&code).and_then(|scope| {
            scope.players.iter().find(|p| p.name == name).cloned()
        }))
    }

    async fn insert_player(
        &self,
        code: SessionCode,
        player: PlayerDoc,
    ) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        let scope = sessions
            .get_mut(&code)
            .ok_or(StoreError::MissingSession(code))?;
        scope.players.push(player);
        Ok(())
    }

    async fn remove_player(
        &self,
        code: SessionCode,
        name: &str,
    ) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        let Some(scope) = sessions.get_mut(&code) else {
            return Ok(false);
        };
        let before = scope.players.len();
        scope.players.retain(|p| p.name != name);
        Ok(scope.players.len() < before)
    }

    async fn rename_player(
        &self,
        code: SessionCode,
        from: &str,
        to: &str,
    ) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        let Some(scope) = sessions.get_mut(&code) else {
            return Ok(false);
        };
        match scope.players.iter_mut().find(|p| p.name == from) {
            Some(player) => {
                player.name = to.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn bind_connection(
        &self,
        code: SessionCode,
        name: &str,
        conn: ConnectionId,
    ) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().expect("session map poisoned");
        let Some(scope) = sessions.get_mut(&code) else {
            return Ok(false);
        };
        match scope.players.iter_mut().find(|p| p.name == name) {
            Some(player) => {
                player.connection_id = Some(conn);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn code(n: u32) -> SessionCode {
        SessionCode(n)
    }

    fn player(name: &str, order: u32) -> PlayerDoc {
        PlayerDoc {
            name: name.into(),
            order,
            hashed_key: "00".repeat(32),
            connection_id: None,
        }
    }

    #[tokio::test]
    async fn test_insert_session_new_code_returns_true() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();
        assert!(inserted);
        assert_eq!(store.session_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_session_taken_code_returns_false() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();
        store.insert_player(code(1), player("Alice", 1)).await.unwrap();

        let inserted = store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();

        assert!(!inserted, "conflicting insert must not win");
        // The conflicting insert must also not clobber existing documents.
        assert_eq!(store.players(code(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_session_is_idempotent() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();

        store.remove_session(code(1)).await.unwrap();
        store.remove_session(code(1)).await.unwrap();
        store.remove_session(code(99)).await.unwrap();

        assert_eq!(store.session_count().await.unwrap(), 0);
        assert!(store.status(code(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_session_cascades_players() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();
        store.insert_player(code(1), player("Alice", 1)).await.unwrap();

        store.remove_session(code(1)).await.unwrap();

        assert!(store.players(code(1)).await.unwrap().is_empty());
        assert!(store.player(code(1), "Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_playing_touches_last_change() {
        let store = MemoryStore::new();
        let stale = StatusDoc {
            playing: false,
            last_change: SystemTime::now() - Duration::from_secs(3600),
        };
        store.insert_session(code(1), stale).await.unwrap();

        store.set_playing(code(1), true).await.unwrap();

        let status = store.status(code(1)).await.unwrap().unwrap();
        assert!(status.playing);
        assert!(status.idle_for() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_set_playing_missing_session_is_an_error() {
        let store = MemoryStore::new();
        let result = store.set_playing(code(1), true).await;
        assert_eq!(result, Err(StoreError::MissingSession(code(1))));
    }

    #[tokio::test]
    async fn test_players_preserve_insertion_order() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();
        store.insert_player(code(1), player("Alice", 1)).await.unwrap();
        store.insert_player(code(1), player("Bob", 2)).await.unwrap();

        let roster = store.players(code(1)).await.unwrap();
        let names: Vec<_> = roster.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_remove_player_reports_whether_present() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();
        store.insert_player(code(1), player("Alice", 1)).await.unwrap();

        assert!(store.remove_player(code(1), "Alice").await.unwrap());
        assert!(!store.remove_player(code(1), "Alice").await.unwrap());
        assert!(!store.remove_player(code(2), "Alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_player_keeps_order_and_key() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();
        store.insert_player(code(1), player("Alice", 1)).await.unwrap();

        assert!(store.rename_player(code(1), "Alice", "Alicia").await.unwrap());

        let renamed = store.player(code(1), "Alicia").await.unwrap().unwrap();
        assert_eq!(renamed.order, 1);
        assert_eq!(renamed.hashed_key, "00".repeat(32));
        assert!(store.player(code(1), "Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bind_connection_overwrites_previous_binding() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();
        store.insert_player(code(1), player("Alice", 1)).await.unwrap();

        assert!(store
            .bind_connection(code(1), "Alice", ConnectionId::new(1))
            .await
            .unwrap());
        assert!(store
            .bind_connection(code(1), "Alice", ConnectionId::new(2))
            .await
            .unwrap());

        let bound = store.player(code(1), "Alice").await.unwrap().unwrap();
        assert_eq!(bound.connection_id, Some(ConnectionId::new(2)));
    }

    #[tokio::test]
    async fn test_bind_connection_unknown_player_returns_false() {
        let store = MemoryStore::new();
        store
            .insert_session(code(1), StatusDoc::new_lobby())
            .await
            .unwrap();

        let bound = store
            .bind_connection(code(1), "Nobody", ConnectionId::new(1))
            .await
            .unwrap();
        assert!(!bound);
    }

    #[tokio::test]
    async fn test_guard_excludes_second_holder_until_dropped() {
        let store = Arc::new(MemoryStore::new());

        let held = store.guard(code(1)).await;

        // While the guard is held, a second acquisition must not complete.
        let contender = Arc::clone(&store);
        let blocked = tokio::time::timeout(
            Duration::from_millis(20),
            contender.guard(code(1)),
        )
        .await;
        assert!(blocked.is_err(), "guard should still be held");

        drop(held);

        let acquired = tokio::time::timeout(
            Duration::from_millis(100),
            store.guard(code(1)),
        )
        .await;
        assert!(acquired.is_ok(), "guard should be free after drop");
    }

    #[tokio::test]
    async fn test_guards_for_different_sessions_do_not_contend() {
        let store = Arc::new(MemoryStore::new());

        let _one = store.guard(code(1)).await;
        let other = tokio::time::timeout(
            Duration::from_millis(100),
            store.guard(code(2)),
        )
        .await;
        assert!(other.is_ok(), "distinct sessions must not share a lock");
    }
}
