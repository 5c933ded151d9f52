//! The broadcast coordinator: session snapshot → room push.

use std::sync::Arc;

use parlor_protocol::{
    LobbyStatus, RosterEntry, ServerEvent, SessionCode, StatusView,
};
use parlor_store::{SessionStore, StoreError};
use tokio::sync::Mutex;

use crate::Rooms;

/// Reads a session's status and roster and pushes the snapshot to every
/// connection in the session's room.
pub struct StatusPublisher<S> {
    store: Arc<S>,
    rooms: Arc<Mutex<Rooms>>,
}

impl<S: SessionStore> StatusPublisher<S> {
    pub fn new(store: Arc<S>, rooms: Arc<Mutex<Rooms>>) -> Self {
        Self { store, rooms }
    }

    /// Pushes the current snapshot of `code` to its room.
    ///
    /// Emits only while the session is gathering players: a running round
    /// has its view produced by the rule engine, and a vanished session
    /// has nothing left to say. A store failure degrades to an opaque
    /// error snapshot instead of taking the push path down with it.
    pub async fn broadcast_status(&self, code: SessionCode) {
        let view = match self.lobby_view(code).await {
            Ok(Some(view)) => view,
            Ok(None) => return,
            Err(err) => {
                tracing::error!(%code, error = %err, "status read failed");
                StatusView::Unavailable {
                    error: "internal error".into(),
                }
            }
        };

        self.rooms
            .lock()
            .await
            .broadcast(code, ServerEvent::GameStatus(view));
    }

    async fn lobby_view(
        &self,
        code: SessionCode,
    ) -> Result<Option<StatusView>, StoreError> {
        let Some(status) = self.store.status(code).await? else {
            return Ok(None);
        };
        if status.playing {
            return Ok(None);
        }

        let mut roster = self.store.players(code).await?;
        roster.sort_by_key(|p| p.order);

        Ok(Some(StatusView::Lobby(LobbyStatus {
            playing: false,
            players: roster
                .into_iter()
                .map(|p| RosterEntry {
                    name: p.name,
                    order: p.order,
                })
                .collect(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use parlor_protocol::ConnectionId;
    use parlor_store::{MemoryStore, PlayerDoc, StatusDoc};
    use tokio::sync::mpsc;
    use tokio::sync::OwnedMutexGuard;

    use crate::RoomOutbound;

    use super::*;

    async fn seeded_room(
        rooms: &Arc<Mutex<Rooms>>,
        code: SessionCode,
    ) -> mpsc::UnboundedReceiver<RoomOutbound> {
        let (tx, rx) = mpsc::unbounded_channel();
        rooms.lock().await.join(code, ConnectionId::new(1), tx);
        rx
    }

    fn player(name: &str, order: u32) -> PlayerDoc {
        PlayerDoc {
            name: name.into(),
            order,
            hashed_key: String::new(),
            connection_id: None,
        }
    }

    #[tokio::test]
    async fn test_broadcast_status_pushes_roster_in_seat_order() {
        let store = Arc::new(MemoryStore::new());
        let code = SessionCode(5);
        store
            .insert_session(code, StatusDoc::new_lobby())
            .await
            .unwrap();
        store.insert_player(code, player("Bob", 2)).await.unwrap();
        store.insert_player(code, player("Alice", 1)).await.unwrap();

        let rooms = Arc::new(Mutex::new(Rooms::new()));
        let mut rx = seeded_room(&rooms, code).await;

        StatusPublisher::new(Arc::clone(&store), Arc::clone(&rooms))
            .broadcast_status(code)
            .await;

        let RoomOutbound::Event(ServerEvent::GameStatus(StatusView::Lobby(
            lobby,
        ))) = rx.try_recv().unwrap()
        else {
            panic!("expected a lobby snapshot");
        };
        assert!(!lobby.playing);
        let names: Vec<_> =
            lobby.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn test_broadcast_status_emits_nothing_while_playing() {
        let store = Arc::new(MemoryStore::new());
        let code = SessionCode(5);
        store
            .insert_session(code, StatusDoc::new_lobby())
            .await
            .unwrap();
        store.set_playing(code, true).await.unwrap();

        let rooms = Arc::new(Mutex::new(Rooms::new()));
        let mut rx = seeded_room(&rooms, code).await;

        StatusPublisher::new(Arc::clone(&store), Arc::clone(&rooms))
            .broadcast_status(code)
            .await;

        assert!(rx.try_recv().is_err(), "in-game view is not ours to send");
    }

    #[tokio::test]
    async fn test_broadcast_status_emits_nothing_for_dead_session() {
        let store = Arc::new(MemoryStore::new());
        let code = SessionCode(5);

        let rooms = Arc::new(Mutex::new(Rooms::new()));
        let mut rx = seeded_room(&rooms, code).await;

        StatusPublisher::new(Arc::clone(&store), Arc::clone(&rooms))
            .broadcast_status(code)
            .await;

        assert!(rx.try_recv().is_err());
    }

    // A backend where every read fails, to prove the push path degrades
    // instead of crashing.
    struct BrokenStore {
        lock: Arc<tokio::sync::Mutex<()>>,
    }

    impl BrokenStore {
        fn new() -> Self {
            Self {
                lock: Arc::new(tokio::sync::Mutex::new(())),
            }
        }

        fn fail() -> StoreError {
            StoreError::Backend("connection reset".into())
        }
    }

    impl SessionStore for BrokenStore {
        async fn guard(&self, _code: SessionCode) -> OwnedMutexGuard<()> {
            Arc::clone(&self.lock).lock_owned().await
        }
        async fn insert_session(
            &self,
            _code: SessionCode,
            _status: StatusDoc,
        ) -> Result<bool, StoreError> {
            Err(Self::fail())
        }
        async fn remove_session(
            &self,
            _code: SessionCode,
        ) -> Result<(), StoreError> {
            Err(Self::fail())
        }
        async fn session_codes(&self) -> Result<Vec<SessionCode>, StoreError> {
            Err(Self::fail())
        }
        async fn session_count(&self) -> Result<usize, StoreError> {
            Err(Self::fail())
        }
        async fn status(
            &self,
            _code: SessionCode,
        ) -> Result<Option<StatusDoc>, StoreError> {
            Err(Self::fail())
        }
        async fn set_playing(
            &self,
            _code: SessionCode,
            _playing: bool,
        ) -> Result<(), StoreError> {
            Err(Self::fail())
        }
        async fn players(
            &self,
            _code: SessionCode,
        ) -> Result<Vec<PlayerDoc>, StoreError> {
            Err(Self::fail())
        }
        async fn player(
            &self,
            _code: SessionCode,
            _name: &str,
        ) -> Result<Option<PlayerDoc>, StoreError> {
            Err(Self::fail())
        }
        async fn insert_player(
            &self,
            _code: SessionCode,
            _player: PlayerDoc,
        ) -> Result<(), StoreError> {
            Err(Self::fail())
        }
        async fn remove_player(
            &self,
            _code: SessionCode,
            _name: &str,
        ) -> Result<bool, StoreError> {
            Err(Self::fail())
        }
        async fn rename_player(
            &self,
            _code: SessionCode,
            _from: &str,
            _to: &str,
        ) -> Result<bool, StoreError> {
            Err(Self::fail())
        }
        async fn bind_connection(
            &self,
            _code: SessionCode,
            _name: &str,
            _conn: ConnectionId,
        ) -> Result<bool, StoreError> {
            Err(Self::fail())
        }
    }

    #[tokio::test]
    async fn test_broadcast_status_degrades_to_error_snapshot_on_store_failure()
    {
        let store = Arc::new(BrokenStore::new());
        let code = SessionCode(5);

        let rooms = Arc::new(Mutex::new(Rooms::new()));
        let mut rx = seeded_room(&rooms, code).await;

        StatusPublisher::new(store, Arc::clone(&rooms))
            .broadcast_status(code)
            .await;

        let RoomOutbound::Event(ServerEvent::GameStatus(view)) =
            rx.try_recv().unwrap()
        else {
            panic!("expected a status push");
        };
        assert!(matches!(view, StatusView::Unavailable { .. }));
    }
}
