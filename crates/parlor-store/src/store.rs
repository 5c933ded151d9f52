//! The `SessionStore` trait: what any backend must provide.

use std::future::Future;

use parlor_protocol::{ConnectionId, SessionCode};
use tokio::sync::OwnedMutexGuard;

use crate::{PlayerDoc, StatusDoc, StoreError};

/// A per-session document store plus a global session registry.
///
/// Two properties carry all of the concurrency weight:
///
/// 1. [`insert_session`](Self::insert_session) is an atomic
///    insert-if-absent. Two creators racing for the same code cannot both
///    win; the loser observes the conflict and draws a fresh code.
/// 2. [`guard`](Self::guard) hands out a per-session critical section.
///    Every read-then-write sequence against one session (the join checks,
///    a rename, a removal, the auth binding) runs under that guard, so
///    "read count, compare, write" behaves as a single operation even
///    though the store itself only offers single-document calls.
///
/// Events on different sessions never contend with each other.
///
/// Methods are declared as `impl Future + Send` rather than `async fn` so
/// generic callers (the reaper, most of all) can drive them from spawned
/// tasks; implementations still just write `async fn`.
pub trait SessionStore: Send + Sync + 'static {
    /// Acquires the critical section for one session scope.
    ///
    /// The guard is a token, not data: holders still talk to the store
    /// through the other methods. Dropping it releases the section.
    fn guard(
        &self,
        code: SessionCode,
    ) -> impl Future<Output = OwnedMutexGuard<()>> + Send;

    /// Creates a session scope with the given status document.
    ///
    /// Returns `false` without writing anything if the code is already
    /// taken.
    fn insert_session(
        &self,
        code: SessionCode,
        status: StatusDoc,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Drops a session scope and everything in it. Removing a nonexistent
    /// session is a no-op, not an error.
    fn remove_session(
        &self,
        code: SessionCode,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Lists the codes of all live sessions.
    fn session_codes(
        &self,
    ) -> impl Future<Output = Result<Vec<SessionCode>, StoreError>> + Send;

    /// Number of live sessions.
    fn session_count(
        &self,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Reads a session's status document, if the session exists.
    fn status(
        &self,
        code: SessionCode,
    ) -> impl Future<Output = Result<Option<StatusDoc>, StoreError>> + Send;

    /// Flips the `playing` flag and touches `last_change`.
    ///
    /// This is the round-boundary seam: the rule engine driving rounds
    /// calls it at round start and round end. The coordination layer only
    /// ever reads the result.
    fn set_playing(
        &self,
        code: SessionCode,
        playing: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads the full roster of a session, in insertion order. An unknown
    /// session reads as an empty roster.
    fn players(
        &self,
        code: SessionCode,
    ) -> impl Future<Output = Result<Vec<PlayerDoc>, StoreError>> + Send;

    /// Reads a single player by name.
    fn player(
        &self,
        code: SessionCode,
        name: &str,
    ) -> impl Future<Output = Result<Option<PlayerDoc>, StoreError>> + Send;

    /// Appends a player to the roster. The caller is responsible for the
    /// uniqueness and capacity checks, under [`guard`](Self::guard).
    fn insert_player(
        &self,
        code: SessionCode,
        player: PlayerDoc,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Deletes a player by name. Returns whether anything was removed.
    fn remove_player(
        &self,
        code: SessionCode,
        name: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Renames a player. Returns `false` if no player had the old name.
    fn rename_player(
        &self,
        code: SessionCode,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Writes a player's bound connection id, overwriting any previous
    /// binding. Returns `false` if no player had the name.
    fn bind_connection(
        &self,
        code: SessionCode,
        name: &str,
        conn: ConnectionId,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
