//! Error type for the storage layer.

use parlor_protocol::SessionCode;

/// Errors surfaced by a [`SessionStore`](crate::SessionStore) backend.
///
/// These are the "unexpected" class: services propagate them upward and
/// the server masks them before anything reaches a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A write targeted a session scope that does not exist. Under the
    /// per-session guard this means the caller skipped the status check.
    #[error("no session scope for code {0}")]
    MissingSession(SessionCode),

    /// The backend itself failed (I/O, connection loss, corruption).
    #[error("store backend error: {0}")]
    Backend(String),
}
