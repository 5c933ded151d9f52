//! Server-level errors and the client-facing presentation of failures.

use parlor_protocol::ErrorBody;
use parlor_session::SessionError;

use crate::EnvMode;

/// Top-level error for building and running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A session service failed during startup work.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Binding the listener failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// The accept/serve loop died.
    #[error("server io: {0}")]
    Io(#[from] std::io::Error),
}

/// The single translation point between internal errors and what a client
/// sees.
///
/// Domain errors are routine answers to user actions: always surfaced
/// verbatim, never logged as failures. Everything else is logged with full
/// detail and, in production, masked down to a generic message so backend
/// internals stay on the server.
pub(crate) fn present(err: &SessionError, env: EnvMode) -> ErrorBody {
    match err {
        SessionError::Domain(domain) => ErrorBody {
            message: domain.to_string(),
            kind: domain.kind().map(str::to_string),
        },
        SessionError::Store(store) => {
            tracing::error!(error = %store, "unexpected store failure");
            let message = if env.is_production() {
                "something went wrong".to_string()
            } else {
                store.to_string()
            };
            ErrorBody {
                message,
                kind: None,
            }
        }
    }
}
