//! Request/response bodies for the join endpoint.

use serde::{Deserialize, Serialize};

use crate::types::SessionCode;

/// Body of `POST /join`.
///
/// `game_code` absent means "create a fresh session and seat me in it".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_code: Option<SessionCode>,
}

/// Successful join: the code to share, the accepted name, and the secret
/// key. The key is transmitted exactly once — only its digest is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGrant {
    pub game_code: SessionCode,
    pub name: String,
    pub key: String,
}

/// A user-visible error, also embedded in `myError` connection frames.
///
/// `kind` is a machine-readable tag; clients purge stored credentials and
/// return to the entry screen when they see `"authError"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

/// Failure body of the join endpoint: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: ErrorBody,
}

/// Either outcome of a join call, for clients that parse the body before
/// looking at the status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JoinResponse {
    Granted(JoinGrant),
    Rejected(ErrorReply),
}
