//! Request and response types for the public HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /ask`.
///
/// `message` is optional at the serde level so its absence can be reported
/// as a malformed request rather than a deserialization error; unknown
/// fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: Option<String>,
}

/// Body of every reply, success and fallback alike.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
}
