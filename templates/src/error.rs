//! Errors returned by client methods.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The transport could not complete the request.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// A payload could not be encoded or decoded.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}
