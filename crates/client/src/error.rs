//! Request failure types.
//!
//! Every failure the orchestrators can hit ends up as an [`ApiError`], which
//! knows how to turn itself into the one line shown to the user.

use reqwest::StatusCode;
use thiserror::Error;

/// Message reported when a failure carries no usable status text.
pub const GENERIC_FAILURE: &str = "Operation failed";

/// The request never produced a response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS or body read failure.
    #[error("request failed: {0}")]
    Network(String),

    /// The request could not be built (bad path or body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors returned by [`ApiClient`](crate::api::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-success status.
    #[error("server rejected request with {status}")]
    Status {
        status: StatusCode,
        /// Reason phrase, when the response carried one.
        status_text: Option<String>,
    },

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The server answered for a different record than the one requested.
    #[error("server returned record {returned} for {requested}")]
    IdMismatch { requested: String, returned: String },
}

impl ApiError {
    /// The human-readable message forwarded to the error channel.
    ///
    /// Uses the response status text when present; anything else
    /// (transport failures, malformed or mismatched bodies, blank status
    /// text) collapses
    /// into [`GENERIC_FAILURE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                status_text: Some(text),
                ..
            } if !text.trim().is_empty() => text.trim().to_owned(),
            _ => GENERIC_FAILURE.to_owned(),
        }
    }

    /// HTTP status, if the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
