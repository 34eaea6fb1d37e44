//! Error taxonomy for the fleet aggregation layer.

use thiserror::Error;

use crate::upstream::UpstreamError;

/// Upper bound on how much of a failed response body is kept for diagnostics.
pub const MAX_ERROR_BODY: usize = 4096;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration, raised while building a client.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller violated an operation's contract (e.g. empty route set).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure, timeout or non-success HTTP status.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable {
        message: String,
        status: Option<u16>,
        body: Option<String>,
    },

    /// The response body did not match the expected envelope.
    #[error("upstream protocol error: {0}")]
    UpstreamProtocol(String),

    /// The upstream answered with an error envelope that is not a no-data signal.
    #[error("upstream returned error: {}", join_messages(.errors))]
    UpstreamReported { errors: Vec<UpstreamError> },

    #[error("operation cancelled")]
    Cancelled,

    #[error("call tracker error: {0}")]
    Tracker(#[from] sqlx::Error),
}

impl Error {
    /// Whether the caller may reasonably retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable { .. })
    }

    pub(crate) fn unavailable(err: reqwest::Error) -> Self {
        // the request URL carries the credential
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            format!("request failed: {err}")
        };
        Error::UpstreamUnavailable {
            message,
            status: err.status().map(|s| s.as_u16()),
            body: None,
        }
    }
}

fn join_messages(errors: &[UpstreamError]) -> String {
    errors
        .iter()
        .map(|e| e.msg.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cuts `body` down to at most [`MAX_ERROR_BODY`] bytes on a char boundary.
pub(crate) fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
