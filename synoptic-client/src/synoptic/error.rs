//! Synoptic client error types.

use super::convert::ConversionError;

/// Longest body excerpt kept on an error, in characters.
const MAX_BODY_CHARS: usize = 500;

/// Errors from fetching and normalizing station data.
#[derive(Debug, thiserror::Error)]
pub enum SynopticError {
    /// Missing or invalid credential or endpoint configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller's arguments cannot form a request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP request failed (DNS, connect, reset, timeout)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint rejected the request. `status` is the HTTP status, or
    /// the `SUMMARY.RESPONSE_CODE` when a 200 body reports the failure.
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The payload does not have the expected shape
    #[error("malformed response: {message}")]
    MalformedResponse {
        message: String,
        body: Option<String>,
    },
}

impl SynopticError {
    /// Build a `MalformedResponse`, keeping a bounded excerpt of the body.
    pub(crate) fn malformed(message: impl Into<String>, body: Option<&str>) -> Self {
        SynopticError::MalformedResponse {
            message: message.into(),
            body: body.map(|b| b.chars().take(MAX_BODY_CHARS).collect()),
        }
    }

    /// Whether the failure came from the transport timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SynopticError::Network(e) if e.is_timeout())
    }

    /// HTTP status reported by the endpoint, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SynopticError::Upstream { status, .. } => Some(*status),
            SynopticError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a caller could reasonably retry the same request.
    ///
    /// Transport failures, request timeouts, rate limiting and server errors
    /// are transient. Everything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SynopticError::Network(_) => true,
            SynopticError::Upstream { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            SynopticError::Configuration(_)
            | SynopticError::InvalidRequest(_)
            | SynopticError::MalformedResponse { .. } => false,
        }
    }
}

impl From<ConversionError> for SynopticError {
    fn from(err: ConversionError) -> Self {
        SynopticError::malformed(err.to_string(), None)
    }
}

/// Truncate a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.chars().count() > MAX_BODY_CHARS {
        format!("{}...", body.chars().take(MAX_BODY_CHARS).collect::<String>())
    } else {
        body.to_string()
    }
}
