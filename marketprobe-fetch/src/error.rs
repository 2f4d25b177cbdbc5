//! Fetch error types.
//!
//! None of these cross the public boundary of the request client or the
//! session negotiator: both retry on them and degrade to sentinels. They
//! exist so the transport layer can report what went wrong.

use thiserror::Error;

// ============================================================================
// Transport Error
// ============================================================================

/// Failure to obtain any HTTP response at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, reset, or DNS failure.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The per-attempt timeout elapsed.
    #[error("Request timed out")]
    Timeout,

    /// The response body could not be read or decoded.
    #[error("Body error: {0}")]
    Body(String),

    /// A proxy URI could not be used.
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),

    /// Any other request failure.
    #[error("Request error: {0}")]
    Request(String),
}

impl TransportError {
    /// Returns true for connection-level failures.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

// ============================================================================
// Request Build Error
// ============================================================================

/// Failure to assemble an outbound request before any I/O happens.
#[derive(Debug, Error)]
pub enum RequestBuildError {
    /// The endpoint did not form a valid URL with the host.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
