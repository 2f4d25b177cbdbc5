//! Transport abstraction.
//!
//! The session negotiator and the request client only ever talk to a
//! [`Transport`]. Production code uses
//! [`ReqwestTransport`](super::http::ReqwestTransport); tests plug in
//! [`ScriptedTransport`](super::scripted::ScriptedTransport).

use marketprobe_core::ProxyRoute;
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::TransportError;

// ============================================================================
// Request / Response
// ============================================================================

/// A fully assembled GET request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// Absolute URL including the query string.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Proxy route to send the request through.
    pub proxy: Option<ProxyRoute>,
}

impl OutboundRequest {
    /// Creates a request without headers or proxy.
    pub fn get(url: Url) -> Self {
        Self {
            url,
            headers: HeaderMap::new(),
            proxy: None,
        }
    }

    /// Returns a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Status, headers and body of a response.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body bytes.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response with a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns true for status 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Iterates over every `Set-Cookie` header value.
    pub fn set_cookies(&self) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns the body as lossy UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Sends one GET request and returns whatever came back.
///
/// Implementations do not retry and do not interpret status codes; a
/// non-200 response is still `Ok`. Only failures to get a response at all
/// are errors.
pub trait Transport: Send + Sync {
    /// Performs the request.
    fn get(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError>;
}
