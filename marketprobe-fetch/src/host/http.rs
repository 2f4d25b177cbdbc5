//! Blocking HTTP transport.
//!
//! `reqwest` binds proxies to a client at build time, so this transport
//! keeps one client per distinct proxy route and builds them lazily.
//! Every client carries the per-attempt timeout.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use marketprobe_core::ProxyRoute;
use reqwest::Proxy;
use reqwest::blocking::Client;
use tracing::{debug, instrument, warn};

use super::transport::{OutboundRequest, RawResponse, Transport};
use crate::error::TransportError;

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Reqwest Transport
// ============================================================================

/// Transport backed by blocking `reqwest` clients.
#[derive(Debug)]
pub struct ReqwestTransport {
    timeout: Duration,
    clients: Mutex<HashMap<Option<ProxyRoute>, Client>>,
}

impl ReqwestTransport {
    /// Creates a transport with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a transport with a custom per-attempt timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the client for a proxy route, building it on first use.
    fn client_for(&self, proxy: Option<&ProxyRoute>) -> Result<Client, TransportError> {
        let key = proxy.cloned();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }

        let client = build_client(self.timeout, proxy)?;
        clients.insert(key, client.clone());
        Ok(client)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(url = %request.url))]
    fn get(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        let client = self.client_for(request.proxy.as_ref())?;
        debug!(proxied = request.proxy.is_some(), "GET request");

        let response = client
            .get(request.url.clone())
            .headers(request.headers.clone())
            .send()?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();
        debug!(status, bytes = body.len(), "Response received");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Builds a client routed through `proxy`.
fn build_client(timeout: Duration, proxy: Option<&ProxyRoute>) -> Result<Client, TransportError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .deflate(true);

    if let Some(route) = proxy {
        for (scheme, uri) in route.iter() {
            let proxy = match scheme {
                "http" => Proxy::http(uri),
                "https" => Proxy::https(uri),
                "all" => Proxy::all(uri),
                other => {
                    warn!(scheme = other, "Ignoring proxy entry for unsupported scheme");
                    continue;
                }
            }
            .map_err(|e| TransportError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
    }

    builder
        .build()
        .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
