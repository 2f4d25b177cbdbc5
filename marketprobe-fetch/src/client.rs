//! Retrying API client.
//!
//! [`RequestClient`] owns the credential state of one logical scraper. Every
//! fetch runs the same loop: check the payload size, consult the cache,
//! send, and on a failure status apply the [`RecoveryTable`] rotation
//! before trying again. Nothing here returns an error to the caller; the
//! worst case is [`empty_result`].

use std::sync::Arc;

use marketprobe_core::{Diagnostics, IdentitySource, Params, ProxySource, Session};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, instrument};
use url::Url;

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::error::RequestBuildError;
use crate::guards::validate_payload_size;
use crate::host::headers::session_headers;
use crate::host::http::ReqwestTransport;
use crate::host::transport::{OutboundRequest, Transport};
use crate::pool::{IdentityPool, ProxyPool};
use crate::recovery::Recovery;
use crate::retry::AttemptBudget;
use crate::session::{SessionNegotiator, rotate};
use crate::state::ClientState;

/// Path prefix of every API endpoint.
pub const API_PREFIX: &str = "/api/v2";

/// The sentinel returned when a fetch cannot produce a body.
pub fn empty_result() -> Value {
    json!({ "items": [] })
}

// ============================================================================
// Fetch Report
// ============================================================================

/// How a fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// A 200 response with a JSON body.
    Success,
    /// Served from the response cache.
    Cached,
    /// Parameters exceeded the payload limit; nothing was sent.
    PayloadTooLarge,
    /// The request URL could not be assembled; nothing was sent.
    InvalidUrl,
    /// Every attempt failed.
    Exhausted,
}

impl FetchOutcome {
    /// Returns true if the body came from the marketplace or the cache.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::Cached)
    }
}

/// Body of a fetch together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchReport {
    /// Parsed JSON body, or [`empty_result`].
    pub body: Value,
    /// Network attempts made.
    pub attempts: u32,
    /// How the fetch ended.
    pub outcome: FetchOutcome,
}

impl FetchReport {
    fn new(body: Value, attempts: u32, outcome: FetchOutcome) -> Self {
        Self {
            body,
            attempts,
            outcome,
        }
    }

    fn empty(attempts: u32, outcome: FetchOutcome) -> Self {
        Self::new(empty_result(), attempts, outcome)
    }
}

// ============================================================================
// Request Client
// ============================================================================

/// Client for the marketplace API.
///
/// Not shareable across threads without external locking: fetches take
/// `&mut self` because they rotate credentials in place.
pub struct RequestClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    negotiator: SessionNegotiator,
    state: ClientState,
    cache: ResponseCache,
    diag: Diagnostics,
}

impl std::fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestClient")
            .field("host_url", &self.config.host_url())
            .field("state", &self.state)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl RequestClient {
    /// Creates a builder.
    pub fn builder(config: ClientConfig) -> RequestClientBuilder {
        RequestClientBuilder::new(config)
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current identity, proxy route and session.
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Replaces the session token, or clears it with `None`.
    pub fn set_session_token(&mut self, token: Option<String>) {
        self.state.session = token
            .filter(|t| !t.is_empty())
            .map(|t| Session::new(t, self.config.cookie_prefix()));
    }

    /// Mints a new session within the bootstrap attempt limit.
    ///
    /// Returns true if a token was obtained. On failure the client keeps
    /// going without a session.
    pub fn refresh_session(&mut self) -> bool {
        let mut budget = AttemptBudget::new(self.config.bootstrap_attempts());
        self.refresh_session_with(&mut budget)
    }

    /// Drops every cached response.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Fetches an endpoint with the configured attempt limit.
    pub fn fetch(&mut self, endpoint: &str, params: &Params) -> Value {
        self.fetch_detailed(endpoint, params, self.config.max_retries())
            .body
    }

    /// Fetches an endpoint with a custom attempt limit.
    pub fn fetch_with_attempts(&mut self, endpoint: &str, params: &Params, max_attempts: u32) -> Value {
        self.fetch_detailed(endpoint, params, max_attempts).body
    }

    /// Fetches an endpoint and reports how the body was obtained.
    #[instrument(skip(self, params), fields(endpoint = %endpoint))]
    pub fn fetch_detailed(
        &mut self,
        endpoint: &str,
        params: &Params,
        max_attempts: u32,
    ) -> FetchReport {
        let check = validate_payload_size(params, self.config.max_payload_kb(), &self.diag);
        if !check.ok {
            self.diag.error(format!(
                "Request size too large: {:.2} KB. Returning empty result.",
                check.size_kb
            ));
            return FetchReport::empty(0, FetchOutcome::PayloadTooLarge);
        }

        if let Some(body) = self.cache.get(endpoint, params) {
            debug!("Cache hit");
            return FetchReport::new(body, 0, FetchOutcome::Cached);
        }

        let url = match self.endpoint_url(endpoint, params) {
            Ok(url) => url,
            Err(e) => {
                self.diag
                    .error(format!("Cannot build URL for {endpoint:?}: {e}"));
                return FetchReport::empty(0, FetchOutcome::InvalidUrl);
            }
        };

        let mut budget = AttemptBudget::new(max_attempts);
        while let Some(attempt) = budget.try_take() {
            let request = OutboundRequest {
                url: url.clone(),
                headers: session_headers(
                    self.state.identity(),
                    self.config.host_url(),
                    self.state.session(),
                ),
                proxy: self.state.proxy.clone(),
            };

            match self.transport.get(&request) {
                Ok(response) if response.is_ok() => match response.json::<Value>() {
                    Ok(body) => {
                        self.diag
                            .debug(format!("Fetched {endpoint} on attempt {attempt}"));
                        self.cache.insert(endpoint, params, body.clone());
                        return FetchReport::new(body, attempt, FetchOutcome::Success);
                    }
                    Err(e) => {
                        self.diag
                            .warn(format!("Response body is not valid JSON: {e}. Retrying..."));
                    }
                },
                Ok(response) => self.recover(response.status),
                Err(e) => {
                    self.diag
                        .warn(format!("Request failed (attempt {attempt}): {e}. Retrying..."));
                }
            }

            if !budget.is_exhausted() {
                self.config.backoff().wait(attempt);
            }
        }

        self.diag.error(format!(
            "All {} attempts to fetch {endpoint} failed. Returning empty result.",
            budget.used()
        ));
        FetchReport::empty(budget.used(), FetchOutcome::Exhausted)
    }

    /// Builds `{host}/api/v2{endpoint}?{params}`.
    fn endpoint_url(&self, endpoint: &str, params: &Params) -> Result<Url, RequestBuildError> {
        let mut url = Url::parse(&format!("{}{API_PREFIX}{endpoint}", self.config.host_url()))?;
        let pairs = params.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Applies the table's recovery for `status`.
    fn recover(&mut self, status: u16) {
        let recovery = self.config.recovery().lookup(status);
        self.diag.warn(format!(
            "Request returned {status} ({}). Will {recovery}.",
            recovery.reason()
        ));

        match recovery {
            Recovery::RefreshSession => {
                self.refresh_session();
            }
            other => rotate(
                other,
                &mut self.state,
                self.negotiator.identities(),
                self.negotiator.proxies(),
                &self.diag,
            ),
        }
    }

    fn refresh_session_with(&mut self, budget: &mut AttemptBudget) -> bool {
        match self.negotiator.acquire_with_budget(&mut self.state, budget) {
            Some(token) => {
                self.state.session = Some(Session::new(token, self.negotiator.cookie_prefix()));
                true
            }
            None => {
                self.state.session = None;
                false
            }
        }
    }
}

// ============================================================================
// Request Client Builder
// ============================================================================

/// Builder for [`RequestClient`].
pub struct RequestClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    identities: Option<IdentityPool>,
    proxies: Option<ProxyPool>,
}

impl RequestClientBuilder {
    /// Creates a builder for a validated configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            identities: None,
            proxies: None,
        }
    }

    /// Uses a custom transport instead of `reqwest`.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses a ready-made identity pool.
    #[must_use]
    pub fn identity_pool(mut self, pool: IdentityPool) -> Self {
        self.identities = Some(pool);
        self
    }

    /// Loads the identity pool from a source.
    #[must_use]
    pub fn identities(self, source: &dyn IdentitySource) -> Self {
        let pool = IdentityPool::load(source, self.config.diagnostics("identity-pool"));
        self.identity_pool(pool)
    }

    /// Uses a ready-made proxy pool.
    #[must_use]
    pub fn proxy_pool(mut self, pool: ProxyPool) -> Self {
        self.proxies = Some(pool);
        self
    }

    /// Loads the proxy pool from a source.
    #[must_use]
    pub fn proxies(self, source: &dyn ProxySource) -> Self {
        let pool = ProxyPool::load(source, self.config.diagnostics("proxy-pool"));
        self.proxy_pool(pool)
    }

    /// Builds the client.
    ///
    /// The initial identity and proxy come from the configuration or a pool
    /// pick. A session is minted right away unless the configuration
    /// carries a token.
    pub fn build(self) -> RequestClient {
        let config = self.config;
        let diag = config.diagnostics("client");

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::with_timeout(config.timeout())));
        let identities = self
            .identities
            .unwrap_or_else(|| IdentityPool::absent(config.diagnostics("identity-pool")));
        let proxies = self
            .proxies
            .unwrap_or_else(|| ProxyPool::absent(config.diagnostics("proxy-pool")));

        let identity = config.identity().cloned().or_else(|| identities.pick());
        let proxy = config.proxy().cloned().or_else(|| proxies.pick());
        let session = config
            .session_token()
            .map(|token| Session::new(token, config.cookie_prefix()));

        let negotiator = SessionNegotiator::new(
            Arc::clone(&transport),
            Arc::new(identities),
            Arc::new(proxies),
            config.host_url(),
            config.cookie_prefix(),
            config.recovery().clone(),
            config.backoff().clone(),
            config.diagnostics("session"),
        );

        let cache = ResponseCache::new(config.cache_capacity(), config.cache_ttl());
        let mut client = RequestClient {
            state: ClientState::new(identity, proxy, session),
            config,
            transport,
            negotiator,
            cache,
            diag,
        };

        if !client.state.has_session() && !client.refresh_session() {
            client
                .diag
                .warn("No session token acquired. Continuing without one.");
        }

        client
    }
}

// ============================================================================
// Tests
// ============================================================================
