//! Client configuration.
//!
//! A [`ClientConfig`] is validated once when it is built and is immutable
//! afterwards. Invalid host URLs and cookie prefixes are replaced with
//! defaults rather than rejected.

use std::time::Duration;

use marketprobe_core::{Diagnostics, Identity, ProxyRoute};

use crate::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use crate::guards::{
    DEFAULT_COOKIE_PREFIX, DEFAULT_HOST_URL, DEFAULT_MAX_PAYLOAD_KB, validate_cookie_prefix,
    validate_host_url,
};
use crate::host::http::DEFAULT_TIMEOUT_SECS;
use crate::recovery::RecoveryTable;
use crate::retry::BackoffPolicy;

/// Default attempts per API request.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default attempts per session bootstrap.
pub const DEFAULT_BOOTSTRAP_ATTEMPTS: u32 = 3;

// ============================================================================
// Client Config
// ============================================================================

/// Validated, immutable configuration of a request client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    host_url: String,
    cookie_prefix: String,
    max_payload_kb: u32,
    max_retries: u32,
    bootstrap_attempts: u32,
    timeout: Duration,
    backoff: BackoffPolicy,
    recovery: RecoveryTable,
    cache_capacity: usize,
    cache_ttl: Duration,
    identity: Option<Identity>,
    proxy: Option<ProxyRoute>,
    session_token: Option<String>,
    logging: bool,
}

impl ClientConfig {
    /// Creates a builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Validated host URL without trailing slash.
    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    /// Validated cookie prefix in `name=` form.
    pub fn cookie_prefix(&self) -> &str {
        &self.cookie_prefix
    }

    /// Maximum serialized parameter payload in kilobytes.
    pub fn max_payload_kb(&self) -> u32 {
        self.max_payload_kb
    }

    /// Attempts per API request.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Attempts per session bootstrap.
    pub fn bootstrap_attempts(&self) -> u32 {
        self.bootstrap_attempts
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delay policy between attempts.
    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    /// Status → recovery table.
    pub fn recovery(&self) -> &RecoveryTable {
        &self.recovery
    }

    /// Maximum number of cached responses (0 disables caching).
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// Lifetime of a cached response.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Caller-supplied identity, used instead of a pool pick.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Caller-supplied proxy route, used instead of a pool pick.
    pub fn proxy(&self) -> Option<&ProxyRoute> {
        self.proxy.as_ref()
    }

    /// Caller-supplied session token; skips the initial bootstrap.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Whether components built from this config emit diagnostics.
    pub fn logging(&self) -> bool {
        self.logging
    }

    /// Diagnostics handle for a component.
    pub fn diagnostics(&self, component: &'static str) -> Diagnostics {
        Diagnostics::new(component, self.logging)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfigBuilder::new().build()
    }
}

// ============================================================================
// Client Config Builder
// ============================================================================

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    host_url: String,
    cookie_prefix: String,
    max_payload_kb: u32,
    max_retries: u32,
    bootstrap_attempts: u32,
    timeout: Duration,
    backoff: BackoffPolicy,
    recovery: RecoveryTable,
    cache_capacity: usize,
    cache_ttl: Duration,
    max_host_len: Option<usize>,
    identity: Option<Identity>,
    proxy: Option<ProxyRoute>,
    session_token: Option<String>,
    logging: bool,
}

impl ClientConfigBuilder {
    /// Creates a builder with default values.
    pub fn new() -> Self {
        Self {
            host_url: DEFAULT_HOST_URL.to_string(),
            cookie_prefix: DEFAULT_COOKIE_PREFIX.to_string(),
            max_payload_kb: DEFAULT_MAX_PAYLOAD_KB,
            max_retries: DEFAULT_MAX_RETRIES,
            bootstrap_attempts: DEFAULT_BOOTSTRAP_ATTEMPTS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            backoff: BackoffPolicy::default(),
            recovery: RecoveryTable::standard(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
            max_host_len: None,
            identity: None,
            proxy: None,
            session_token: None,
            logging: false,
        }
    }

    /// Sets the marketplace host URL.
    #[must_use]
    pub fn host_url(mut self, url: impl Into<String>) -> Self {
        self.host_url = url.into();
        self
    }

    /// Sets the session cookie prefix.
    #[must_use]
    pub fn cookie_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cookie_prefix = prefix.into();
        self
    }

    /// Sets the maximum parameter payload in kilobytes.
    #[must_use]
    pub fn max_payload_kb(mut self, kb: u32) -> Self {
        self.max_payload_kb = kb;
        self
    }

    /// Sets the attempts per API request.
    #[must_use]
    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.max_retries = attempts;
        self
    }

    /// Sets the attempts per session bootstrap.
    #[must_use]
    pub fn bootstrap_attempts(mut self, attempts: u32) -> Self {
        self.bootstrap_attempts = attempts;
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the backoff policy.
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the recovery table.
    #[must_use]
    pub fn recovery(mut self, recovery: RecoveryTable) -> Self {
        self.recovery = recovery;
        self
    }

    /// Sets the response cache size and lifetime.
    #[must_use]
    pub fn cache(mut self, capacity: usize, ttl: Duration) -> Self {
        self.cache_capacity = capacity;
        self.cache_ttl = ttl;
        self
    }

    /// Disables the response cache.
    #[must_use]
    pub fn no_cache(self) -> Self {
        self.cache(0, Duration::ZERO)
    }

    /// Caps the host URL length; longer hosts fall back to the default.
    #[must_use]
    pub fn max_host_len(mut self, len: Option<usize>) -> Self {
        self.max_host_len = len;
        self
    }

    /// Uses a fixed initial identity.
    #[must_use]
    pub fn identity(mut self, identity: Option<Identity>) -> Self {
        self.identity = identity;
        self
    }

    /// Uses a fixed initial proxy route.
    #[must_use]
    pub fn proxy(mut self, proxy: Option<ProxyRoute>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Uses a caller-supplied session token.
    #[must_use]
    pub fn session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Enables or disables diagnostics.
    #[must_use]
    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> ClientConfig {
        let diag = Diagnostics::new("config", self.logging);
        let host_url = validate_host_url(&self.host_url, self.max_host_len, &diag);
        let cookie_prefix = validate_cookie_prefix(&self.cookie_prefix, &diag);

        ClientConfig {
            host_url,
            cookie_prefix,
            max_payload_kb: self.max_payload_kb,
            max_retries: self.max_retries,
            bootstrap_attempts: self.bootstrap_attempts,
            timeout: self.timeout,
            backoff: self.backoff,
            recovery: self.recovery,
            cache_capacity: self.cache_capacity,
            cache_ttl: self.cache_ttl,
            identity: self.identity.filter(Identity::is_valid),
            proxy: self.proxy.filter(ProxyRoute::is_valid),
            session_token: self.session_token,
            logging: self.logging,
        }
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
