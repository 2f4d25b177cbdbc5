//! Session bootstrap.
//!
//! The marketplace hands out a session token as a cookie on its landing
//! page. [`SessionNegotiator`] requests that page with browser-like headers
//! and extracts the token, rotating credentials on the way according to the
//! [`RecoveryTable`].

use std::sync::Arc;

use marketprobe_core::Diagnostics;
use tracing::instrument;
use url::Url;

use crate::host::headers::browser_headers;
use crate::host::transport::{OutboundRequest, RawResponse, Transport};
use crate::pool::{IdentityPool, ProxyPool};
use crate::recovery::{Recovery, RecoveryTable};
use crate::retry::{AttemptBudget, BackoffPolicy};
use crate::state::ClientState;

// ============================================================================
// Token Extraction
// ============================================================================

/// Extracts the session token from a response's `Set-Cookie` headers.
///
/// The token is the text between `prefix` and the next `;` of the first
/// cookie that carries the prefix and a non-empty value.
pub fn extract_token(response: &RawResponse, prefix: &str) -> Option<String> {
    response.set_cookies().find_map(|cookie| {
        let start = cookie.find(prefix)? + prefix.len();
        let rest = &cookie[start..];
        let token = rest.split(';').next().unwrap_or_default().trim();
        (!token.is_empty()).then(|| token.to_string())
    })
}

// ============================================================================
// Session Negotiator
// ============================================================================

/// Mints session tokens against the marketplace landing page.
#[derive(Clone)]
pub struct SessionNegotiator {
    transport: Arc<dyn Transport>,
    identities: Arc<IdentityPool>,
    proxies: Arc<ProxyPool>,
    host_url: String,
    cookie_prefix: String,
    recovery: RecoveryTable,
    backoff: BackoffPolicy,
    diag: Diagnostics,
}

impl std::fmt::Debug for SessionNegotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionNegotiator")
            .field("host_url", &self.host_url)
            .field("cookie_prefix", &self.cookie_prefix)
            .field("identities", &self.identities.len())
            .field("proxies", &self.proxies.len())
            .finish_non_exhaustive()
    }
}

impl SessionNegotiator {
    /// Creates a negotiator.
    ///
    /// `host_url` and `cookie_prefix` are expected to be validated already.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transport: Arc<dyn Transport>,
        identities: Arc<IdentityPool>,
        proxies: Arc<ProxyPool>,
        host_url: impl Into<String>,
        cookie_prefix: impl Into<String>,
        recovery: RecoveryTable,
        backoff: BackoffPolicy,
        diag: Diagnostics,
    ) -> Self {
        Self {
            transport,
            identities,
            proxies,
            host_url: host_url.into(),
            cookie_prefix: cookie_prefix.into(),
            recovery,
            backoff,
            diag,
        }
    }

    /// Cookie prefix the token is extracted with.
    pub fn cookie_prefix(&self) -> &str {
        &self.cookie_prefix
    }

    /// Identity pool used for rotations.
    pub fn identities(&self) -> &IdentityPool {
        &self.identities
    }

    /// Proxy pool used for rotations.
    pub fn proxies(&self) -> &ProxyPool {
        &self.proxies
    }

    /// Mints a token within `max_attempts` bootstrap requests.
    ///
    /// Identity and proxy rotations are written back to `state`. Returns
    /// `None` once the attempts are used up.
    pub fn acquire(&self, state: &mut ClientState, max_attempts: u32) -> Option<String> {
        let mut budget = AttemptBudget::new(max_attempts);
        self.acquire_with_budget(state, &mut budget)
    }

    /// Mints a token drawing attempts from a shared budget.
    ///
    /// Bootstrap requests never carry the session held in `state`: a caller
    /// only bootstraps once that token is missing or expired. A 401 during
    /// bootstrap is retried from scratch, still within `budget`.
    #[instrument(skip_all, fields(host = %self.host_url))]
    pub fn acquire_with_budget(
        &self,
        state: &mut ClientState,
        budget: &mut AttemptBudget,
    ) -> Option<String> {
        let url = match Url::parse(&self.host_url) {
            Ok(url) => url,
            Err(e) => {
                self.diag
                    .error(format!("Cannot bootstrap against {:?}: {e}", self.host_url));
                return None;
            }
        };

        while let Some(attempt) = budget.try_take() {
            let request = OutboundRequest {
                url: url.clone(),
                headers: browser_headers(state.identity(), &self.host_url, None),
                proxy: state.proxy.clone(),
            };

            match self.transport.get(&request) {
                Ok(response) if response.is_ok() => {
                    if let Some(token) = extract_token(&response, &self.cookie_prefix) {
                        self.diag.info("Successfully fetched session cookie.");
                        return Some(token);
                    }
                    self.diag.warn("Invalid session cookie. Retrying...");
                }
                Ok(response) => self.recover(response.status, state),
                Err(e) => {
                    self.diag
                        .warn(format!("Request failed (attempt {attempt}): {e}. Retrying..."));
                }
            }

            if !budget.is_exhausted() {
                self.backoff.wait(attempt);
            }
        }

        self.diag.error(format!(
            "Failed to fetch session cookie after {} attempts. Returning None.",
            budget.used()
        ));
        None
    }

    /// Applies the table's recovery for `status` to `state`.
    fn recover(&self, status: u16, state: &mut ClientState) {
        let recovery = self.recovery.lookup(status);
        self.diag.warn(format!(
            "Bootstrap returned {status} ({}). Will {recovery}.",
            recovery.reason()
        ));
        rotate(recovery, state, &self.identities, &self.proxies, &self.diag);
    }
}

/// Performs an identity or proxy rotation on `state`.
///
/// When the pool has nothing to offer the current credential stays in
/// place. Session refreshes are left to the caller.
pub(crate) fn rotate(
    recovery: Recovery,
    state: &mut ClientState,
    identities: &IdentityPool,
    proxies: &ProxyPool,
    diag: &Diagnostics,
) {
    match recovery {
        Recovery::RotateIdentity => match identities.pick() {
            Some(identity) => state.identity = Some(identity),
            None => diag.warn("Keeping current identity."),
        },
        Recovery::RotateProxy => match proxies.pick() {
            Some(proxy) => state.proxy = Some(proxy),
            None => diag.warn("Keeping current proxy route."),
        },
        Recovery::RefreshSession | Recovery::Retry => {}
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::scripted::ScriptedTransport;
    use marketprobe_core::{Identity, ProxyRoute, Session};
    use reqwest::header::{COOKIE, USER_AGENT};

    fn negotiator(transport: Arc<ScriptedTransport>, identities: &[&str]) -> SessionNegotiator {
        negotiator_with_proxies(transport, identities, None)
    }

    fn negotiator_with_proxies(
        transport: Arc<ScriptedTransport>,
        identities: &[&str],
        proxies: Option<Vec<ProxyRoute>>,
    ) -> SessionNegotiator {
        let diag = Diagnostics::disabled("session");
        let identities = identities.iter().map(|s| Identity::new(*s)).collect();
        SessionNegotiator::new(
            transport,
            Arc::new(IdentityPool::from_entries(Some(identities), diag)),
            Arc::new(ProxyPool::from_entries(proxies, diag)),
            "https://www.vinted.com",
            "token=",
            RecoveryTable::standard(),
            BackoffPolicy::None,
            diag,
        )
    }

    fn cookie_response(value: &str) -> RawResponse {
        let transport = ScriptedTransport::new().then_cookie(200, value);
        transport
            .get(&OutboundRequest::get(Url::parse("https://x.io").unwrap()))
            .unwrap()
    }

    #[test]
    fn test_extract_token() {
        let response = cookie_response("token=XYZ123; Path=/; HttpOnly");
        assert_eq!(extract_token(&response, "token="), Some("XYZ123".to_string()));
        assert_eq!(extract_token(&response, "other="), None);
    }

    #[test]
    fn test_extract_empty_token_is_none() {
        let response = cookie_response("token=; Path=/");
        assert_eq!(extract_token(&response, "token="), None);
    }

    #[test]
    fn test_acquire_first_attempt() {
        let transport = Arc::new(ScriptedTransport::new().then_cookie(200, "token=XYZ123; Path=/"));
        let negotiator = negotiator(transport.clone(), &["A"]);
        let mut state = ClientState::new(Some(Identity::new("A")), None, None);

        assert_eq!(negotiator.acquire(&mut state, 3), Some("XYZ123".to_string()));
        assert_eq!(transport.call_count(), 1);

        let request = &transport.requests()[0];
        assert_eq!(request.header(USER_AGENT.as_str()), Some("A"));
        assert!(request.header(COOKIE.as_str()).is_none());
        assert!(request.proxy.is_none());
    }

    #[test]
    fn test_missing_cookie_retries_then_gives_up() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(200)
                .then_status(200)
                .then_status(200),
        );
        let negotiator = negotiator(transport.clone(), &["A"]);
        let mut state = ClientState::default();

        assert_eq!(negotiator.acquire(&mut state, 3), None);
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_forbidden_rotates_identity() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(403)
                .then_cookie(200, "token=T; Path=/"),
        );
        let negotiator = negotiator(transport.clone(), &["B"]);
        let mut state = ClientState::new(Some(Identity::new("A")), None, None);

        assert_eq!(negotiator.acquire(&mut state, 3), Some("T".to_string()));
        assert_eq!(state.identity(), Some(&Identity::new("B")));

        let requests = transport.requests();
        assert_eq!(requests[0].header("user-agent"), Some("A"));
        assert_eq!(requests[1].header("user-agent"), Some("B"));
    }

    #[test]
    fn test_bootstrap_never_sends_held_session() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(401)
                .then_cookie(200, "token=FRESH; Path=/"),
        );
        let negotiator = negotiator(transport.clone(), &["A"]);
        let mut state = ClientState::new(None, None, Some(Session::new("OLD", "token=")));

        assert_eq!(negotiator.acquire(&mut state, 3), Some("FRESH".to_string()));

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].header("cookie").is_none());
        assert!(requests[1].header("cookie").is_none());
    }

    #[test]
    fn test_bad_request_rotates_identity() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(400)
                .then_cookie(200, "token=T; Path=/"),
        );
        let negotiator = negotiator(transport.clone(), &["B"]);
        let mut state = ClientState::new(Some(Identity::new("A")), None, None);

        assert_eq!(negotiator.acquire(&mut state, 3), Some("T".to_string()));
        assert_eq!(state.identity(), Some(&Identity::new("B")));

        let requests = transport.requests();
        assert_eq!(requests[0].header("user-agent"), Some("A"));
        assert_eq!(requests[1].header("user-agent"), Some("B"));
    }

    #[test]
    fn test_gateway_failure_rotates_proxy() {
        let p1 = ProxyRoute::uniform("http://proxy-1:3128");
        let p2 = ProxyRoute::uniform("http://proxy-2:3128");

        for status in [407, 502, 504] {
            let transport = Arc::new(
                ScriptedTransport::new()
                    .then_status(status)
                    .then_cookie(200, "token=T; Path=/"),
            );
            let negotiator =
                negotiator_with_proxies(transport.clone(), &["B"], Some(vec![p2.clone()]));
            let mut state = ClientState::new(Some(Identity::new("A")), Some(p1.clone()), None);

            assert_eq!(negotiator.acquire(&mut state, 3), Some("T".to_string()), "status {status}");
            assert_eq!(state.proxy(), Some(&p2), "status {status}");
            assert_eq!(state.identity(), Some(&Identity::new("A")), "status {status}");

            let requests = transport.requests();
            assert_eq!(requests[0].proxy.as_ref(), Some(&p1), "status {status}");
            assert_eq!(requests[1].proxy.as_ref(), Some(&p2), "status {status}");
        }
    }

    #[test]
    fn test_gateway_failure_without_proxies_keeps_route() {
        let p1 = ProxyRoute::uniform("http://proxy-1:3128");
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(502)
                .then_cookie(200, "token=T; Path=/"),
        );
        let negotiator = negotiator(transport.clone(), &["A"]);
        let mut state = ClientState::new(None, Some(p1.clone()), None);

        assert_eq!(negotiator.acquire(&mut state, 3), Some("T".to_string()));
        assert_eq!(state.proxy(), Some(&p1));
    }

    #[test]
    fn test_repeated_401_stays_within_budget() {
        let transport = Arc::new(ScriptedTransport::new().otherwise(
            crate::host::scripted::Scripted::Response(RawResponse::new(401, Vec::new())),
        ));
        let negotiator = negotiator(transport.clone(), &["A"]);
        let mut state = ClientState::new(None, None, Some(Session::new("OLD", "token=")));

        assert_eq!(negotiator.acquire(&mut state, 3), None);
        assert_eq!(transport.call_count(), 3);
    }

    #[test]
    fn test_shared_budget_is_respected() {
        let transport = Arc::new(ScriptedTransport::new().then_status(500).then_status(500));
        let negotiator = negotiator(transport.clone(), &["A"]);
        let mut state = ClientState::default();
        let mut budget = AttemptBudget::new(2);

        assert_eq!(negotiator.acquire_with_budget(&mut state, &mut budget), None);
        assert!(budget.is_exhausted());
        assert_eq!(negotiator.acquire_with_budget(&mut state, &mut budget), None);
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_zero_attempts_makes_no_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let negotiator = negotiator(transport.clone(), &["A"]);
        assert_eq!(negotiator.acquire(&mut ClientState::default(), 0), None);
        assert_eq!(transport.call_count(), 0);
    }
}
