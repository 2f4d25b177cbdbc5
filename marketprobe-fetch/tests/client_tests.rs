//! Integration tests for the request client retry loop.

use std::sync::Arc;
use std::time::Duration;

use marketprobe_core::{Diagnostics, Identity, Params, ProxyRoute};
use marketprobe_fetch::{
    BackoffPolicy, ClientConfig, ClientConfigBuilder, FetchOutcome, IdentityPool, ProxyPool,
    RawResponse, RequestClient, Scripted, ScriptedTransport, TransportError, empty_result,
};
use serde_json::json;

const ENDPOINT: &str = "/catalog/items";

fn base_config() -> ClientConfigBuilder {
    ClientConfig::builder()
        .backoff(BackoffPolicy::None)
        .session_token(Some("TOKEN".to_string()))
        .identity(Some(Identity::new("A")))
        .proxy(Some(ProxyRoute::uniform("http://proxy-1:3128")))
}

fn identity_pool(entries: &[&str]) -> IdentityPool {
    IdentityPool::from_entries(
        Some(entries.iter().map(|s| Identity::new(*s)).collect()),
        Diagnostics::disabled("identity-pool"),
    )
}

fn proxy_pool(uri: &str) -> ProxyPool {
    ProxyPool::from_entries(
        Some(vec![ProxyRoute::uniform(uri)]),
        Diagnostics::disabled("proxy-pool"),
    )
}

fn client(config: ClientConfigBuilder, transport: &Arc<ScriptedTransport>) -> RequestClient {
    RequestClient::builder(config.build())
        .transport(transport.clone())
        .identity_pool(identity_pool(&["B"]))
        .proxy_pool(proxy_pool("http://proxy-2:3128"))
        .build()
}

fn ok_page() -> serde_json::Value {
    json!({"items": [{"id": 1}]})
}

#[test]
fn test_success_on_first_attempt() {
    let transport = Arc::new(ScriptedTransport::new().then_json(200, &ok_page()));
    let mut client = client(base_config(), &transport);

    let report = client.fetch_detailed(ENDPOINT, &Params::new().with("page", 1), 3);
    assert_eq!(report.outcome, FetchOutcome::Success);
    assert_eq!(report.attempts, 1);
    assert_eq!(report.body, ok_page());

    let request = &transport.requests()[0];
    assert_eq!(
        request.url.as_str(),
        "https://www.vinted.com/api/v2/catalog/items?page=1"
    );
    assert_eq!(request.header("user-agent"), Some("A"));
    assert_eq!(request.header("cookie"), Some("access_token_web=TOKEN"));
    assert_eq!(request.header("referer"), Some("https://www.vinted.com"));
    assert_eq!(request.header("connection"), Some("close"));
}

#[test]
fn test_identity_rejection_rotates_identity() {
    for status in [400, 403] {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(status)
                .then_json(200, &ok_page()),
        );
        let mut client = client(base_config(), &transport);

        assert_eq!(client.fetch(ENDPOINT, &Params::new()), ok_page());

        let requests = transport.requests();
        assert_eq!(requests.len(), 2, "status {status}");
        assert_eq!(requests[0].header("user-agent"), Some("A"));
        assert_eq!(requests[1].header("user-agent"), Some("B"), "status {status}");
        assert_eq!(requests[0].proxy, requests[1].proxy, "status {status}");
        assert_eq!(client.state().identity(), Some(&Identity::new("B")));
    }
}

#[test]
fn test_gateway_failure_rotates_proxy() {
    for status in [407, 502, 504] {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(status)
                .then_json(200, &ok_page()),
        );
        let mut client = client(base_config(), &transport);

        assert_eq!(client.fetch(ENDPOINT, &Params::new()), ok_page());

        let requests = transport.requests();
        assert_eq!(
            requests[0].proxy,
            Some(ProxyRoute::uniform("http://proxy-1:3128"))
        );
        assert_eq!(
            requests[1].proxy,
            Some(ProxyRoute::uniform("http://proxy-2:3128")),
            "status {status}"
        );
        assert_eq!(requests[1].header("user-agent"), Some("A"), "status {status}");
    }
}

#[test]
fn test_unauthorized_refreshes_session() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_status(401)
            .then_cookie(200, "access_token_web=FRESH; Path=/; HttpOnly")
            .then_json(200, &ok_page()),
    );
    let mut client = client(base_config(), &transport);

    let report = client.fetch_detailed(ENDPOINT, &Params::new(), 3);
    assert_eq!(report.outcome, FetchOutcome::Success);
    assert_eq!(report.attempts, 2);

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].header("cookie"), Some("access_token_web=TOKEN"));
    assert_eq!(requests[1].url.as_str(), "https://www.vinted.com/");
    assert!(requests[1].header("cookie").is_none());
    assert_eq!(requests[2].header("cookie"), Some("access_token_web=FRESH"));
    assert_eq!(client.state().token(), Some("FRESH"));
}

#[test]
fn test_other_statuses_do_not_rotate() {
    for status in [404, 429, 500, 503] {
        let transport = Arc::new(
            ScriptedTransport::new()
                .then_status(status)
                .then_json(200, &ok_page()),
        );
        let mut client = client(base_config(), &transport);

        assert_eq!(client.fetch(ENDPOINT, &Params::new()), ok_page());

        let requests = transport.requests();
        assert_eq!(requests.len(), 2, "status {status}");
        assert_eq!(requests[0].headers, requests[1].headers, "status {status}");
        assert_eq!(requests[0].proxy, requests[1].proxy, "status {status}");
    }
}

#[test]
fn test_persistent_transport_failure_exhausts() {
    let transport = Arc::new(
        ScriptedTransport::new().otherwise(Scripted::Failure(TransportError::Timeout)),
    );
    let mut client = client(base_config(), &transport);

    let report = client.fetch_detailed(ENDPOINT, &Params::new(), 4);
    assert_eq!(report.outcome, FetchOutcome::Exhausted);
    assert_eq!(report.attempts, 4);
    assert_eq!(report.body, empty_result());
    assert_eq!(transport.call_count(), 4);
}

#[test]
fn test_default_attempt_limit() {
    let transport = Arc::new(
        ScriptedTransport::new().otherwise(Scripted::Response(RawResponse::new(500, Vec::new()))),
    );
    let mut client = client(base_config(), &transport);

    assert_eq!(client.fetch(ENDPOINT, &Params::new()), empty_result());
    assert_eq!(transport.call_count(), 3);
}

#[test]
fn test_oversized_payload_makes_no_call() {
    let transport = Arc::new(ScriptedTransport::new().then_json(200, &ok_page()));
    let mut client = client(base_config(), &transport);
    let params = Params::new().with("search_text", "x".repeat(5 * 1024));

    let report = client.fetch_detailed(ENDPOINT, &params, 3);
    assert_eq!(report.outcome, FetchOutcome::PayloadTooLarge);
    assert_eq!(report.body, json!({"items": []}));
    assert_eq!(report.attempts, 0);
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_bootstrap_mints_session_at_build() {
    let transport = Arc::new(ScriptedTransport::new().then_cookie(200, "token=XYZ123; Path=/"));
    let config = ClientConfig::builder()
        .backoff(BackoffPolicy::None)
        .cookie_prefix("token=")
        .build();

    let client = RequestClient::builder(config)
        .transport(transport.clone())
        .identity_pool(identity_pool(&["A"]))
        .build();

    assert_eq!(client.state().token(), Some("XYZ123"));
    assert_eq!(client.state().identity(), Some(&Identity::new("A")));
    assert!(client.state().proxy().is_none());

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].header("user-agent"), Some("A"));
    assert!(requests[0].proxy.is_none());
}

#[test]
fn test_failed_bootstrap_leaves_client_usable() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_status(500)
            .then_status(500)
            .then_status(500)
            .then_json(200, &ok_page()),
    );
    let config = ClientConfig::builder().backoff(BackoffPolicy::None).build();
    let mut client = RequestClient::builder(config)
        .transport(transport.clone())
        .build();

    assert!(!client.state().has_session());
    assert!(client.state().identity().is_none());
    assert_eq!(client.fetch(ENDPOINT, &Params::new()), ok_page());

    let requests = transport.requests();
    assert_eq!(requests.len(), 4);
    assert!(requests[3].header("cookie").is_none());
    assert!(requests[3].header("user-agent").is_none());
}

#[test]
fn test_nested_unauthorized_stays_within_budget() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_status(401)
            .then_status(401)
            .then_status(401)
            .then_status(401)
            .then_json(200, &ok_page()),
    );
    let mut client = client(base_config().bootstrap_attempts(3), &transport);

    let report = client.fetch_detailed(ENDPOINT, &Params::new(), 3);
    assert_eq!(report.outcome, FetchOutcome::Success);
    assert_eq!(report.attempts, 2);

    // One API call, three bootstrap calls, one API call.
    let requests = transport.requests();
    assert_eq!(requests.len(), 5);
    assert_eq!(requests[0].header("cookie"), Some("access_token_web=TOKEN"));
    assert!(requests[1].header("cookie").is_none());
    assert!(requests[2].header("cookie").is_none());
    assert!(requests[3].header("cookie").is_none());
    assert!(requests[4].header("cookie").is_none());
    assert!(!client.state().has_session());
}

#[test]
fn test_cache_hit_makes_no_call() {
    let transport = Arc::new(ScriptedTransport::new().then_json(200, &ok_page()));
    let mut client = client(base_config(), &transport);
    let params = Params::new().with("search_text", "jacket");

    let first = client.fetch_detailed(ENDPOINT, &params, 3);
    let second = client.fetch_detailed(ENDPOINT, &params, 3);

    assert_eq!(first.outcome, FetchOutcome::Success);
    assert_eq!(second.outcome, FetchOutcome::Cached);
    assert_eq!(second.attempts, 0);
    assert_eq!(second.body, ok_page());
    assert_eq!(transport.call_count(), 1);
}

#[test]
fn test_disabled_cache_refetches() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_json(200, &ok_page())
            .then_json(200, &json!({"items": []})),
    );
    let mut client = client(base_config().no_cache(), &transport);

    client.fetch(ENDPOINT, &Params::new());
    assert_eq!(client.fetch(ENDPOINT, &Params::new()), json!({"items": []}));
    assert_eq!(transport.call_count(), 2);
}

#[test]
fn test_expired_cache_entry_is_refetched() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_json(200, &ok_page())
            .then_json(200, &json!({"items": [{"id": 2}]})),
    );
    let mut client = client(
        base_config().cache(10, Duration::from_millis(20)),
        &transport,
    );

    client.fetch(ENDPOINT, &Params::new());
    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(
        client.fetch(ENDPOINT, &Params::new()),
        json!({"items": [{"id": 2}]})
    );
    assert_eq!(transport.call_count(), 2);
}

#[test]
fn test_failures_are_not_cached() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_status(500)
            .then_json(200, &ok_page()),
    );
    let mut client = client(base_config(), &transport);

    assert_eq!(client.fetch_with_attempts(ENDPOINT, &Params::new(), 1), empty_result());
    assert_eq!(client.fetch_with_attempts(ENDPOINT, &Params::new(), 1), ok_page());
}

#[test]
fn test_invalid_host_uses_default() {
    let transport = Arc::new(ScriptedTransport::new().then_json(200, &ok_page()));
    let mut client = client(base_config().host_url("not-a-url"), &transport);

    client.fetch("/items/42", &Params::new());
    assert_eq!(
        transport.requests()[0].url.as_str(),
        "https://www.vinted.com/api/v2/items/42"
    );
}

#[test]
fn test_empty_pools_keep_current_credentials() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_status(403)
            .then_status(502)
            .then_json(200, &ok_page()),
    );
    let mut client = RequestClient::builder(base_config().build())
        .transport(transport.clone())
        .build();

    assert_eq!(client.fetch(ENDPOINT, &Params::new()), ok_page());
    let requests = transport.requests();
    assert_eq!(requests[2].header("user-agent"), Some("A"));
    assert_eq!(
        requests[2].proxy,
        Some(ProxyRoute::uniform("http://proxy-1:3128"))
    );
}
