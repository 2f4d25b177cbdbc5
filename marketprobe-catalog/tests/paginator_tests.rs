//! Integration tests for catalog pagination.

use std::collections::VecDeque;
use std::sync::Arc;

use marketprobe_catalog::{PageSource, SearchPaginator};
use marketprobe_core::{Diagnostics, Params, StopReason};
use marketprobe_fetch::{
    BackoffPolicy, ClientConfig, FetchOutcome, FetchReport, RequestClient, ScriptedTransport,
    empty_result,
};
use serde_json::{Value, json};

/// Page source replaying canned reports and recording every call.
struct FakeSource {
    replies: VecDeque<FetchReport>,
    calls: Vec<(String, Params)>,
}

impl FakeSource {
    fn with_bodies(bodies: Vec<Value>) -> Self {
        Self {
            replies: bodies
                .into_iter()
                .map(|body| FetchReport {
                    body,
                    attempts: 1,
                    outcome: FetchOutcome::Success,
                })
                .collect(),
            calls: Vec::new(),
        }
    }

    fn then_exhausted(mut self) -> Self {
        self.replies.push_back(FetchReport {
            body: empty_result(),
            attempts: 3,
            outcome: FetchOutcome::Exhausted,
        });
        self
    }
}

impl PageSource for FakeSource {
    fn fetch_page(&mut self, endpoint: &str, params: &Params) -> FetchReport {
        self.calls.push((endpoint.to_string(), params.clone()));
        self.replies.pop_front().unwrap_or(FetchReport {
            body: empty_result(),
            attempts: 3,
            outcome: FetchOutcome::Exhausted,
        })
    }
}

fn paginator(source: FakeSource) -> SearchPaginator<FakeSource> {
    SearchPaginator::new(source, Diagnostics::disabled("search"))
}

fn item(id: u64) -> Value {
    json!({"id": id, "user": {"profile_url": format!("https://www.vinted.com/member/{id}")}})
}

#[test]
fn test_non_positive_page_limit_fetches_nothing() {
    for limit in [0, -1, -50] {
        let mut paginator = paginator(FakeSource::with_bodies(vec![json!({"items": [item(1)]})]));
        let result = paginator.search(&Params::new(), limit);

        assert!(result.is_empty());
        assert_eq!(result.pages_fetched, 0);
        assert!(paginator.source().calls.is_empty());
    }
}

#[test]
fn test_stops_on_first_empty_page() {
    let mut paginator = paginator(FakeSource::with_bodies(vec![
        json!({"items": [item(1), item(2)]}),
        json!({"items": [item(3)]}),
        json!({"items": []}),
        json!({"items": [item(4)]}),
    ]));

    let result = paginator.search(&Params::new().with("search_text", "shoes"), 10);

    let ids: Vec<_> = result.items.iter().map(|i| i["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(result.stop_reason, StopReason::LastPage);
    assert_eq!(result.pages_fetched, 3);

    let calls = &paginator.source().calls;
    assert_eq!(calls.len(), 3);
    for (index, (endpoint, params)) in calls.iter().enumerate() {
        assert_eq!(endpoint, "/catalog/items");
        assert_eq!(params.get("page"), Some(&json!(index + 1)));
        assert_eq!(params.get("search_text"), Some(&json!("shoes")));
    }
}

#[test]
fn test_page_limit_is_respected() {
    let mut paginator = paginator(FakeSource::with_bodies(vec![
        json!({"items": [item(1)]}),
        json!({"items": [item(2)]}),
        json!({"items": [item(3)]}),
    ]));

    let result = paginator.search(&Params::new(), 2);
    assert_eq!(result.len(), 2);
    assert_eq!(result.stop_reason, StopReason::PageLimit);
    assert_eq!(paginator.source().calls.len(), 2);
}

#[test]
fn test_enrichment_and_truncation_boundary() {
    let mut paginator = paginator(FakeSource::with_bodies(vec![
        json!({"items": [item(1), {"id": 2, "user": {}}, item(3)]}),
        json!({"items": [item(4)]}),
        json!({"items": []}),
    ]));

    let result = paginator.search(&Params::new(), 5);

    let ids: Vec<_> = result.items.iter().map(|i| i["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(4)]);
    assert_eq!(
        result.items[0]["user"]["feedback_url"],
        "https://www.vinted.com/member/1?tab=feedback"
    );
    assert_eq!(result.raw_count, 4);
    assert_eq!(result.dropped(), 2);
}

#[test]
fn test_items_without_seller_are_kept() {
    let mut paginator = paginator(FakeSource::with_bodies(vec![
        json!({"items": [{"id": 1}, 7, item(2)]}),
        json!({"items": []}),
    ]));

    let result = paginator.search(&Params::new(), 3);
    assert_eq!(result.len(), 3);
    assert!(result.items[0].get("user").is_none());
    assert_eq!(result.items[1], json!(7));
}

#[test]
fn test_exhausted_client_stops_search() {
    let source = FakeSource::with_bodies(vec![json!({"items": [item(1)]})]).then_exhausted();
    let mut paginator = paginator(source);

    let result = paginator.search(&Params::new(), 5);
    assert_eq!(result.len(), 1);
    assert_eq!(result.stop_reason, StopReason::EmptyResponse);
    assert_eq!(paginator.source().calls.len(), 2);
}

#[test]
fn test_malformed_response_stops_search() {
    for body in [json!({"data": []}), json!({"items": "nope"}), json!(null)] {
        let source = FakeSource::with_bodies(vec![json!({"items": [item(1)]}), body]);
        let mut paginator = paginator(source);

        let result = paginator.search(&Params::new(), 5);
        assert_eq!(result.len(), 1);
        assert_eq!(result.stop_reason, StopReason::MalformedResponse);
        assert_eq!(paginator.source().calls.len(), 2);
    }
}

#[test]
fn test_caller_params_are_not_mutated() {
    let params = Params::new().with("search_text", "coat");
    let mut paginator = paginator(FakeSource::with_bodies(vec![json!({"items": []})]));

    paginator.search(&params, 1);
    assert!(params.get("page").is_none());
}

#[test]
fn test_item_lookup() {
    let mut paginator = paginator(FakeSource::with_bodies(vec![
        json!({"item": {"id": 42, "title": "Coat"}}),
        json!({"code": 404}),
    ]));

    assert_eq!(paginator.item("42", None), Some(json!({"id": 42, "title": "Coat"})));
    assert_eq!(paginator.item("43", None), None);
    assert_eq!(paginator.item("44", None), None);

    let endpoints: Vec<_> = paginator.source().calls.iter().map(|(e, _)| e.as_str()).collect();
    assert_eq!(endpoints, vec!["/items/42", "/items/43", "/items/44"]);
    assert!(paginator.source().calls.iter().all(|(_, p)| p.is_empty()));
}

#[test]
fn test_item_lookup_sends_params() {
    let mut paginator = paginator(FakeSource::with_bodies(vec![json!({"item": {"id": 42}})]));
    let params = Params::new().with("localize", true);

    assert_eq!(paginator.item("42", Some(&params)), Some(json!({"id": 42})));

    let (endpoint, sent) = &paginator.source().calls[0];
    assert_eq!(endpoint, "/items/42");
    assert_eq!(sent, &params);
}

#[test]
fn test_search_through_request_client() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .then_json(200, &json!({"items": [item(1)]}))
            .then_json(200, &json!({"items": []})),
    );
    let config = ClientConfig::builder()
        .backoff(BackoffPolicy::None)
        .session_token(Some("T".to_string()))
        .build();
    let client = RequestClient::builder(config)
        .transport(transport.clone())
        .build();

    let mut paginator = SearchPaginator::new(client, Diagnostics::disabled("search"));
    let result = paginator.search_text("denim", 4);

    assert_eq!(result.len(), 1);
    assert_eq!(result.stop_reason, StopReason::LastPage);

    let urls: Vec<_> = transport.requests().iter().map(|r| r.url.to_string()).collect();
    assert_eq!(
        urls,
        vec![
            "https://www.vinted.com/api/v2/catalog/items?page=1&search_text=denim",
            "https://www.vinted.com/api/v2/catalog/items?page=2&search_text=denim",
        ]
    );
}

#[test]
fn test_item_params_reach_request_url() {
    let transport = Arc::new(ScriptedTransport::new().then_json(200, &json!({"item": {"id": 42}})));
    let config = ClientConfig::builder()
        .backoff(BackoffPolicy::None)
        .session_token(Some("T".to_string()))
        .build();
    let client = RequestClient::builder(config)
        .transport(transport.clone())
        .build();

    let mut paginator = SearchPaginator::new(client, Diagnostics::disabled("item"));
    let params = Params::new().with("localize", true);
    assert_eq!(paginator.item("42", Some(&params)), Some(json!({"id": 42})));

    assert_eq!(
        transport.requests()[0].url.as_str(),
        "https://www.vinted.com/api/v2/items/42?localize=true"
    );
}
