//! In-memory transport that replays canned responses.
//!
//! Responses are served in the order they were queued, one per request,
//! regardless of URL. Every request is recorded so callers can assert on
//! the headers and proxy route that were actually sent. Once the queue is
//! empty the fallback is served, or a connection failure if none is set.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use reqwest::header::{HeaderValue, SET_COOKIE};
use serde_json::Value;

use super::transport::{OutboundRequest, RawResponse, Transport};
use crate::error::TransportError;

/// One canned reply.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// A response with a status, headers and body.
    Response(RawResponse),
    /// A failure to get any response.
    Failure(TransportError),
}

/// Transport replaying a fixed script.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    fallback: Option<Scripted>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw response.
    #[must_use]
    pub fn then(self, reply: Scripted) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    /// Queues a response with an empty body.
    #[must_use]
    pub fn then_status(self, status: u16) -> Self {
        self.then(Scripted::Response(RawResponse::new(status, Vec::new())))
    }

    /// Queues a JSON response.
    #[must_use]
    pub fn then_json(self, status: u16, body: &Value) -> Self {
        self.then(Scripted::Response(RawResponse::new(status, body.to_string())))
    }

    /// Queues a bootstrap response carrying a `Set-Cookie` header.
    #[must_use]
    pub fn then_cookie(self, status: u16, set_cookie: &str) -> Self {
        let mut response = RawResponse::new(status, "<html></html>");
        if let Ok(value) = HeaderValue::from_str(set_cookie) {
            response.headers.append(SET_COOKIE, value);
        }
        self.then(Scripted::Response(response))
    }

    /// Queues a transport failure.
    #[must_use]
    pub fn then_failure(self, error: TransportError) -> Self {
        self.then(Scripted::Failure(error))
    }

    /// Serves `reply` whenever the queue is empty.
    #[must_use]
    pub fn otherwise(mut self, reply: Scripted) -> Self {
        self.fallback = Some(reply);
        self
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of requests received.
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the number of queued replies not yet served.
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .or_else(|| self.fallback.clone());

        match next {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(error)) => Err(error),
            None => Err(TransportError::Connect("script exhausted".to_string())),
        }
    }
}
