//! Fake transport for tests
//!
//! Records every request it is handed and answers from a queue of scripted
//! replies, falling back to a fixed default once the queue is drained.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{GatewayError, Result};

use super::transport::{HttpTransport, RawResponse, UpstreamRequest};

#[derive(Debug, Clone)]
enum Reply {
    Response(RawResponse),
    NetworkFailure(String),
    Timeout,
}

impl Reply {
    fn resolve(&self, request: &UpstreamRequest) -> Result<RawResponse> {
        match self {
            Self::Response(response) => Ok(response.clone()),
            Self::NetworkFailure(message) => Err(GatewayError::Network(message.clone())),
            Self::Timeout => Err(GatewayError::Timeout(request.timeout)),
        }
    }
}

/// Transport that never touches the network
#[derive(Debug)]
pub struct MockTransport {
    requests: Mutex<Vec<UpstreamRequest>>,
    scripted: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    delay: Option<Duration>,
}

impl MockTransport {
    /// Answers every request with `200 {}`
    pub fn new() -> Self {
        Self::with_status(200, "{}")
    }

    /// Answers every request with `200` and the given JSON body
    pub fn with_json(body: Value) -> Self {
        Self::with_status(200, body.to_string())
    }

    /// Answers every request with a fixed status and raw body
    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self::from_reply(Reply::Response(RawResponse::new(status, body)))
    }

    /// Fails every request before any response
    pub fn failing(message: impl Into<String>) -> Self {
        Self::from_reply(Reply::NetworkFailure(message.into()))
    }

    /// Times out every request
    pub fn timing_out() -> Self {
        Self::from_reply(Reply::Timeout)
    }

    fn from_reply(fallback: Reply) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            fallback,
            delay: None,
        }
    }

    /// Sleep before answering, to exercise concurrent callers
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a one-shot reply ahead of the fallback
    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Reply::Response(RawResponse::new(status, body)));
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_request(&self) -> Option<UpstreamRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, request: &UpstreamRequest) -> Result<RawResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let reply = self
            .scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        reply.resolve(request)
    }
}
