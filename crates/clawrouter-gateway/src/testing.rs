// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for gateway tests: canned wire bodies, a static
//! credential resolver, and a telemetry sink that records its calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use clawrouter_core::{
    ChatRequest, Credential, CredentialResolver, Provider, RouterError, RoutingDecision,
    TelemetrySink, UsageRecord,
};

/// A minimal OpenAI chat-completion response body.
pub fn chat_completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 9, "completion_tokens": 4, "total_tokens": 13}
    })
}

/// Build a ChatRequest with a single user message.
pub fn chat_request(user: &str) -> ChatRequest {
    serde_json::from_value(serde_json::json!({
        "model": "auto",
        "messages": [{"role": "user", "content": user}]
    }))
    .expect("valid request fixture")
}

/// Resolver that hands the same token to every provider (or nothing).
pub struct StaticResolver {
    token: Option<String>,
    invalidations: AtomicUsize,
}

impl StaticResolver {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            token: None,
            invalidations: AtomicUsize::new(0),
        }
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialResolver for StaticResolver {
    async fn resolve(&self, _provider: Provider) -> Option<Credential> {
        self.token.as_ref().map(|t| Credential { token: t.clone() })
    }

    async fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Telemetry event captured by [`RecordingTelemetry`].
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    Ready(String),
    Routed(RoutingDecision),
    Complete(UsageRecord),
    Error(String),
}

/// Sink that appends every callback to a list for assertions.
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().expect("telemetry lock poisoned").clone()
    }

    pub fn routed(&self) -> Vec<RoutingDecision> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TelemetryEvent::Routed(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn completions(&self) -> Vec<UsageRecord> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TelemetryEvent::Complete(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TelemetryEvent::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .expect("telemetry lock poisoned")
            .push(event);
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn on_ready(&self, addr: &str) {
        self.push(TelemetryEvent::Ready(addr.to_string()));
    }

    fn on_routed(&self, _request_id: &str, decision: &RoutingDecision) {
        self.push(TelemetryEvent::Routed(decision.clone()));
    }

    fn on_complete(&self, _request_id: &str, record: &UsageRecord) {
        self.push(TelemetryEvent::Complete(record.clone()));
    }

    fn on_error(&self, _request_id: &str, error: &RouterError) {
        self.push(TelemetryEvent::Error(error.to_string()));
    }
}
