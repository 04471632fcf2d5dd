// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telemetry callback surface.
//!
//! The proxy reports routing decisions, completions, and failures through
//! this trait; the host supplies whatever logger it wants. Callbacks must
//! be cheap: within one request, `on_routed` fires before the first body
//! byte reaches the client and `on_complete` after the last.

use crate::error::RouterError;
use crate::types::{RoutingDecision, UsageRecord};

/// Sink for routing and usage telemetry.
pub trait TelemetrySink: Send + Sync {
    /// The proxy is bound and accepting requests.
    fn on_ready(&self, addr: &str);

    /// A request was classified and is about to be forwarded.
    fn on_routed(&self, request_id: &str, decision: &RoutingDecision);

    /// A request completed; final token counts and actual cost.
    fn on_complete(&self, request_id: &str, record: &UsageRecord);

    /// A request failed (including client cancellation mid-stream).
    fn on_error(&self, request_id: &str, error: &RouterError);
}

/// Default sink that logs through `tracing`.
#[derive(Debug, Default, Clone)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn on_ready(&self, addr: &str) {
        tracing::info!(addr, "proxy ready");
    }

    fn on_routed(&self, request_id: &str, decision: &RoutingDecision) {
        tracing::info!(
            request_id,
            model = decision.model.as_str(),
            tier = %decision.tier,
            method = ?decision.method,
            confidence = decision.confidence,
            savings = decision.savings,
            "request routed"
        );
    }

    fn on_complete(&self, request_id: &str, record: &UsageRecord) {
        tracing::info!(
            request_id,
            model = record.model.as_str(),
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            cost_usd = record.cost_usd,
            "request completed"
        );
    }

    fn on_error(&self, request_id: &str, error: &RouterError) {
        tracing::warn!(request_id, error = %error, "request failed");
    }
}
