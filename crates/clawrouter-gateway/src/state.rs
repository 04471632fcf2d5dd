// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state for the proxy's request handlers, plus the in-memory
//! stats counters behind `GET /stats`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;

use clawrouter_catalog::ModelCatalog;
use clawrouter_core::{CredentialResolver, RoutingDecision, TelemetrySink, Tier};
use clawrouter_router::ModelRouter;

use crate::forward::UpstreamClient;

/// Shared state injected into every axum handler.
#[derive(Clone)]
pub struct GatewayState {
    /// The routing engine.
    pub router: Arc<ModelRouter>,
    /// The shared read-only model table.
    pub catalog: Arc<ModelCatalog>,
    /// HTTP client for provider upstreams.
    pub upstream: UpstreamClient,
    /// Credential source; opaque to the core.
    pub credentials: Arc<dyn CredentialResolver>,
    /// Host-supplied telemetry sink.
    pub telemetry: Arc<dyn TelemetrySink>,
    /// Aggregate routing counters.
    pub stats: Arc<RouterStats>,
    /// Process start time for `/health` uptime.
    pub started_at: Instant,
    /// Wallet address surfaced on `/health`.
    pub wallet: String,
}

/// Monotonic counters, approximate by design: increments are atomic but
/// no cross-counter consistency is promised.
#[derive(Debug, Default)]
pub struct RouterStats {
    by_tier: DashMap<Tier, u64>,
    by_model: DashMap<String, u64>,
    total_savings_microusd: AtomicU64,
    failed_requests: AtomicU64,
}

/// Serialized shape of `GET /stats`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub by_tier: BTreeMap<String, u64>,
    pub by_model: BTreeMap<String, u64>,
    #[serde(rename = "totalSavingsUSD")]
    pub total_savings_usd: f64,
    pub failed_requests: u64,
}

impl RouterStats {
    /// Record a routed request.
    pub fn record(&self, decision: &RoutingDecision) {
        *self.by_tier.entry(decision.tier).or_insert(0) += 1;
        *self.by_model.entry(decision.model.clone()).or_insert(0) += 1;

        let saved = (decision.baseline_cost - decision.cost_estimate).max(0.0);
        let micro = (saved * 1_000_000.0) as u64;
        self.total_savings_microusd.fetch_add(micro, Ordering::Relaxed);
    }

    /// Record a request that did not complete.
    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy for `/stats`. Every tier is present even at zero.
    pub fn snapshot(&self) -> StatsSnapshot {
        let mut by_tier = BTreeMap::new();
        for tier in Tier::ALL {
            let count = self.by_tier.get(&tier).map(|c| *c).unwrap_or(0);
            by_tier.insert(tier.to_string(), count);
        }

        let by_model = self
            .by_model
            .iter()
            .map(|kv| (kv.key().clone(), *kv.value()))
            .collect();

        StatsSnapshot {
            by_tier,
            by_model,
            total_savings_usd: self.total_savings_microusd.load(Ordering::Relaxed) as f64
                / 1_000_000.0,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
        }
    }
}
