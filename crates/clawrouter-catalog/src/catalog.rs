// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The model catalog: which models exist, what they cost, and the
//! ordered fallback chain per tier.
//!
//! The catalog is built once at startup from a static table (optionally
//! reshaped by per-tier primary overrides) and never mutated afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use clawrouter_core::{Provider, RouterError, Tier};

/// One routable model. Immutable after catalog construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Wire-format model identifier.
    pub id: String,
    /// Provider serving this model.
    pub provider: Provider,
    /// Complexity tier this model is sized for.
    pub tier: Tier,
    /// USD per million input tokens.
    pub input_price_per_mtok: f64,
    /// USD per million output tokens.
    pub output_price_per_mtok: f64,
    /// Maximum context window in tokens.
    pub context_window: u32,
    /// Whether the provider supports SSE streaming for this model.
    pub supports_streaming: bool,
}

/// Process-wide read-only model table.
///
/// Per tier, the first entry in declaration order is the primary and the
/// rest form the fallback chain.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

fn entry(
    id: &str,
    provider: Provider,
    tier: Tier,
    input: f64,
    output: f64,
    context_window: u32,
) -> ModelEntry {
    ModelEntry {
        id: id.to_string(),
        provider,
        tier,
        input_price_per_mtok: input,
        output_price_per_mtok: output,
        context_window,
        supports_streaming: true,
    }
}

impl ModelCatalog {
    /// The catalog shipped with the proxy.
    ///
    /// Prices are USD per million tokens as published by the providers;
    /// BlockRun-served models carry marketplace prices.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                // SIMPLE: cheap, fast models for greetings and single-fact lookups.
                entry("gemini-2.5-flash", Provider::Blockrun, Tier::Simple, 0.30, 2.50, 1_048_576),
                entry("gpt-4o-mini", Provider::OpenAi, Tier::Simple, 0.15, 0.60, 128_000),
                entry("llama-3.3-70b", Provider::Blockrun, Tier::Simple, 0.23, 0.40, 131_072),
                // MEDIUM: general conversation and routine coding.
                entry("gpt-4o", Provider::OpenAi, Tier::Medium, 2.50, 10.00, 128_000),
                entry("claude-sonnet-4-20250514", Provider::Anthropic, Tier::Medium, 3.00, 15.00, 200_000),
                entry("gemini-2.5-pro", Provider::Blockrun, Tier::Medium, 1.25, 10.00, 1_048_576),
                // COMPLEX: architecture, large refactors, deep analysis.
                entry("claude-opus-4-20250514", Provider::Anthropic, Tier::Complex, 15.00, 75.00, 200_000),
                entry("gpt-4.1", Provider::OpenAi, Tier::Complex, 2.00, 8.00, 1_047_576),
                // REASONING: proof and multi-step math workloads.
                entry("o3", Provider::OpenAi, Tier::Reasoning, 2.00, 8.00, 200_000),
                entry("deepseek-reasoner", Provider::Blockrun, Tier::Reasoning, 0.55, 2.19, 65_536),
            ],
        }
    }

    /// Builds the catalog, promoting any per-tier primary overrides.
    ///
    /// An override names an existing catalog model which is moved to the
    /// front of its tier's chain. Naming a model absent from the catalog
    /// or belonging to a different tier is a configuration error.
    pub fn with_overrides(overrides: &HashMap<Tier, String>) -> Result<Self, RouterError> {
        let mut catalog = Self::builtin();
        for (&tier, id) in overrides {
            let pos = catalog
                .entries
                .iter()
                .position(|e| e.id == *id)
                .ok_or_else(|| {
                    RouterError::Config(format!("model override `{id}` is not in the catalog"))
                })?;
            if catalog.entries[pos].tier != tier {
                return Err(RouterError::Config(format!(
                    "model override `{id}` belongs to tier {}, not {tier}",
                    catalog.entries[pos].tier
                )));
            }
            let promoted = catalog.entries.remove(pos);
            let first_of_tier = catalog
                .entries
                .iter()
                .position(|e| e.tier == tier)
                .unwrap_or(catalog.entries.len());
            catalog.entries.insert(first_of_tier, promoted);
            tracing::info!(tier = %tier, model = id.as_str(), "tier primary overridden");
        }
        Ok(catalog)
    }

    /// Looks up a model by id.
    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The primary (cheapest capable) model for a tier.
    pub fn primary(&self, tier: Tier) -> &ModelEntry {
        // The builtin table covers every tier; overrides cannot remove entries.
        self.entries
            .iter()
            .find(|e| e.tier == tier)
            .expect("catalog covers every tier")
    }

    /// Ordered model ids for a tier: primary first, then fallbacks.
    pub fn chain(&self, tier: Tier) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.tier == tier)
            .map(|e| e.id.clone())
            .collect()
    }

    /// The canonical expensive model used as the savings baseline.
    pub fn reference(&self) -> &ModelEntry {
        self.primary(Tier::Complex)
    }

    /// All entries, for `/v1/models`.
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }
}
