// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier-to-model selection with cost accounting.
//!
//! For a classified tier the selector picks the primary model, carries
//! the tier's fallback chain, and prices the request against both the
//! chosen model and the canonical expensive reference model.

use std::sync::Arc;

use clawrouter_catalog::{cost_usd, expected_output_tokens, ModelCatalog, ModelEntry};
use clawrouter_core::Tier;

/// A priced model choice for one request.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen model id.
    pub model: String,
    /// Remaining models of the tier to try if the chosen one fails.
    pub fallback_chain: Vec<String>,
    /// Estimated request cost on the chosen model, USD.
    pub cost_estimate: f64,
    /// Estimated request cost on the reference model, USD.
    pub baseline_cost: f64,
    /// `max(0, (baseline - estimate) / baseline)`.
    pub savings: f64,
    /// True when the raw savings were negative and clamped to zero.
    pub savings_clamped: bool,
}

/// Stateless selector over the shared catalog.
#[derive(Debug, Clone)]
pub struct Selector {
    catalog: Arc<ModelCatalog>,
}

impl Selector {
    pub fn new(catalog: Arc<ModelCatalog>) -> Self {
        Self { catalog }
    }

    /// Select the tier's primary model and price the request.
    pub fn select(&self, tier: Tier, input_tokens: u64, max_tokens: Option<u32>) -> Selection {
        let primary = self.catalog.primary(tier);
        self.select_entry(primary, input_tokens, max_tokens)
    }

    /// Price the request against a specific catalog entry (explicit model
    /// requests). The fallback chain is the rest of the entry's tier.
    pub fn select_entry(
        &self,
        entry: &ModelEntry,
        input_tokens: u64,
        max_tokens: Option<u32>,
    ) -> Selection {
        let output_tokens = expected_output_tokens(max_tokens, entry.tier);
        let cost_estimate = cost_usd(entry, input_tokens, output_tokens);
        let baseline_cost = cost_usd(self.catalog.reference(), input_tokens, output_tokens);

        let raw = if baseline_cost > 0.0 {
            (baseline_cost - cost_estimate) / baseline_cost
        } else {
            0.0
        };
        let savings_clamped = raw < 0.0;

        let fallback_chain = self
            .catalog
            .chain(entry.tier)
            .into_iter()
            .filter(|id| *id != entry.id)
            .collect();

        Selection {
            model: entry.id.clone(),
            fallback_chain,
            cost_estimate,
            baseline_cost,
            savings: raw.max(0.0),
            savings_clamped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawrouter_core::Provider;

    fn selector() -> Selector {
        Selector::new(Arc::new(ModelCatalog::builtin()))
    }

    #[test]
    fn simple_tier_saves_most_of_the_baseline() {
        let sel = selector().select(Tier::Simple, 1_000, None);
        assert_eq!(sel.model, "gemini-2.5-flash");
        assert!(sel.savings >= 0.90, "savings {}", sel.savings);
        assert!(sel.cost_estimate <= sel.baseline_cost);
    }

    #[test]
    fn savings_stay_in_unit_range_for_cheaper_tiers() {
        for tier in [Tier::Simple, Tier::Medium, Tier::Reasoning] {
            for input in [0u64, 10, 5_000, 2_000_000] {
                for max_tokens in [None, Some(1), Some(100_000)] {
                    let sel = selector().select(tier, input, max_tokens);
                    assert!(
                        (0.0..=1.0).contains(&sel.savings),
                        "tier {tier} savings {} out of range",
                        sel.savings
                    );
                    assert!(sel.cost_estimate <= sel.baseline_cost, "tier {tier}");
                    assert!(!sel.savings_clamped);
                }
            }
        }
    }

    #[test]
    fn complex_primary_matches_the_baseline_exactly() {
        let sel = selector().select(Tier::Complex, 10_000, Some(2_000));
        assert_eq!(sel.model, "claude-opus-4-20250514");
        assert_eq!(sel.cost_estimate, sel.baseline_cost);
        assert_eq!(sel.savings, 0.0);
        assert!(!sel.savings_clamped);
    }

    #[test]
    fn fallback_chain_excludes_the_chosen_model() {
        let sel = selector().select(Tier::Simple, 100, None);
        assert!(!sel.fallback_chain.contains(&sel.model));
        assert_eq!(sel.fallback_chain, vec!["gpt-4o-mini", "llama-3.3-70b"]);
    }

    #[test]
    fn explicit_fallback_model_keeps_the_rest_of_its_tier() {
        let catalog = Arc::new(ModelCatalog::builtin());
        let s = Selector::new(catalog.clone());
        let entry = catalog.get("gpt-4o-mini").unwrap();
        let sel = s.select_entry(entry, 100, None);
        assert_eq!(sel.model, "gpt-4o-mini");
        assert!(sel.fallback_chain.contains(&"gemini-2.5-flash".to_string()));
        assert!(!sel.fallback_chain.contains(&"gpt-4o-mini".to_string()));
    }

    #[test]
    fn pricier_than_baseline_model_is_clamped_to_zero_savings() {
        let entry = ModelEntry {
            id: "hypothetical-premium".to_string(),
            provider: Provider::OpenAi,
            tier: Tier::Complex,
            input_price_per_mtok: 40.0,
            output_price_per_mtok: 200.0,
            context_window: 200_000,
            supports_streaming: true,
        };
        let sel = selector().select_entry(&entry, 10_000, Some(1_000));
        assert_eq!(sel.savings, 0.0);
        assert!(sel.savings_clamped);
    }

    #[test]
    fn zero_token_request_has_zero_costs_and_zero_savings() {
        let sel = selector().select(Tier::Simple, 0, Some(0));
        assert_eq!(sel.cost_estimate, 0.0);
        assert_eq!(sel.baseline_cost, 0.0);
        assert_eq!(sel.savings, 0.0);
    }
}
