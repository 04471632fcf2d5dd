// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing orchestration: rule classifier, LLM fallback, post-overrides,
//! selection.
//!
//! `route()` always terminates with a decision — classification failures
//! are absorbed by the LLM classifier's MEDIUM default, and the selector
//! is total over tiers.

use std::sync::Arc;

use tracing::debug;

use clawrouter_catalog::ModelCatalog;
use clawrouter_classifier::{
    estimate_tokens, ClassificationStore, ClassifierUpstream, LlmClassifier, RuleClassifier,
    ScoringConfig,
};
use clawrouter_core::{ChatRequest, RouteMethod, RoutingDecision, Tier};

use crate::selector::Selector;

/// Estimated-token count above which a request is forced to COMPLEX.
pub const LARGE_CONTEXT_TOKENS: u64 = 100_000;

/// Signal appended when the large-context override fires.
pub const SIGNAL_FORCED_COMPLEX: &str = "forced-complex-large-context";

/// Signal appended when the structured-output override fires.
pub const SIGNAL_FORCED_MEDIUM: &str = "forced-medium-structured";

/// The routing engine: classify, override, select.
pub struct ModelRouter {
    rules: RuleClassifier,
    llm: LlmClassifier,
    selector: Selector,
    catalog: Arc<ModelCatalog>,
}

impl ModelRouter {
    /// Build a router over the shared catalog. The LLM fallback runs its
    /// classification calls against the catalog's SIMPLE primary via the
    /// supplied upstream, fronted by the supplied cache.
    pub fn new(
        config: ScoringConfig,
        catalog: Arc<ModelCatalog>,
        upstream: Arc<dyn ClassifierUpstream>,
        cache: Arc<dyn ClassificationStore>,
    ) -> Self {
        let classify_model = catalog.primary(Tier::Simple).id.clone();
        Self {
            rules: RuleClassifier::new(config),
            llm: LlmClassifier::new(upstream, cache, classify_model),
            selector: Selector::new(catalog.clone()),
            catalog,
        }
    }

    /// Route an `auto` request to a concrete model.
    pub async fn route(&self, request: &ChatRequest) -> RoutingDecision {
        let user_text = request.text_for_role("user");
        let system_prompt = request.text_for_role("system");
        let estimated_tokens = estimate_tokens(&format!("{user_text}{system_prompt}"));

        let scored = self
            .rules
            .classify(&user_text, &system_prompt, estimated_tokens);
        let mut signals = scored.signals.clone();

        let (mut tier, confidence, method, mut reasoning) = match scored.tier {
            Some(tier) if scored.fastpath => (
                tier,
                scored.confidence,
                RouteMethod::Fastpath,
                format!("fast-path pattern match for {tier}"),
            ),
            Some(tier) => (
                tier,
                scored.confidence,
                RouteMethod::Rules,
                format!("weighted score {:.2} maps to {tier}", scored.score),
            ),
            None => {
                debug!(
                    confidence = scored.confidence,
                    score = scored.score,
                    "rule classifier ambiguous, escalating to llm"
                );
                let llm = self.llm.classify(&user_text).await;
                signals.push(
                    if llm.cached {
                        "llm-cache-hit"
                    } else {
                        "llm-classified"
                    }
                    .to_string(),
                );
                (
                    llm.tier,
                    llm.confidence,
                    RouteMethod::Llm,
                    format!(
                        "rules ambiguous at confidence {:.2}; llm fallback chose {}",
                        scored.confidence, llm.tier
                    ),
                )
            }
        };

        // Post-overrides, applied in order. A huge prompt needs a large
        // context window; structured-output requests are too easy to
        // fumble on the cheapest models.
        if estimated_tokens > LARGE_CONTEXT_TOKENS {
            signals.push(SIGNAL_FORCED_COMPLEX.to_string());
            tier = tier.max(Tier::Complex);
        }
        let system_lower = system_prompt.to_lowercase();
        if system_lower.contains("json") || system_lower.contains("structured") {
            signals.push(SIGNAL_FORCED_MEDIUM.to_string());
            tier = tier.max(Tier::Medium);
        }

        let selection = self
            .selector
            .select(tier, estimated_tokens, request.max_tokens);
        if selection.savings_clamped {
            reasoning.push_str("; savings clamped to 0");
        }

        RoutingDecision {
            model: selection.model,
            tier,
            confidence,
            method,
            reasoning,
            cost_estimate: selection.cost_estimate,
            baseline_cost: selection.baseline_cost,
            savings: selection.savings,
            fallback_chain: selection.fallback_chain,
            signals,
        }
    }

    /// Route a request that names a concrete catalog model: no
    /// classification, full cost accounting and fallback chain.
    pub fn route_explicit(&self, request: &ChatRequest) -> Option<RoutingDecision> {
        let entry = self.catalog.get(&request.model)?;
        let user_text = request.text_for_role("user");
        let system_prompt = request.text_for_role("system");
        let estimated_tokens = estimate_tokens(&format!("{user_text}{system_prompt}"));

        let selection = self
            .selector
            .select_entry(entry, estimated_tokens, request.max_tokens);

        let mut reasoning = format!("explicit request for {}", entry.id);
        if selection.savings_clamped {
            reasoning.push_str("; savings clamped to 0");
        }

        Some(RoutingDecision {
            model: selection.model,
            tier: entry.tier,
            confidence: 1.0,
            method: RouteMethod::Fastpath,
            reasoning,
            cost_estimate: selection.cost_estimate,
            baseline_cost: selection.baseline_cost,
            savings: selection.savings,
            fallback_chain: selection.fallback_chain,
            signals: vec!["explicit-model".to_string()],
        })
    }

    /// Drop all cached LLM classifications (`POST /reload`).
    pub fn clear_classification_cache(&self) {
        self.llm.invalidate_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clawrouter_classifier::TtlCache;
    use clawrouter_core::RouterError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubUpstream {
        answer: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ClassifierUpstream for StubUpstream {
        async fn classify_completion(
            &self,
            _model: &str,
            _system: &str,
            _user: &str,
        ) -> Result<String, RouterError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.to_string())
        }
    }

    fn router_with_llm_answer(answer: &'static str) -> (ModelRouter, Arc<StubUpstream>) {
        let upstream = Arc::new(StubUpstream {
            answer,
            calls: AtomicUsize::new(0),
        });
        let router = ModelRouter::new(
            ScoringConfig::builtin(),
            Arc::new(ModelCatalog::builtin()),
            upstream.clone(),
            Arc::new(TtlCache::default()),
        );
        (router, upstream)
    }

    fn request(user: &str) -> ChatRequest {
        serde_json::from_value(serde_json::json!({
            "model": "auto",
            "messages": [{"role": "user", "content": user}]
        }))
        .unwrap()
    }

    fn request_with_system(user: &str, system: &str) -> ChatRequest {
        serde_json::from_value(serde_json::json!({
            "model": "auto",
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn capital_question_routes_to_simple_primary() {
        let (router, upstream) = router_with_llm_answer("COMPLEX");
        let decision = router.route(&request("What is the capital of France?")).await;

        assert_eq!(decision.tier, Tier::Simple);
        assert_eq!(decision.method, RouteMethod::Fastpath);
        assert_eq!(decision.model, "gemini-2.5-flash");
        assert!(decision.savings >= 0.90, "savings {}", decision.savings);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn greeting_routes_simple_fastpath() {
        let (router, _) = router_with_llm_answer("COMPLEX");
        let decision = router.route(&request("Hello")).await;
        assert_eq!(decision.tier, Tier::Simple);
        assert_eq!(decision.method, RouteMethod::Fastpath);
    }

    #[tokio::test]
    async fn proof_request_routes_to_reasoning_primary() {
        let (router, _) = router_with_llm_answer("SIMPLE");
        let decision = router
            .route(&request("Prove that sqrt(2) is irrational, step by step."))
            .await;

        assert_eq!(decision.tier, Tier::Reasoning);
        assert_eq!(decision.model, "o3");
        assert!(decision.confidence >= 0.85);
        assert!(matches!(
            decision.method,
            RouteMethod::Fastpath | RouteMethod::Rules
        ));
    }

    #[tokio::test]
    async fn huge_prompt_is_forced_to_complex() {
        let (router, _) = router_with_llm_answer("SIMPLE");
        // ~500k chars of neutral prose: estimator puts it far over the
        // large-context threshold.
        let prose = "the quiet meadow stretched on beneath an even sky. ".repeat(10_000);
        let decision = router.route(&request(&prose)).await;

        assert_eq!(decision.tier, Tier::Complex);
        assert!(decision
            .signals
            .iter()
            .any(|s| s == SIGNAL_FORCED_COMPLEX));
        assert_eq!(decision.model, "claude-opus-4-20250514");
    }

    #[tokio::test]
    async fn structured_system_prompt_raises_tier_to_medium() {
        let (router, upstream) = router_with_llm_answer("SIMPLE");
        let decision = router
            .route(&request_with_system(
                "Summarize this article about photosynthesis in three bullet points",
                "Respond in JSON.",
            ))
            .await;

        assert!(decision.tier >= Tier::Medium);
        assert!(decision.signals.iter().any(|s| s == SIGNAL_FORCED_MEDIUM));
        // The rule classifier was ambiguous here, so the llm fallback ran.
        assert_eq!(decision.method, RouteMethod::Llm);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn architecture_prompt_routes_complex_fastpath() {
        let (router, _) = router_with_llm_answer("SIMPLE");
        let decision = router
            .route(&request(
                "Design a microservice architecture for a trading platform",
            ))
            .await;
        assert_eq!(decision.tier, Tier::Complex);
        assert_eq!(decision.method, RouteMethod::Fastpath);
    }

    #[tokio::test]
    async fn decision_model_always_belongs_to_the_decision_tier() {
        let (router, _) = router_with_llm_answer("REASONING");
        let catalog = ModelCatalog::builtin();
        let inputs = [
            "Hello",
            "What is the capital of France?",
            "Prove the theorem and derive the bound.",
            "Design a microservice architecture for a trading platform",
            "Summarize this article about photosynthesis in three bullet points",
            "Write a function that merges two sorted vectors",
        ];
        for text in inputs {
            let decision = router.route(&request(text)).await;
            let entry = catalog.get(&decision.model).unwrap();
            assert_eq!(
                entry.tier, decision.tier,
                "model {} does not match tier for {text:?}",
                decision.model
            );
            assert!((0.5..=1.0).contains(&decision.confidence));
            assert!((0.0..=1.0).contains(&decision.savings));
        }
    }

    #[tokio::test]
    async fn ambiguous_prompt_defers_to_llm_and_caches() {
        let (router, upstream) = router_with_llm_answer("COMPLEX");
        let text = "Summarize this article about photosynthesis in three bullet points";

        let first = router.route(&request(text)).await;
        let second = router.route(&request(text)).await;

        assert_eq!(first.tier, Tier::Complex);
        assert_eq!(first.method, RouteMethod::Llm);
        assert_eq!(second.tier, first.tier);
        assert_eq!(
            upstream.calls.load(Ordering::SeqCst),
            1,
            "second identical prompt must come from the cache"
        );
        assert!(second.signals.iter().any(|s| s == "llm-cache-hit"));
    }

    #[tokio::test]
    async fn clearing_the_cache_reissues_the_upstream_call() {
        let (router, upstream) = router_with_llm_answer("MEDIUM");
        let text = "Summarize this article about photosynthesis in three bullet points";

        router.route(&request(text)).await;
        router.clear_classification_cache();
        router.route(&request(text)).await;
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn explicit_model_skips_classification() {
        let (router, upstream) = router_with_llm_answer("SIMPLE");
        let mut req = request("Summarize this article about photosynthesis in three bullet points");
        req.model = "gpt-4o".to_string();

        let decision = router.route_explicit(&req).unwrap();
        assert_eq!(decision.model, "gpt-4o");
        assert_eq!(decision.tier, Tier::Medium);
        assert_eq!(decision.confidence, 1.0);
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn explicit_unknown_model_is_rejected() {
        let (router, _) = router_with_llm_answer("SIMPLE");
        let mut req = request("hi");
        req.model = "gpt-99-ultra".to_string();
        assert!(router.route_explicit(&req).is_none());
    }
}
