// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM fallback classification for prompts the rule classifier could
//! not call confidently.
//!
//! One cheap upstream completion (temperature 0, 10 max tokens) asking
//! for a single tier word, fronted by the fingerprint cache. The
//! classifier never fails: every error path degrades to MEDIUM so the
//! caller always gets a decision.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::warn;

use clawrouter_core::{RouterError, Tier};

use crate::cache::{fingerprint, ClassificationStore};

/// Hard deadline on the upstream classification call.
pub const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Characters of user text included in the classification prompt.
const EXCERPT_CHARS: usize = 500;

/// Instruction sent as the system prompt of the classification call.
const CLASSIFY_PROMPT: &str = "Classify the complexity of the user's request. \
Respond with exactly one word: SIMPLE, MEDIUM, COMPLEX, or REASONING.";

static TIER_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(SIMPLE|MEDIUM|COMPLEX|REASONING)\b").unwrap());

/// Minimal completion capability the classifier needs from an upstream.
///
/// The implementation sends a non-streaming chat completion with
/// temperature 0 and max_tokens 10 and returns the raw text of the first
/// choice.
#[async_trait]
pub trait ClassifierUpstream: Send + Sync {
    async fn classify_completion(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<String, RouterError>;
}

/// A classification produced by the LLM fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LlmClassification {
    pub tier: Tier,
    /// Always within `[0.6, 0.8]`: cache hits 0.75, fresh parses 0.7,
    /// failures and unparseable output 0.6.
    pub confidence: f64,
    pub cached: bool,
}

/// Cache-fronted LLM classifier.
pub struct LlmClassifier {
    upstream: Arc<dyn ClassifierUpstream>,
    cache: Arc<dyn ClassificationStore>,
    /// Model used for classification calls: the catalog's SIMPLE primary.
    model: String,
}

impl LlmClassifier {
    pub fn new(
        upstream: Arc<dyn ClassifierUpstream>,
        cache: Arc<dyn ClassificationStore>,
        model: String,
    ) -> Self {
        Self {
            upstream,
            cache,
            model,
        }
    }

    /// Classify user text, consulting the cache first. Infallible by
    /// contract: upstream failure degrades to MEDIUM.
    pub async fn classify(&self, user_text: &str) -> LlmClassification {
        let fp = fingerprint(user_text);
        if let Some(tier) = self.cache.lookup(&fp) {
            return LlmClassification {
                tier,
                confidence: 0.75,
                cached: true,
            };
        }

        let excerpt: String = user_text.chars().take(EXCERPT_CHARS).collect();
        let call = self
            .upstream
            .classify_completion(&self.model, CLASSIFY_PROMPT, &excerpt);

        match tokio::time::timeout(CLASSIFY_TIMEOUT, call).await {
            Ok(Ok(text)) => match parse_tier(&text) {
                Some(tier) => {
                    self.cache.insert(&fp, tier);
                    LlmClassification {
                        tier,
                        confidence: 0.7,
                        cached: false,
                    }
                }
                None => {
                    warn!(output = text.as_str(), "unparseable classifier output, defaulting to MEDIUM");
                    medium_default()
                }
            },
            Ok(Err(e)) => {
                warn!(error = %e, "llm classification failed, defaulting to MEDIUM");
                medium_default()
            }
            Err(_) => {
                warn!(timeout = ?CLASSIFY_TIMEOUT, "llm classification timed out, defaulting to MEDIUM");
                medium_default()
            }
        }
    }

    /// Drop all cached classifications (`POST /reload`).
    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }
}

fn medium_default() -> LlmClassification {
    LlmClassification {
        tier: Tier::Medium,
        confidence: 0.6,
        cached: false,
    }
}

/// Word-boundary parse of the model's answer; first tier word wins.
fn parse_tier(text: &str) -> Option<Tier> {
    let upper = text.to_uppercase();
    let m = TIER_WORD.find(&upper)?;
    m.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubUpstream {
        response: Result<String, ()>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl StubUpstream {
        fn answering(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(()),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
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
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response
                .clone()
                .map_err(|_| RouterError::Internal("stub failure".into()))
        }
    }

    fn classifier_with(upstream: Arc<StubUpstream>) -> LlmClassifier {
        LlmClassifier::new(
            upstream,
            Arc::new(TtlCache::default()),
            "gemini-2.5-flash".to_string(),
        )
    }

    #[test]
    fn parse_tier_handles_surrounding_text() {
        assert_eq!(parse_tier("The answer is COMPLEX."), Some(Tier::Complex));
        assert_eq!(parse_tier("simple"), Some(Tier::Simple));
        assert_eq!(parse_tier("Reasoning\n"), Some(Tier::Reasoning));
        assert_eq!(parse_tier("no tier here"), None);
        // Word boundary: embedded matches do not count.
        assert_eq!(parse_tier("OVERSIMPLEX"), None);
    }

    #[tokio::test]
    async fn fresh_classification_parses_and_caches() {
        let upstream = Arc::new(StubUpstream::answering("COMPLEX"));
        let classifier = classifier_with(upstream.clone());

        let result = classifier.classify("is this prompt hard?").await;
        assert_eq!(result.tier, Tier::Complex);
        assert_eq!(result.confidence, 0.7);
        assert!(!result.cached);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn second_call_hits_cache_without_upstream_request() {
        let upstream = Arc::new(StubUpstream::answering("REASONING"));
        let classifier = classifier_with(upstream.clone());

        let first = classifier.classify("derive the closed form").await;
        let second = classifier.classify("derive the closed form").await;

        assert_eq!(first.tier, second.tier);
        assert!(second.cached);
        assert_eq!(second.confidence, 0.75);
        assert_eq!(upstream.calls(), 1, "cache hit must not call upstream");
    }

    #[tokio::test]
    async fn upstream_failure_degrades_to_medium() {
        let upstream = Arc::new(StubUpstream::failing());
        let classifier = classifier_with(upstream.clone());

        let result = classifier.classify("whatever").await;
        assert_eq!(result.tier, Tier::Medium);
        assert_eq!(result.confidence, 0.6);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let upstream = Arc::new(StubUpstream::failing());
        let classifier = classifier_with(upstream.clone());

        classifier.classify("whatever").await;
        classifier.classify("whatever").await;
        assert_eq!(upstream.calls(), 2, "failed classification must retry next time");
    }

    #[tokio::test]
    async fn unparseable_output_degrades_to_medium() {
        let upstream = Arc::new(StubUpstream::answering("I think it's moderately tricky"));
        let classifier = classifier_with(upstream);

        let result = classifier.classify("whatever").await;
        assert_eq!(result.tier, Tier::Medium);
        assert_eq!(result.confidence, 0.6);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_upstream_times_out_to_medium() {
        let upstream = Arc::new(StubUpstream {
            response: Ok("SIMPLE".to_string()),
            delay: Some(Duration::from_secs(30)),
            calls: AtomicUsize::new(0),
        });
        let classifier = classifier_with(upstream);

        let result = classifier.classify("whatever").await;
        assert_eq!(result.tier, Tier::Medium);
        assert_eq!(result.confidence, 0.6);
    }

    #[tokio::test]
    async fn invalidate_cache_forces_reclassification() {
        let upstream = Arc::new(StubUpstream::answering("SIMPLE"));
        let classifier = classifier_with(upstream.clone());

        classifier.classify("hi there").await;
        classifier.invalidate_cache();
        classifier.classify("hi there").await;
        assert_eq!(upstream.calls(), 2);
    }
}
