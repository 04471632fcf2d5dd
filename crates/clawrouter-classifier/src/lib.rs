// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-stage request complexity classification.
//!
//! The rule classifier ([`RuleClassifier`]) handles the hot path with
//! fast-path patterns and weighted keyword scoring; the LLM classifier
//! ([`LlmClassifier`]) settles the ambiguous remainder with one cheap
//! cached upstream call.

pub mod cache;
pub mod config;
pub mod estimator;
pub mod llm;
pub mod rules;

pub use cache::{fingerprint, ClassificationStore, TtlCache, CACHE_CAPACITY, CACHE_TTL};
pub use config::{DimensionWeights, KeywordLists, ScoringConfig, TierBoundaries, TokenThresholds};
pub use estimator::estimate_tokens;
pub use llm::{ClassifierUpstream, LlmClassification, LlmClassifier, CLASSIFY_TIMEOUT};
pub use rules::{RuleClassifier, ScoringResult};
