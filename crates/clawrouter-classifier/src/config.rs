// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tunable classifier configuration: dimension weights, keyword lists,
//! tier boundaries, and confidence parameters.
//!
//! Every field has a shipped default and can be overridden from the
//! config file; the values here are starting points, not invariants.

use serde::{Deserialize, Serialize};

use clawrouter_core::RouterError;

/// Weight applied to each scoring dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    pub token_count: f64,
    pub code_presence: f64,
    pub reasoning_markers: f64,
    pub technical_terms: f64,
    pub creative_markers: f64,
    pub simple_indicators: f64,
    pub multi_step: f64,
    pub question_complexity: f64,
    pub imperative_verbs: f64,
    pub constraint_count: f64,
    pub output_format: f64,
    pub reference_complexity: f64,
    pub negation_complexity: f64,
    pub domain_specificity: f64,
    pub agentic_task: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            token_count: 0.8,
            code_presence: 1.2,
            reasoning_markers: 1.5,
            technical_terms: 0.9,
            creative_markers: 0.6,
            simple_indicators: 1.0,
            multi_step: 0.8,
            question_complexity: 0.5,
            imperative_verbs: 0.6,
            constraint_count: 0.7,
            output_format: 0.6,
            reference_complexity: 0.5,
            negation_complexity: 0.4,
            domain_specificity: 0.8,
            agentic_task: 1.0,
        }
    }
}

/// Keyword lists backing the scoring dimensions. Matching is
/// case-insensitive substring containment on the lowercased text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordLists {
    pub code: Vec<String>,
    pub reasoning: Vec<String>,
    pub technical: Vec<String>,
    pub creative: Vec<String>,
    pub simple: Vec<String>,
    pub imperative: Vec<String>,
    pub constraint: Vec<String>,
    pub output_format: Vec<String>,
    pub reference: Vec<String>,
    pub negation: Vec<String>,
    pub domain: Vec<String>,
    pub agentic: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeywordLists {
    fn default() -> Self {
        Self {
            code: words(&[
                "function", "code", "debug", "compile", "script", "class ", "method",
                "variable", "algorithm", "api", "endpoint", "database", "sql", "regex",
                "library", "framework", "unit test", "stack trace",
            ]),
            reasoning: words(&[
                "prove", "proof", "theorem", "derive", "deduce", "logic", "step by step",
                "rigorous", "axiom", "induction", "formally", "reason through",
            ]),
            technical: words(&[
                "kubernetes", "docker", "tcp", "http", "grpc", "encryption", "compiler",
                "thread", "concurrency", "latency", "throughput", "cache", "protocol",
                "kernel", "container", "queue", "shard",
            ]),
            creative: words(&[
                "story", "poem", "creative", "imagine", "fiction", "character", "plot",
                "lyrics", "haiku", "screenplay", "metaphor",
            ]),
            simple: words(&[
                "what time", "how are you", "hello", "thanks", "weather",
                "capital of", "define ", "meaning of", "translate the word",
            ]),
            imperative: words(&[
                "write", "create", "build", "implement", "add", "fix", "make",
                "update", "generate", "convert",
            ]),
            constraint: words(&[
                "must", "should", "at least", "no more than", "at most", "limit",
                "only ", "exactly", "without using", "ensure", "require",
            ]),
            output_format: words(&[
                "json", "table", "markdown", "bullet", "list", "csv", "yaml",
                "xml", "format", "schema",
            ]),
            reference: words(&[
                "above", "previous", "earlier", "aforementioned", "as mentioned",
                "the following", "attached", "this code", "that file",
            ]),
            negation: words(&[
                "not ", "never", "don't", "do not", "avoid", "except", "without",
                "exclude", "unless",
            ]),
            domain: words(&[
                "medical", "legal", "financial", "quantum", "genomic", "cryptograph",
                "actuarial", "pharmacolog", "jurisdiction", "derivatives", "compliance",
            ]),
            agentic: words(&[
                "use tools", "browse", "search the web", "file system", "execute",
                "run command", "install", "deploy", "fetch", "scrape", "automate",
                "schedule", "open the file", "read the repo",
            ]),
        }
    }
}

/// Estimated-token cutoffs for the token-count dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenThresholds {
    /// Below this, the request leans simple.
    pub simple: u64,
    /// Above this, the request leans complex.
    pub complex: u64,
}

impl Default for TokenThresholds {
    fn default() -> Self {
        Self {
            simple: 50,
            complex: 2000,
        }
    }
}

/// Score boundaries between adjacent tiers; must be strictly increasing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TierBoundaries {
    pub simple_medium: f64,
    pub medium_complex: f64,
    pub complex_reasoning: f64,
}

impl Default for TierBoundaries {
    fn default() -> Self {
        Self {
            simple_medium: -0.5,
            medium_complex: 1.5,
            complex_reasoning: 3.5,
        }
    }
}

/// The full classifier configuration bundle. Immutable after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: DimensionWeights,
    pub keywords: KeywordLists,
    pub token_thresholds: TokenThresholds,
    pub boundaries: TierBoundaries,
    pub confidence_steepness: f64,
    pub confidence_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ScoringConfig {
    /// Shipped defaults.
    pub fn builtin() -> Self {
        Self {
            weights: DimensionWeights::default(),
            keywords: KeywordLists::default(),
            token_thresholds: TokenThresholds::default(),
            boundaries: TierBoundaries::default(),
            confidence_steepness: 2.0,
            confidence_threshold: 0.6,
        }
    }

    /// Rejects configurations that would make boundary mapping ambiguous.
    pub fn validate(&self) -> Result<(), RouterError> {
        let b = &self.boundaries;
        if !(b.simple_medium < b.medium_complex && b.medium_complex < b.complex_reasoning) {
            return Err(RouterError::Config(format!(
                "tier boundaries must be strictly increasing, got {} / {} / {}",
                b.simple_medium, b.medium_complex, b.complex_reasoning
            )));
        }
        if self.confidence_steepness <= 0.0 {
            return Err(RouterError::Config(
                "confidence_steepness must be positive".to_string(),
            ));
        }
        if !(0.5..=1.0).contains(&self.confidence_threshold) {
            return Err(RouterError::Config(
                "confidence_threshold must be within [0.5, 1.0]".to_string(),
            ));
        }
        Ok(())
    }
}
