// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based complexity classification.
//!
//! Stage A tests the user text against ordered fast-path pattern groups
//! and short-circuits on a hit. Stage B computes a weighted score over
//! the keyword dimensions. Stage C forces REASONING when two or more
//! distinct reasoning keywords appear. Stage D maps the score onto the
//! tier boundaries and calibrates confidence with a sigmoid over the
//! distance to the nearest boundary; below-threshold confidence reports
//! no tier so the caller can defer to the LLM classifier.
//!
//! All stages are CPU-only; no I/O happens here.

use std::sync::LazyLock;

use regex::Regex;

use clawrouter_core::Tier;

use crate::config::ScoringConfig;

/// Messages at or under this many characters (after trimming) are
/// trivially simple.
const SHORT_MESSAGE_CHARS: usize = 20;

static SIMPLE_FASTPATH: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Greetings across a handful of languages.
        Regex::new(r"^(hi|hiya|hello|hey|yo|howdy|hola|bonjour|ciao|hallo|salut|hej|namaste|konnichiwa)\b").unwrap(),
        // Basic single-fact question stems.
        Regex::new(r"^(what|who)\s+is\b").unwrap(),
        // Short acknowledgments that stand alone.
        Regex::new(r"^(thanks|thank you|thx|ok|okay|got it|sounds good|sure|cool|great|nice|bye|goodbye|good morning|good night)[.!?]*$").unwrap(),
        // Check-ins.
        Regex::new(r"\bare you (there|awake|alive|online)\b").unwrap(),
        Regex::new(r"^(ping|you there)\??$").unwrap(),
    ]
});

static REASONING_FASTPATH: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\b(prove|theorem|derive)\b").unwrap(),
        Regex::new(r"\bformally verify\b").unwrap(),
        Regex::new(r"\bchain[ -]of[ -]thought\b").unwrap(),
        Regex::new(r"\bmathematical proof\b").unwrap(),
    ]
});

static COMPLEX_FASTPATH: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\barchitect").unwrap(),
        Regex::new(r"\bdesign (a |an |the )?(system|platform)\b").unwrap(),
        Regex::new(r"\bmicroservices?\b").unwrap(),
        Regex::new(r"\bdistributed\b").unwrap(),
        Regex::new(r"\bscalab").unwrap(),
        Regex::new(r"\binfrastructure\b").unwrap(),
        Regex::new(r"\boptimi[sz]e\b").unwrap(),
        Regex::new(r"\brefactor").unwrap(),
        Regex::new(r"\bmigrat(e|ion|ing)\b").unwrap(),
        Regex::new(r"\boverhaul\b").unwrap(),
    ]
});

static MEDIUM_FASTPATH: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // Imperative coding verbs followed by an article.
        Regex::new(r"\b(write|build|create|implement|add|fix|make|generate|update)\s+(a|an|the|some|my|this)\b").unwrap(),
    ]
});

static MULTI_STEP: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"first.*then").unwrap(),
        Regex::new(r"\bstep \d").unwrap(),
        Regex::new(r"(?m)^\s*\d+\.\s").unwrap(),
    ]
});

/// The outcome of rule classification.
#[derive(Debug, Clone)]
pub struct ScoringResult {
    /// Weighted dimension score (zero on a fast-path hit).
    pub score: f64,
    /// Classified tier, or `None` when confidence fell below the
    /// configured threshold and the caller must escalate.
    pub tier: Option<Tier>,
    /// Calibrated confidence in `[0.5, 1.0]`.
    pub confidence: f64,
    /// Which patterns and dimensions fired.
    pub signals: Vec<String>,
    /// Raw agentic-task dimension score, surfaced for telemetry.
    pub agentic_score: f64,
    /// Whether a fast-path pattern short-circuited scoring.
    pub fastpath: bool,
}

/// Fast-path plus weighted-scoring classifier over one request's text.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    config: ScoringConfig,
}

impl RuleClassifier {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Classify a request from its user text, system prompt, and the
    /// estimated token count of the full prompt.
    pub fn classify(
        &self,
        user_text: &str,
        system_prompt: &str,
        estimated_tokens: u64,
    ) -> ScoringResult {
        let trimmed = user_text.trim();
        let lower = trimmed.to_lowercase();

        if let Some(result) = fast_path(&lower) {
            return result;
        }

        self.score(&lower, &system_prompt.to_lowercase(), estimated_tokens)
    }

    fn score(&self, lower: &str, system_lower: &str, estimated_tokens: u64) -> ScoringResult {
        let w = &self.config.weights;
        let k = &self.config.keywords;
        let t = &self.config.token_thresholds;
        let mut signals = Vec::new();

        let token_dim = if estimated_tokens < t.simple {
            -1.0
        } else if estimated_tokens > t.complex {
            1.0
        } else {
            0.0
        };

        let code = hits(lower, &k.code);
        let code_dim = tiered(code, 2, 1.0, 0.5);

        let reasoning = hits(lower, &k.reasoning);
        let reasoning_dim = match reasoning {
            n if n >= 2 => 1.0,
            1 => 0.7,
            _ => 0.0,
        };

        let technical = hits(lower, &k.technical);
        let technical_dim = match technical {
            n if n >= 4 => 1.0,
            n if n >= 2 => 0.5,
            _ => 0.0,
        };

        let creative = hits(lower, &k.creative);
        let creative_dim = match creative {
            n if n >= 2 => 0.7,
            1 => 0.5,
            _ => 0.0,
        };

        let simple = hits(lower, &k.simple);
        let simple_dim = if simple >= 1 { -1.0 } else { 0.0 };

        let multi_step_dim = if MULTI_STEP.iter().any(|re| re.is_match(lower)) {
            0.5
        } else {
            0.0
        };

        let questions = lower.matches('?').count();
        let question_dim = if questions > 3 { 0.5 } else { 0.0 };

        let imperative = hits(lower, &k.imperative);
        let imperative_dim = tiered(imperative, 2, 0.5, 0.3);

        let constraints = hits(lower, &k.constraint);
        let constraint_dim = match constraints {
            n if n >= 3 => 0.7,
            n if n >= 1 => 0.3,
            _ => 0.0,
        };

        let formats = hits(lower, &k.output_format);
        let format_dim = tiered(formats, 2, 0.7, 0.4);

        let references = hits(lower, &k.reference);
        let reference_dim = tiered(references, 2, 0.5, 0.3);

        let negations = hits(lower, &k.negation);
        let negation_dim = match negations {
            n if n >= 3 => 0.5,
            2 => 0.3,
            _ => 0.0,
        };

        let domains = hits(lower, &k.domain);
        let domain_dim = tiered(domains, 2, 0.8, 0.5);

        // Agentic markers are scanned over system plus user text; the
        // system prompt is where tool instructions usually live.
        let combined = format!("{system_lower}\n{lower}");
        let agentic = hits(&combined, &k.agentic);
        let agentic_dim = match agentic {
            n if n >= 4 => 1.0,
            3 => 0.6,
            n if n >= 1 => 0.2,
            _ => 0.0,
        };

        push_signal(&mut signals, "token-count", token_dim);
        push_signal(&mut signals, "code-presence", code_dim);
        push_signal(&mut signals, "reasoning-markers", reasoning_dim);
        push_signal(&mut signals, "technical-terms", technical_dim);
        push_signal(&mut signals, "creative-markers", creative_dim);
        push_signal(&mut signals, "simple-indicators", simple_dim);
        push_signal(&mut signals, "multi-step", multi_step_dim);
        push_signal(&mut signals, "question-complexity", question_dim);
        push_signal(&mut signals, "imperative-verbs", imperative_dim);
        push_signal(&mut signals, "constraint-count", constraint_dim);
        push_signal(&mut signals, "output-format", format_dim);
        push_signal(&mut signals, "reference-complexity", reference_dim);
        push_signal(&mut signals, "negation-complexity", negation_dim);
        push_signal(&mut signals, "domain-specificity", domain_dim);
        push_signal(&mut signals, "agentic-task", agentic_dim);

        let score = token_dim * w.token_count
            + code_dim * w.code_presence
            + reasoning_dim * w.reasoning_markers
            + technical_dim * w.technical_terms
            + creative_dim * w.creative_markers
            + simple_dim * w.simple_indicators
            + multi_step_dim * w.multi_step
            + question_dim * w.question_complexity
            + imperative_dim * w.imperative_verbs
            + constraint_dim * w.constraint_count
            + format_dim * w.output_format
            + reference_dim * w.reference_complexity
            + negation_dim * w.negation_complexity
            + domain_dim * w.domain_specificity
            + agentic_dim * w.agentic_task;

        let (mapped_tier, distance) = map_to_tier(score, &self.config.boundaries);
        let confidence = sigmoid(self.config.confidence_steepness * distance);

        // Two distinct reasoning markers force the reasoning tier no
        // matter where the score landed.
        if reasoning >= 2 {
            signals.push("reasoning-override".to_string());
            return ScoringResult {
                score,
                tier: Some(Tier::Reasoning),
                confidence: confidence.max(0.85),
                signals,
                agentic_score: agentic_dim,
                fastpath: false,
            };
        }

        let tier = if confidence < self.config.confidence_threshold {
            None
        } else {
            Some(mapped_tier)
        };

        ScoringResult {
            score,
            tier,
            confidence,
            signals,
            agentic_score: agentic_dim,
            fastpath: false,
        }
    }
}

/// Stage A: ordered fast-path pattern groups over the lowercased,
/// trimmed user text. Returns `None` when no group matches.
fn fast_path(lower: &str) -> Option<ScoringResult> {
    let groups: [(&[Regex], Tier, f64); 4] = [
        (SIMPLE_FASTPATH.as_slice(), Tier::Simple, 0.95),
        (REASONING_FASTPATH.as_slice(), Tier::Reasoning, 0.90),
        (COMPLEX_FASTPATH.as_slice(), Tier::Complex, 0.85),
        (MEDIUM_FASTPATH.as_slice(), Tier::Medium, 0.80),
    ];

    let short = lower.chars().count() <= SHORT_MESSAGE_CHARS;

    for (patterns, tier, confidence) in groups {
        let hit = (tier == Tier::Simple && short)
            || patterns.iter().any(|re| re.is_match(lower));
        if hit {
            return Some(ScoringResult {
                score: 0.0,
                tier: Some(tier),
                confidence,
                signals: vec![format!("quick-match: {tier}")],
                agentic_score: 0.0,
                fastpath: true,
            });
        }
    }
    None
}

/// Number of distinct keywords from `list` contained in `text`.
fn hits(text: &str, list: &[String]) -> usize {
    list.iter().filter(|k| text.contains(k.as_str())).count()
}

/// Two-level dimension rule: `count >= high_at` scores `high`, exactly
/// one hit scores `low`, otherwise zero.
fn tiered(count: usize, high_at: usize, high: f64, low: f64) -> f64 {
    if count >= high_at {
        high
    } else if count == 1 {
        low
    } else {
        0.0
    }
}

fn push_signal(signals: &mut Vec<String>, name: &str, dim: f64) {
    if dim != 0.0 {
        signals.push(format!("{name}: {dim:+.1}"));
    }
}

/// Stage D boundary mapping: tier plus distance to the nearest boundary.
fn map_to_tier(score: f64, b: &crate::config::TierBoundaries) -> (Tier, f64) {
    if score < b.simple_medium {
        (Tier::Simple, b.simple_medium - score)
    } else if score < b.medium_complex {
        (
            Tier::Medium,
            (score - b.simple_medium).min(b.medium_complex - score),
        )
    } else if score < b.complex_reasoning {
        (
            Tier::Complex,
            (score - b.medium_complex).min(b.complex_reasoning - score),
        )
    } else {
        (Tier::Reasoning, score - b.complex_reasoning)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
