// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the ClawRouter workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Complexity tier of a chat request.
///
/// Total ordering follows expected cost/capability: `Simple < Medium <
/// Complex < Reasoning`. `Reasoning` is distinct from `Complex` so that
/// math/proof workloads land on reasoning-tuned models instead of the
/// biggest general model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Simple,
    Medium,
    Complex,
    Reasoning,
}

impl Tier {
    /// All tiers in ascending cost order.
    pub const ALL: [Tier; 4] = [Tier::Simple, Tier::Medium, Tier::Complex, Tier::Reasoning];
}

/// Upstream provider a model is served by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// BlockRun model marketplace (wallet-funded, OpenAI-compatible).
    Blockrun,
    /// OpenAI direct.
    OpenAi,
    /// Anthropic direct (OpenAI-compatible endpoint).
    Anthropic,
}

/// How a routing decision was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMethod {
    /// Weighted scoring produced a confident tier.
    Rules,
    /// Rule classifier was ambiguous; the LLM fallback decided.
    Llm,
    /// A fast-path pattern short-circuited scoring.
    Fastpath,
}

/// A single chat message in the OpenAI wire format.
///
/// `content` is kept as raw JSON because OpenAI allows both a plain string
/// and an array of typed content parts; the proxy forwards either shape
/// untouched and only flattens to text for classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: serde_json::Value,
}

impl ChatMessage {
    /// Flattens the message content to plain text for classification.
    ///
    /// String content is returned as-is; content-part arrays contribute
    /// their `text` fields. Anything else flattens to empty.
    pub fn content_text(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(parts) => parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}

/// The subset of an OpenAI chat-completion request the proxy reads.
///
/// Unknown fields are captured in `extra` and forwarded to the upstream
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatRequest {
    /// Concatenated text of all messages with the given role.
    pub fn text_for_role(&self, role: &str) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == role)
            .map(ChatMessage::content_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the client asked for a streaming response.
    pub fn wants_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

/// The outcome of routing one request: classified tier, chosen model,
/// cost accounting, and rationale. Serialized (camelCase) into the
/// `X-ClawRouter-Decision` response header and handed to telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    /// Concrete model id the request is forwarded to.
    pub model: String,
    /// Classified complexity tier.
    pub tier: Tier,
    /// Calibrated confidence of the classification.
    pub confidence: f64,
    /// How the decision was reached.
    pub method: RouteMethod,
    /// Human-readable rationale.
    pub reasoning: String,
    /// Estimated cost of this request on the chosen model, USD.
    pub cost_estimate: f64,
    /// Cost of the same request on the canonical expensive model, USD.
    pub baseline_cost: f64,
    /// Fraction of baseline cost saved, clamped to `[0, 1]`.
    pub savings: f64,
    /// Ordered model ids to try when the chosen model fails.
    pub fallback_chain: Vec<String>,
    /// Classifier and override signals that contributed to the decision.
    pub signals: Vec<String>,
}

/// Final accounting for a completed request, parsed from the upstream
/// response where available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Model that actually served the request.
    pub model: String,
    /// Tier the request was classified into.
    pub tier: Tier,
    /// Input tokens reported by the upstream.
    pub input_tokens: u64,
    /// Output tokens reported by the upstream.
    pub output_tokens: u64,
    /// Actual cost in USD computed from reported tokens.
    pub cost_usd: f64,
}
