// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request cost math.
//!
//! Formula: sum of (tokens / 1_000_000) * price_per_million per direction.

use crate::catalog::ModelEntry;
use clawrouter_core::Tier;

/// Output-token cap assumed when the client does not send `max_tokens`.
pub const DEFAULT_OUTPUT_CAP: u32 = 1024;

/// Per-tier ceiling on the expected output tokens used for estimates.
pub fn tier_output_cap(tier: Tier) -> u32 {
    match tier {
        Tier::Simple => 1024,
        Tier::Medium => 2048,
        Tier::Complex => 4096,
        Tier::Reasoning => 8192,
    }
}

/// Expected output tokens for a cost estimate:
/// `min(request max_tokens or the default cap, the tier cap)`.
pub fn expected_output_tokens(max_tokens: Option<u32>, tier: Tier) -> u64 {
    u64::from(max_tokens.unwrap_or(DEFAULT_OUTPUT_CAP).min(tier_output_cap(tier)))
}

/// Cost in USD of a request with the given token counts on this model.
pub fn cost_usd(entry: &ModelEntry, input_tokens: u64, output_tokens: u64) -> f64 {
    let input = (input_tokens as f64 / 1_000_000.0) * entry.input_price_per_mtok;
    let output = (output_tokens as f64 / 1_000_000.0) * entry.output_price_per_mtok;
    input + output
}
