// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog and cost accounting for the ClawRouter proxy.
//!
//! The catalog is a static table mapping model ids to tier, provider, and
//! prices; it is constructed once at startup and shared read-only.

pub mod catalog;
pub mod pricing;

pub use catalog::{ModelCatalog, ModelEntry};
pub use pricing::{cost_usd, expected_output_tokens, tier_output_cap, DEFAULT_OUTPUT_CAP};
