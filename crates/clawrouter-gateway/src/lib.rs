// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The proxy pipeline: an OpenAI-compatible HTTP surface in front of the
//! routing engine.
//!
//! Per request the pipeline parses, classifies (via the router), forwards
//! to the chosen upstream with bounded fallback, and streams the response
//! back without buffering. Telemetry and stats record every outcome.

pub mod forward;
pub mod handlers;
pub mod server;
pub mod state;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use forward::{
    forward_with_fallback, ChatClassifierUpstream, UpstreamClient, MAX_UPSTREAM_ATTEMPTS,
};
pub use handlers::DECISION_HEADER;
pub use server::{build_router, start_server, ServerConfig};
pub use state::{GatewayState, RouterStats, StatsSnapshot};
pub use stream::{passthrough_with_usage, StreamOutcome, StreamUsage};
