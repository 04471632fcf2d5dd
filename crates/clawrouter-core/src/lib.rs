// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the ClawRouter proxy.
//!
//! Provides the error type, wire-format request types, the routing
//! decision record, and the capability traits (credentials, telemetry)
//! used throughout the workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::RouterError;
pub use traits::{Credential, CredentialResolver, TelemetrySink, TracingTelemetry};
pub use types::{
    ChatMessage, ChatRequest, Provider, RouteMethod, RoutingDecision, Tier, UsageRecord,
};
