// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the ClawRouter proxy.

use thiserror::Error;

use crate::types::Provider;

/// The primary error type used across the ClawRouter workspace.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Configuration errors (invalid TOML, non-monotone tier boundaries,
    /// unknown model overrides).
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to bind the listener socket.
    #[error("failed to bind {addr}: {message}")]
    Bind { addr: String, message: String },

    /// Malformed or unacceptable client request (bad JSON, missing
    /// messages, unknown model). Never triggers classification.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A provider returned a non-2xx response. The upstream status and
    /// body are preserved so the client sees what the provider said.
    #[error("upstream {model} returned {status}")]
    Upstream {
        status: u16,
        body: String,
        model: String,
    },

    /// No model in the fallback chain could be reached.
    #[error("no upstream reachable: {message}")]
    Unreachable {
        message: String,
        tried: Vec<String>,
    },

    /// The upstream refused authentication and a credential refresh did
    /// not help.
    #[error("missing credentials for {provider}")]
    AuthMissing { provider: Provider },

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
