// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the proxy.
//!
//! Unknown keys are deliberately ignored so newer config files keep
//! working against older binaries. Every section defaults to the
//! shipped values; the routing section is a full [`ScoringConfig`] so a
//! partial TOML table overrides only the fields it names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use clawrouter_classifier::ScoringConfig;
use clawrouter_core::{Provider, RouterError, Tier};

/// Top-level proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClawRouterConfig {
    /// Listener settings.
    pub server: ServerSection,

    /// BlockRun wallet key funding marketplace models. Falls back to the
    /// `BLOCKRUN_WALLET_KEY` environment variable via the resolver.
    pub wallet_key: Option<String>,

    /// Log level for the tracing subscriber.
    pub log_level: String,

    /// Classifier tuning; partial overrides merge over the defaults.
    pub routing: ScoringConfig,

    /// Per-tier primary model overrides, e.g. `SIMPLE = "gpt-4o-mini"`.
    pub models: HashMap<Tier, String>,

    /// Provider base-URL overrides (local endpoints, tests).
    pub upstreams: HashMap<Provider, String>,
}

/// Listener section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind host; loopback unless explicitly widened.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
        }
    }
}

impl Default for ClawRouterConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            wallet_key: None,
            log_level: "info".to_string(),
            routing: ScoringConfig::builtin(),
            models: HashMap::new(),
            upstreams: HashMap::new(),
        }
    }
}

impl ClawRouterConfig {
    /// Shipped defaults.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Validate cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), RouterError> {
        self.routing.validate()
    }
}
