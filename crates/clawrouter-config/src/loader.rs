// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./clawrouter.toml` >
//! `~/.config/clawrouter/clawrouter.toml` > `/etc/clawrouter/clawrouter.toml`
//! with environment variable overrides via the `CLAWROUTER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ClawRouterConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/clawrouter/clawrouter.toml` (system-wide)
/// 3. `~/.config/clawrouter/clawrouter.toml` (user XDG config)
/// 4. `./clawrouter.toml` (local directory)
/// 5. `CLAWROUTER_*` environment variables
pub fn load_config() -> Result<ClawRouterConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClawRouterConfig::builtin()))
        .merge(Toml::file("/etc/clawrouter/clawrouter.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("clawrouter/clawrouter.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("clawrouter.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from TOML text only (tests, embedded defaults).
pub fn load_config_from_str(toml_content: &str) -> Result<ClawRouterConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClawRouterConfig::builtin()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClawRouterConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClawRouterConfig::builtin()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so key names that
/// contain underscores survive: `CLAWROUTER_WALLET_KEY` must map to
/// `wallet_key`, not `wallet.key`.
fn env_provider() -> Env {
    Env::prefixed("CLAWROUTER_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("routing_", "routing.", 1);
        mapped.into()
    })
}
