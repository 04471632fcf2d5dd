// SPDX-FileCopyrightText: 2026 ClawRouter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clawrouter serve` command implementation.
//!
//! Wires the catalog, classifier, router, credential resolver, and
//! gateway together and runs the proxy until a shutdown signal.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use clawrouter_catalog::ModelCatalog;
use clawrouter_classifier::TtlCache;
use clawrouter_config::{load_config, load_config_from_path, ClawRouterConfig};
use clawrouter_core::{CredentialResolver, Provider, RouterError, TracingTelemetry};
use clawrouter_gateway::{
    start_server, ChatClassifierUpstream, GatewayState, RouterStats, ServerConfig, UpstreamClient,
};
use clawrouter_router::ModelRouter;

use crate::env::EnvCredentialResolver;
use crate::shutdown;

/// Runs the `clawrouter serve` command.
pub async fn run_serve(config_path: Option<&Path>) -> Result<(), RouterError> {
    let config = match config_path {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
    .map_err(|e| RouterError::Config(e.to_string()))?;

    init_tracing(&config.log_level);
    config.validate()?;

    info!("starting clawrouter serve");

    let catalog = Arc::new(ModelCatalog::with_overrides(&config.models)?);
    let resolver = Arc::new(EnvCredentialResolver::new(config.wallet_key.clone()));

    // Refuse to start when no provider can be funded at all: every
    // request would fail after three doomed attempts.
    ensure_some_credentials(&catalog, resolver.as_ref()).await?;

    let wallet = wallet_display(resolver.wallet_key().as_deref());
    let upstream = UpstreamClient::new(config.upstreams.clone())?;
    let classifier_upstream = Arc::new(ChatClassifierUpstream::new(
        upstream.clone(),
        resolver.clone(),
        catalog.clone(),
    ));
    let router = Arc::new(ModelRouter::new(
        config.routing.clone(),
        catalog.clone(),
        classifier_upstream,
        Arc::new(TtlCache::default()),
    ));

    let state = GatewayState {
        router,
        catalog,
        upstream,
        credentials: resolver,
        telemetry: Arc::new(TracingTelemetry),
        stats: Arc::new(RouterStats::default()),
        started_at: Instant::now(),
        wallet,
    };

    let cancel = shutdown::install_signal_handler();
    let server_config = server_config(&config);
    start_server(&server_config, state, cancel).await
}

fn server_config(config: &ClawRouterConfig) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    }
}

/// At least one catalog provider must resolve a credential at startup.
async fn ensure_some_credentials(
    catalog: &ModelCatalog,
    resolver: &dyn CredentialResolver,
) -> Result<(), RouterError> {
    let mut providers: Vec<Provider> = catalog.entries().iter().map(|e| e.provider).collect();
    providers.sort_by_key(|p| p.to_string());
    providers.dedup();

    for provider in &providers {
        if resolver.resolve(*provider).await.is_some() {
            return Ok(());
        }
    }

    eprintln!(
        "error: no upstream credentials found. Set BLOCKRUN_WALLET_KEY, \
         OPENAI_API_KEY, or ANTHROPIC_API_KEY."
    );
    Err(RouterError::AuthMissing {
        provider: Provider::Blockrun,
    })
}

/// Truncated wallet form for `/health`; the raw key never leaves the
/// resolver.
fn wallet_display(key: Option<&str>) -> String {
    match key {
        Some(k) if k.chars().count() > 12 => {
            let head: String = k.chars().take(10).collect();
            format!("{head}…")
        }
        Some(k) => k.to_string(),
        None => "unconfigured".to_string(),
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("clawrouter={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_display_truncates_long_keys() {
        let shown = wallet_display(Some("0xdeadbeefcafef00d1234567890"));
        assert_eq!(shown, "0xdeadbeef…");
        assert!(!shown.contains("1234567890"));
    }

    #[test]
    fn wallet_display_passes_short_values_and_flags_missing() {
        assert_eq!(wallet_display(Some("0xshort")), "0xshort");
        assert_eq!(wallet_display(None), "unconfigured");
    }

    #[tokio::test]
    async fn startup_fails_closed_without_any_credentials() {
        let catalog = ModelCatalog::builtin();
        let resolver = EnvCredentialResolver::new(None);
        // Only meaningful when the environment carries no provider keys;
        // CI runs without them.
        if resolver.wallet_key().is_none()
            && std::env::var("OPENAI_API_KEY").is_err()
            && std::env::var("ANTHROPIC_API_KEY").is_err()
            && std::env::var("CLAUDE_CODE_OAUTH_TOKEN").is_err()
        {
            let err = ensure_some_credentials(&catalog, &resolver).await.unwrap_err();
            assert!(matches!(err, RouterError::AuthMissing { .. }));
        }
    }

    #[tokio::test]
    async fn startup_proceeds_with_a_wallet_key() {
        let catalog = ModelCatalog::builtin();
        let resolver = EnvCredentialResolver::new(Some("0xabc".to_string()));
        ensure_some_credentials(&catalog, &resolver).await.unwrap();
    }
}
